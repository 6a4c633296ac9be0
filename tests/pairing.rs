//! Integration tests for the shared pairing helpers: keys, capacities, sit-out rotation.

use std::collections::BTreeMap;

use court_rotation::logic::{
    compute_capacities, extract_pairs, matchup_key, pair_key, select_active_players, undo_sit_outs,
};
use court_rotation::{PlayerId, SeededRng};
use uuid::Uuid;

fn ids(n: usize) -> Vec<PlayerId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

#[test]
fn capacities_sum_to_n_with_remainder_up_front() {
    for n in 1..=20 {
        for k in 1..=n {
            let caps = compute_capacities(n, k);
            assert_eq!(caps.len(), k);
            assert_eq!(caps.iter().sum::<usize>(), n);
            let base = n / k;
            let extra = n % k;
            assert!(caps[..extra].iter().all(|&c| c == base + 1), "n={n} k={k}");
            assert!(caps[extra..].iter().all(|&c| c == base), "n={n} k={k}");
        }
    }
}

#[test]
fn pair_key_ignores_order() {
    let p = ids(2);
    assert_eq!(pair_key(p[0], p[1]), pair_key(p[1], p[0]));
}

#[test]
fn doubles_matchup_key_is_symmetric() {
    let p = ids(4);
    let (a, b, c, d) = (p[0], p[1], p[2], p[3]);
    let k1 = matchup_key(&[vec![a, b], vec![c, d]]);
    let k2 = matchup_key(&[vec![b, a], vec![d, c]]);
    let k3 = matchup_key(&[vec![c, d], vec![a, b]]);
    assert_eq!(k1, k2);
    assert_eq!(k1, k3);
    assert_ne!(k1, matchup_key(&[vec![a, c], vec![b, d]]));
}

#[test]
fn singles_matchup_key_matches_pair_of_players() {
    let p = ids(2);
    let forward = matchup_key(&[vec![p[0]], vec![p[1]]]);
    let backward = matchup_key(&[vec![p[1]], vec![p[0]]]);
    assert_eq!(forward, backward);

    let (low, high) = pair_key(p[1], p[0]).players();
    assert!(low < high);
    assert_eq!(forward.sides(), &[vec![low], vec![high]]);
}

#[test]
fn extract_pairs_counts_partnerships_inside_teams() {
    let p = ids(7);
    let teams = vec![p[..4].to_vec(), p[4..].to_vec()];
    // C(4,2) + C(3,2)
    assert_eq!(extract_pairs(&teams).len(), 6 + 3);
}

#[test]
fn sit_outs_rotate_through_everyone_before_repeating() {
    let players = ids(5);
    let mut counts = BTreeMap::new();
    let mut rng = SeededRng::new("rotation");
    let mut seen = Vec::new();
    for _ in 0..5 {
        let selection = select_active_players(&players, 4, &mut counts, &mut rng);
        assert_eq!(selection.sitting_out.len(), 1);
        assert_eq!(selection.active.len(), 4);
        seen.push(selection.sitting_out[0]);
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);
    assert!(counts.values().all(|&c| c == 1));
}

#[test]
fn undo_reverts_only_that_selection() {
    let players = ids(6);
    let mut counts = BTreeMap::new();
    let mut rng = SeededRng::new("undo");
    let first = select_active_players(&players, 4, &mut counts, &mut rng);
    let snapshot = counts.clone();
    let second = select_active_players(&players, 4, &mut counts, &mut rng);
    undo_sit_outs(&second, &mut counts);
    let total: u32 = counts.values().sum();
    assert_eq!(total, 2);
    for id in &first.sitting_out {
        assert_eq!(counts.get(id), snapshot.get(id));
    }
}
