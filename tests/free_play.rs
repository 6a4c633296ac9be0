//! Integration tests for free-mode round and sequence generation.

use std::collections::BTreeSet;

use court_rotation::logic::{
    build_sequence, can_generate_more, extract_pairs, generate_optimal_round_sequence,
    generate_round,
};
use court_rotation::models::{PairKey, PairSet};
use court_rotation::{PlayerId, SeededRng};
use uuid::Uuid;

fn ids(n: usize) -> Vec<PlayerId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

#[test]
fn eight_players_two_teams_of_four() {
    let players = ids(8);
    let mut rng = SeededRng::new("eight");
    let teams = generate_round(&players, 2, &PairSet::new(), &mut rng).unwrap();
    assert_eq!(teams.len(), 2);
    assert!(teams.iter().all(|t| t.len() == 4));
    let mut seated: Vec<PlayerId> = teams.iter().flatten().copied().collect();
    seated.sort();
    let mut expected = players.clone();
    expected.sort();
    assert_eq!(seated, expected);

    let used: PairSet = extract_pairs(&teams).into_iter().collect();
    if let Some(second) = generate_round(&players, 2, &used, &mut rng) {
        assert!(extract_pairs(&second).iter().all(|p| !used.contains(p)));
    }
}

#[test]
fn sequence_never_repeats_a_partnership() {
    let players = ids(9);
    let mut rng = SeededRng::new("sequence");
    let initial: PairSet = [PairKey::new(players[0], players[1]), PairKey::new(players[2], players[3])]
        .into_iter()
        .collect();
    let sequence = generate_optimal_round_sequence(&players, 3, &initial, &mut rng);
    assert!(!sequence.is_empty());

    let mut seen: BTreeSet<PairKey> = BTreeSet::new();
    for teams in &sequence {
        assert_eq!(teams.len(), 3);
        for pair in extract_pairs(teams) {
            assert!(!initial.contains(&pair), "reused an initial pair");
            assert!(seen.insert(pair), "partnership repeated within the sequence");
        }
    }
}

#[test]
fn singleton_teams_give_exactly_one_round() {
    let players = ids(4);
    let mut rng = SeededRng::new("singletons");
    let sequence = build_sequence(&players, 4, &PairSet::new(), &mut rng);
    assert_eq!(sequence.len(), 1);
}

#[test]
fn more_teams_than_players_is_infeasible() {
    let players = ids(3);
    let mut rng = SeededRng::new("too-many");
    assert!(generate_round(&players, 4, &PairSet::new(), &mut rng).is_none());
    assert!(!can_generate_more(&players, 4, &PairSet::new(), &mut rng));
}

#[test]
fn exhausted_pairs_report_no_more_rounds() {
    let players = ids(4);
    let all: PairSet = extract_pairs(&[players.clone()]).into_iter().collect();
    let mut rng = SeededRng::new("exhausted");
    assert!(generate_round(&players, 2, &all, &mut rng).is_none());
}
