//! Integration tests for bracket building, round robin and advancement.

use std::collections::BTreeSet;

use court_rotation::logic::{
    advance_round, auto_form_teams, build_tournament_run, form_tournament_teams,
    generate_bracket_first_round, generate_round_robin_schedule, ranked_standings,
};
use court_rotation::models::{BracketPool, CourtHandling};
use court_rotation::{
    AdvanceBlock, Advancement, MatchType, Player, Round, ScoreEntry, SeededRng, Team,
    TournamentFormat, TournamentRun,
};

fn players(n: usize) -> Vec<Player> {
    (0..n).map(|i| Player::new(format!("P{i}"))).collect()
}

fn singles_teams(n: usize) -> Vec<Team> {
    let mut rng = SeededRng::new("teams");
    auto_form_teams(&players(n), 1, &mut rng)
}

fn run(n: usize, format: TournamentFormat) -> TournamentRun {
    build_tournament_run(singles_teams(n), Vec::new(), format, 2, CourtHandling::Queue)
}

/// Side one wins every match of the round.
fn score_all(round: &mut Round) {
    for i in 0..round.matches.len() {
        round.set_score(i, ScoreEntry::games(0, 6, 2));
    }
}

#[test]
fn first_round_gives_byes_to_top_seeds() {
    let teams = singles_teams(5);
    let round = generate_bracket_first_round(&teams);
    assert_eq!(round.byes, vec![teams[0].id, teams[1].id, teams[2].id]);
    assert_eq!(round.matches.len(), 1);
    assert_eq!(round.label.as_deref(), Some("Round 1"));

    let two = singles_teams(2);
    assert_eq!(generate_bracket_first_round(&two).label.as_deref(), Some("Final"));
}

#[test]
fn round_robin_meets_every_pair_once() {
    for n in 2..=9 {
        let teams = singles_teams(n);
        let rounds = generate_round_robin_schedule(&teams);
        let expected_rounds = if n % 2 == 0 { n - 1 } else { n };
        assert_eq!(rounds.len(), expected_rounds, "n={n}");

        let mut seen = BTreeSet::new();
        for round in &rounds {
            for m in &round.matches {
                let ids = m.team_ids.clone().unwrap();
                let pair = (ids[0].min(ids[1]), ids[0].max(ids[1]));
                assert!(seen.insert(pair), "n={n}: pair played twice");
            }
            if n % 2 == 1 {
                assert_eq!(round.sit_outs.len(), 1, "ghost sit-out per round");
            }
        }
        assert_eq!(seen.len(), n * (n - 1) / 2);
    }
}

#[test]
fn elimination_terminates_with_one_champion() {
    for n in 2..=12usize {
        let mut run = run(n, TournamentFormat::SingleElimination);
        let bound = n.next_power_of_two().trailing_zeros() as usize;
        let mut calls = 0;
        let champion = loop {
            score_all(run.latest_round_mut().unwrap());
            calls += 1;
            match advance_round(&mut run).unwrap() {
                Advancement::NextRound => assert!(calls < bound, "n={n}: too many rounds"),
                Advancement::Champion(id) => break id,
                Advancement::Exhausted => panic!("n={n}: no champion"),
            }
        };
        assert!(calls <= bound);
        assert_eq!(run.bracket.eliminated.len(), n - 1);
        assert!(!run.bracket.is_eliminated(champion));
        assert_eq!(run.bracket.champion, Some(champion));
        assert!(run.finished);
        assert_eq!(advance_round(&mut run), Err(AdvanceBlock::NothingToAdvance));
    }
}

#[test]
fn advancing_an_unscored_round_changes_nothing() {
    let mut run = run(4, TournamentFormat::SingleElimination);
    let before = run.clone();
    assert_eq!(advance_round(&mut run), Err(AdvanceBlock::MissingScores));
    run.latest_round_mut().unwrap().set_score(0, ScoreEntry::games(0, 6, 6));
    run.latest_round_mut().unwrap().set_score(1, ScoreEntry::games(0, 6, 1));
    assert_eq!(advance_round(&mut run), Err(AdvanceBlock::DrawnMatch));
    run.latest_round_mut().unwrap().scores = before.rounds[0].scores.clone();
    assert_eq!(run, before);
}

#[test]
fn consolation_ends_when_winners_side_converges() {
    let mut run = run(4, TournamentFormat::Consolation);
    assert!(run.rounds[0]
        .matches
        .iter()
        .all(|m| m.bracket_pool == Some(BracketPool::Winners)));

    score_all(run.latest_round_mut().unwrap());
    assert_eq!(advance_round(&mut run), Ok(Advancement::NextRound));

    let second = run.latest_round().unwrap();
    assert_eq!(second.label.as_deref(), Some("Final"));
    let pools: Vec<_> = second.matches.iter().map(|m| m.pool()).collect();
    assert_eq!(pools, vec![BracketPool::Winners, BracketPool::Losers]);

    score_all(run.latest_round_mut().unwrap());
    let winner = run.latest_round().unwrap().matches[0].team_ids.clone().unwrap()[0];
    assert_eq!(advance_round(&mut run), Ok(Advancement::Champion(winner)));
    assert_eq!(run.rounds.len(), 2, "no placement match after the final");
}

#[test]
fn consolation_losers_bye_in_final_round_becomes_sit_out() {
    // 6 teams: bracket of 8, two byes, two winners-pool matches.
    let mut run = run(6, TournamentFormat::Consolation);
    score_all(run.latest_round_mut().unwrap());
    advance_round(&mut run).unwrap();
    // Winners pool: 2 winners + 2 byes = 4; losers pool: 2 teams.
    score_all(run.latest_round_mut().unwrap());
    advance_round(&mut run).unwrap();
    // Winners pool 2 (final); losers pool: 1 winner + 2 dropped = 3, one left over.
    let last = run.latest_round().unwrap();
    assert_eq!(last.label.as_deref(), Some("Final"));
    assert!(last.losers_byes.is_empty());
    assert_eq!(last.sit_outs.len(), 1);
}

#[test]
fn round_robin_ranks_by_wins_then_game_difference() {
    let mut run = run(3, TournamentFormat::RoundRobin);
    assert!(run.all_rounds_generated);
    assert_eq!(advance_round(&mut run), Err(AdvanceBlock::MissingScores));
    for round in &mut run.rounds {
        score_all(round);
    }
    let Ok(Advancement::Champion(champion)) = advance_round(&mut run) else {
        panic!("round robin should crown a champion");
    };
    let ranked = ranked_standings(&run);
    assert_eq!(ranked[0].0, champion);
    assert_eq!(ranked.iter().map(|(_, s)| s.wins).sum::<u32>(), 3);
    assert!(ranked.windows(2).all(|w| w[0].1.wins >= w[1].1.wins));
}

#[test]
fn odd_doubles_without_two_vs_one_leaves_one_out() {
    let mut rng = SeededRng::new("odd-doubles");
    let (teams, sit_outs) = form_tournament_teams(&players(7), MatchType::Doubles, false, &mut rng);
    assert_eq!(teams.len(), 3);
    assert_eq!(sit_outs.len(), 1);
    assert!(teams.iter().all(|t| t.players.len() == 2));

    let (teams, sit_outs) = form_tournament_teams(&players(7), MatchType::Doubles, true, &mut rng);
    assert_eq!(teams.len(), 4);
    assert!(sit_outs.is_empty());
    assert_eq!(teams.iter().filter(|t| t.players.len() == 1).count(), 1);
}

#[test]
fn single_team_is_champion_immediately() {
    let run = run(1, TournamentFormat::SingleElimination);
    assert!(run.finished);
    assert!(run.rounds.is_empty());
    assert_eq!(run.champion().map(|t| t.id), Some(0));
}
