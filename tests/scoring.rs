//! Integration tests for match winner determination and the court overlay.

use court_rotation::logic::{
    advance_batch, determine_match_winner, is_editable, round_winners, schedule_round, MatchStatus,
};
use court_rotation::models::{CourtHandling, Side};
use court_rotation::{AdvanceBlock, GameMatch, Round, ScoreEntry, SetScore};
use uuid::Uuid;

fn entry(sets: Vec<SetScore>) -> ScoreEntry {
    ScoreEntry::new(1, sets)
}

#[test]
fn straight_set_win() {
    assert_eq!(determine_match_winner(&entry(vec![SetScore::new(6, 4)])), Some(Side::One));
    assert_eq!(determine_match_winner(&entry(vec![SetScore::new(2, 6)])), Some(Side::Two));
}

#[test]
fn one_game_margin_needs_a_tiebreak() {
    assert_eq!(determine_match_winner(&entry(vec![SetScore::new(6, 5)])), None);
    assert_eq!(
        determine_match_winner(&entry(vec![SetScore::with_tiebreak(7, 6, 7, 2)])),
        Some(Side::One)
    );
}

#[test]
fn contradicting_or_tied_tiebreak_is_undeterminable() {
    assert_eq!(determine_match_winner(&entry(vec![SetScore::with_tiebreak(7, 6, 2, 7)])), None);
    assert_eq!(determine_match_winner(&entry(vec![SetScore::with_tiebreak(7, 6, 5, 5)])), None);
    // A conclusive set does not rescue a broken tiebreak elsewhere.
    let sets = vec![SetScore::new(6, 0), SetScore::new(6, 0), SetScore::new(6, 5)];
    assert_eq!(determine_match_winner(&entry(sets)), None);
}

#[test]
fn sets_won_decide_before_games() {
    let sets = vec![SetScore::new(6, 3), SetScore::new(3, 6), SetScore::new(10, 8)];
    assert_eq!(determine_match_winner(&entry(sets)), Some(Side::One));
    // 1-1 in sets: games 6+0 vs 4+6.
    let sets = vec![SetScore::new(6, 4), SetScore::new(0, 6)];
    assert_eq!(determine_match_winner(&entry(sets)), Some(Side::Two));
    let sets = vec![SetScore::new(6, 4), SetScore::new(4, 6)];
    assert_eq!(determine_match_winner(&entry(sets)), None);
}

#[test]
fn legacy_and_tiebreak_json_shapes_parse() {
    let legacy: ScoreEntry = serde_json::from_str(r#"{"court":2,"score":[6,3]}"#).unwrap();
    assert_eq!(legacy, ScoreEntry::games(2, 6, 3));

    let current: ScoreEntry =
        serde_json::from_str(r#"{"court":1,"sets":[[6,3],[7,6,{"tb":[7,4]}]]}"#).unwrap();
    assert_eq!(current.sets[1], SetScore::with_tiebreak(7, 6, 7, 4));
    assert_eq!(determine_match_winner(&current), Some(Side::One));

    let json = serde_json::to_string(&current).unwrap();
    assert!(json.contains(r#"[7,6,{"tb":[7,4]}]"#));
}

fn round_with(n: usize) -> Round {
    let matches = (0..n)
        .map(|i| GameMatch::new(i as u32 + 1, vec![vec![Uuid::new_v4()], vec![Uuid::new_v4()]]))
        .collect();
    Round::new(matches)
}

#[test]
fn missing_scores_reported_before_draws() {
    let mut round = round_with(2);
    round.set_score(0, ScoreEntry::games(0, 4, 4));
    assert_eq!(round_winners(&round), Err(AdvanceBlock::MissingScores));
    round.set_score(1, ScoreEntry::games(0, 6, 1));
    assert_eq!(round_winners(&round), Err(AdvanceBlock::DrawnMatch));
    round.set_score(0, ScoreEntry::games(0, 1, 6));
    assert_eq!(round_winners(&round), Ok(vec![Side::Two, Side::One]));
    // Court follows the match, not the entry.
    assert_eq!(round.score(1).map(|s| s.court), Some(2));
}

#[test]
fn queue_frees_a_court_when_a_match_is_decided() {
    let mut round = round_with(3);
    assert_eq!(
        schedule_round(&round, 2, CourtHandling::Queue),
        vec![MatchStatus::Active, MatchStatus::Active, MatchStatus::Pending]
    );
    assert!(!is_editable(&round, 2, 2, CourtHandling::Queue));

    round.set_score(0, ScoreEntry::games(0, 6, 2));
    assert_eq!(
        schedule_round(&round, 2, CourtHandling::Queue),
        vec![MatchStatus::Completed, MatchStatus::Active, MatchStatus::Active]
    );
    assert!(is_editable(&round, 0, 2, CourtHandling::Queue));
    assert!(is_editable(&round, 2, 2, CourtHandling::Queue));
}

#[test]
fn batches_advance_only_when_current_batch_is_decided() {
    let mut round = round_with(3);
    assert!(is_editable(&round, 1, 2, CourtHandling::Batches));
    assert!(!is_editable(&round, 2, 2, CourtHandling::Batches));

    round.set_score(0, ScoreEntry::games(0, 6, 2));
    assert_eq!(advance_batch(&mut round, 2), Err(AdvanceBlock::MissingScores));
    round.set_score(1, ScoreEntry::games(0, 6, 5));
    assert_eq!(advance_batch(&mut round, 2), Err(AdvanceBlock::DrawnMatch));
    round.set_score(1, ScoreEntry::games(0, 6, 3));
    assert_eq!(advance_batch(&mut round, 2), Ok(1));

    assert_eq!(
        schedule_round(&round, 2, CourtHandling::Batches),
        vec![MatchStatus::Completed, MatchStatus::Completed, MatchStatus::Active]
    );
    assert!(is_editable(&round, 2, 2, CourtHandling::Batches));
    assert_eq!(advance_batch(&mut round, 2), Err(AdvanceBlock::NothingToAdvance));
}
