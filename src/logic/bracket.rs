//! Tournament engine: team formation, bracket first rounds, round-robin schedules.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{
    BracketPool, BracketState, CourtHandling, GameMatch, MatchType, Player, PlayerId, Round, Team,
    TeamId, TeamStanding, TournamentFormat, TournamentRun,
};

/// Team from the given members; the name is their names joined.
pub fn form_team(id: TeamId, members: &[&Player]) -> Team {
    Team {
        id,
        name: members
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(" & "),
        players: members.iter().map(|p| p.id).collect(),
    }
}

/// Shuffle the players and cut them into consecutive teams of `team_size` (the last may be short).
pub fn auto_form_teams<R: Rng + ?Sized>(players: &[Player], team_size: usize, rng: &mut R) -> Vec<Team> {
    let mut shuffled: Vec<&Player> = players.iter().collect();
    shuffled.shuffle(rng);
    shuffled
        .chunks(team_size.max(1))
        .enumerate()
        .map(|(id, members)| form_team(id, members))
        .collect()
}

/// Teams for a one-off tournament. An odd doubles roster either plays one 2-vs-1 team or, when
/// that is not allowed, leaves one random player out of the whole run.
pub fn form_tournament_teams<R: Rng + ?Sized>(
    players: &[Player],
    match_type: MatchType,
    allow_two_vs_one: bool,
    rng: &mut R,
) -> (Vec<Team>, Vec<PlayerId>) {
    let size = match_type.players_per_team();
    if match_type == MatchType::Doubles && players.len() % 2 == 1 && !allow_two_vs_one {
        let mut pool: Vec<Player> = players.to_vec();
        pool.shuffle(rng);
        let sitting = pool.pop().map(|p| p.id).into_iter().collect();
        (auto_form_teams(&pool, size, rng), sitting)
    } else {
        (auto_form_teams(players, size, rng), Vec::new())
    }
}

/// Fresh bracket bookkeeping: no pools, nobody eliminated, no champion, zeroed standings.
pub fn create_initial_bracket(teams: &[Team]) -> BracketState {
    BracketState {
        standings: teams.iter().map(|t| (t.id, TeamStanding::default())).collect(),
        ..BracketState::default()
    }
}

fn team_match(court: u32, a: &Team, b: &Team, pool: Option<BracketPool>) -> GameMatch {
    GameMatch::between_teams(
        court,
        vec![a.players.clone(), b.players.clone()],
        vec![a.id, b.id],
        pool,
    )
}

/// Pair teams in order; an odd team out is returned as the bye.
pub(crate) fn pair_teams(
    teams: &[&Team],
    pool: Option<BracketPool>,
    first_court: u32,
) -> (Vec<GameMatch>, Option<TeamId>) {
    let matches = teams
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| team_match(first_court + i as u32, pair[0], pair[1], pool))
        .collect();
    let bye = if teams.len() % 2 == 1 {
        teams.last().map(|t| t.id)
    } else {
        None
    };
    (matches, bye)
}

/// First bracket round: the bracket is padded to a power of two and the first
/// `bracket_size - n` teams (seed order) get byes; the rest pair up in order.
pub fn generate_bracket_first_round(teams: &[Team]) -> Round {
    let bracket_size = teams.len().next_power_of_two();
    let bye_count = bracket_size - teams.len();
    let (bye_teams, playing) = teams.split_at(bye_count.min(teams.len()));
    let playing: Vec<&Team> = playing.iter().collect();
    let (matches, _) = pair_teams(&playing, None, 1);

    let label = if matches.len() == 1 && bye_teams.is_empty() {
        "Final"
    } else {
        "Round 1"
    };
    let mut round = Round::new(matches).with_label(label);
    round.byes = bye_teams.iter().map(|t| t.id).collect();
    round
}

/// Circle method: index 0 stays fixed, the rest rotate by one each round. An odd field gets a
/// ghost; whoever meets the ghost sits that round out. Every pair meets exactly once.
pub fn generate_round_robin_schedule(teams: &[Team]) -> Vec<Round> {
    if teams.len() < 2 {
        return Vec::new();
    }
    let mut slots: Vec<Option<&Team>> = teams.iter().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();

    let mut rounds = Vec::with_capacity(n - 1);
    for r in 0..n - 1 {
        let mut matches = Vec::new();
        let mut sit_outs = Vec::new();
        for i in 0..n / 2 {
            match (slots[i], slots[n - 1 - i]) {
                (Some(a), Some(b)) => {
                    matches.push(team_match(matches.len() as u32 + 1, a, b, None));
                }
                (Some(t), None) | (None, Some(t)) => sit_outs.extend(t.players.iter().copied()),
                (None, None) => {}
            }
        }
        let mut round = Round::new(matches).with_label(format!("Round {}", r + 1));
        round.sit_outs = sit_outs;
        rounds.push(round);

        if let Some(last) = slots.pop() {
            slots.insert(1, last);
        }
    }
    rounds
}

/// Build a run and its opening round(s).
pub fn build_tournament_run(
    teams: Vec<Team>,
    sit_outs: Vec<PlayerId>,
    format: TournamentFormat,
    court_count: usize,
    court_handling: CourtHandling,
) -> TournamentRun {
    let players = teams.iter().flat_map(|t| t.players.iter().copied()).collect();
    let team_size = teams.iter().map(|t| t.players.len()).max().unwrap_or(0);
    let mut bracket = create_initial_bracket(&teams);

    let (rounds, all_rounds_generated) = match (teams.len(), format) {
        (0 | 1, _) => (Vec::new(), true),
        (_, TournamentFormat::RoundRobin) => (generate_round_robin_schedule(&teams), true),
        (_, TournamentFormat::SingleElimination) => (vec![generate_bracket_first_round(&teams)], false),
        (_, TournamentFormat::Consolation) => {
            let mut first = generate_bracket_first_round(&teams);
            for m in &mut first.matches {
                m.bracket_pool = Some(BracketPool::Winners);
            }
            bracket.pools.winners = teams.iter().map(|t| t.id).collect();
            (vec![first], false)
        }
    };

    let finished = teams.len() < 2;
    if teams.len() == 1 {
        bracket.champion = Some(teams[0].id);
    }

    TournamentRun {
        players,
        teams,
        rounds,
        bracket,
        tournament_format: format,
        tournament_team_size: team_size,
        all_rounds_generated,
        sit_outs,
        court_count,
        court_handling,
        finished,
    }
}
