//! Avalon integration tests.
//!
//! Five-player games driven through the runner: manual commands for the
//! vote track and endings, button prompts for a full mission round.

mod common;

use std::time::Instant;

use common::{init_tracing, prompt_for, run, run_ok};
use party_engine::core::config::GameSettings;
use party_engine::dispatch::{GameRunner, LiveRequest};
use party_engine::games::avalon::{
    Avalon, AvalonChoice, AvalonPhase, Character, MissionCard, Vote, ASSASSIN,
};
use party_engine::{Game, Identity};

const NAMES: [&str; 5] = ["ann", "ben", "cat", "dan", "eve"];

fn lobby(seed: u64) -> (GameRunner<Avalon>, Instant) {
    init_tracing();
    let mut runner = GameRunner::new(Avalon::new(GameSettings::default().with_seed(seed))).unwrap();
    let now = Instant::now();
    for name in NAMES {
        run_ok(&mut runner, name, &format!("join {name}"), now);
    }
    (runner, now)
}

fn manual_game(seed: u64, rules: &[&str]) -> (GameRunner<Avalon>, Instant) {
    let (mut runner, now) = lobby(seed);
    run_ok(&mut runner, "ann", "change_rule button_prompts disable", now);
    for rule in rules {
        run_ok(&mut runner, "ann", &format!("change_rule {rule} add"), now);
    }
    run_ok(&mut runner, "ann", "next", now);
    (runner, now)
}

/// The leader picks the first seats in order and calls the vote.
fn propose(runner: &mut GameRunner<Avalon>, now: Instant) {
    let leader = runner.game().leader().unwrap();
    let size = runner.game().board().unwrap().current_size();
    let team: Vec<String> = runner.game().order()[..size].to_vec();
    for name in &team {
        run_ok(runner, &leader, &format!("choose {name}"), now);
    }
    run_ok(runner, &leader, "next", now);
}

fn vote_all(runner: &mut GameRunner<Avalon>, vote: &str, now: Instant) {
    for name in NAMES {
        run_ok(runner, name, &format!("vote {vote}"), now);
    }
    run_ok(runner, "ann", "next", now);
}

fn pass_mission(runner: &mut GameRunner<Avalon>, now: Instant) {
    for name in runner.game().on_mission().to_vec() {
        run_ok(runner, &name, "mission pass", now);
    }
    run_ok(runner, "ann", "next", now);
}

// =============================================================================
// Manual Play
// =============================================================================

/// Two rejected teams move the leader on twice before a team is approved.
#[test]
fn test_rejections_then_approval() {
    let (mut runner, now) = manual_game(11, &[]);
    let order = runner.game().order().to_vec();
    assert_eq!(runner.game().leader().unwrap(), order[0]);

    for round in 1..=2 {
        propose(&mut runner, now);
        vote_all(&mut runner, "reject", now);
        assert_eq!(runner.game().leader().unwrap(), order[round]);
        assert_eq!(runner.game().board().unwrap().vote_track, 1 + round as u32);
    }

    propose(&mut runner, now);
    vote_all(&mut runner, "approve", now);
    assert_eq!(runner.game().phase(), AvalonPhase::Mission);
    assert_eq!(runner.game().board().unwrap().vote_track, 1);
    assert_eq!(runner.game().on_mission(), &order[..2]);
}

/// The fifth rejected team in a row hands the game to evil.
#[test]
fn test_hammer_rejection_ends_game() {
    let (mut runner, now) = manual_game(12, &[]);
    for _ in 0..5 {
        propose(&mut runner, now);
        vote_all(&mut runner, "reject", now);
    }
    assert_eq!(runner.game().phase(), AvalonPhase::GameEnd);
    assert_eq!(
        runner.game().winner(),
        Some("5 Teams got voted down in a row! Team Evil Wins!")
    );
}

/// Three passed missions without Merlin end the game for good.
#[test]
fn test_three_passes_win_for_good() {
    let (mut runner, now) = manual_game(13, &[]);
    for _ in 0..3 {
        propose(&mut runner, now);
        vote_all(&mut runner, "approve", now);
        pass_mission(&mut runner, now);
    }
    assert_eq!(runner.game().board().unwrap().passed, 3);
    assert_eq!(
        runner.game().winner(),
        Some("Three Missions Have Passed! Team Good Wins!")
    );
}

/// With Merlin in play the assassin gets one guess after three passes.
#[test]
fn test_assassin_stabs_merlin() {
    let (mut runner, now) = manual_game(14, &["merlin"]);
    for _ in 0..3 {
        propose(&mut runner, now);
        vote_all(&mut runner, "approve", now);
        pass_mission(&mut runner, now);
    }
    assert_eq!(runner.game().phase(), AvalonPhase::Stab);

    let game = runner.game();
    let assassin = game.registry().sole_with_role(ASSASSIN).unwrap().name().to_owned();
    let merlin = game
        .order()
        .iter()
        .find(|name| {
            game.seat(name)
                .is_ok_and(|s| s.character == Some(Character::Merlin))
        })
        .cloned()
        .unwrap();

    let other = NAMES.iter().find(|n| **n != assassin).unwrap();
    let response = run(&mut runner, other, &format!("stab {merlin}"), now);
    assert!(response.error.is_some());

    let response = run_ok(&mut runner, &assassin, &format!("stab {merlin}"), now);
    assert!(response.mentions(&format!("{merlin} was Merlin!")));
    assert_eq!(runner.game().winner(), Some("Merlin was stabbed! Team Evil wins!"));
}

/// Votes are counted only once everyone has voted.
#[test]
fn test_missing_votes_block_next() {
    let (mut runner, now) = manual_game(15, &[]);
    propose(&mut runner, now);
    run_ok(&mut runner, "ann", "vote approve", now);
    let response = run(&mut runner, "ann", "next", now);
    let err = response.error.unwrap();
    assert!(err.message().starts_with("The following players still need to vote:"));
    assert!(!runner.is_locked());
    assert_eq!(runner.game().phase(), AvalonPhase::Voting);
}

/// Kicking a player frees the name and the seat.
#[test]
fn test_join_kick_join() {
    let (mut runner, now) = lobby(1);
    run_ok(&mut runner, "ann", "kick ben", now);
    assert!(!runner.game().order().iter().any(|n| n == "ben"));
    let response = run_ok(&mut runner, "zed", "join ben", now);
    assert!(response.mentions("zed joined as ben"));
    assert_eq!(runner.game().order().last().map(String::as_str), Some("ben"));
}

// =============================================================================
// Button Prompts
// =============================================================================

fn pick(runner: &mut GameRunner<Avalon>, name: &str, choice: &AvalonChoice, now: Instant) {
    let (id, _) = prompt_for(&runner.live_requests(), name).unwrap();
    let response = runner.select(&Identity::new(name), id, choice, now);
    assert!(response.is_ok(), "{name} picking {choice} failed: {:?}", response.error);
}

/// Team, vote and mission prompts carry a whole round.
#[test]
fn test_prompt_round() {
    let (mut runner, now) = lobby(21);
    run_ok(&mut runner, "ann", "next", now);
    assert!(runner.is_locked());

    let leader = runner.game().leader().unwrap();
    let (_, seats) = prompt_for(&runner.live_requests(), &leader).unwrap();
    for seat in seats.iter().take(2) {
        pick(&mut runner, &leader, seat, now);
    }
    assert_eq!(runner.game().phase(), AvalonPhase::Voting);
    let vote_prompts = runner
        .live_requests()
        .iter()
        .filter(|r| matches!(r, LiveRequest::Prompt { .. }))
        .count();
    assert_eq!(vote_prompts, NAMES.len());

    let response = run(&mut runner, "ann", "vote approve", now);
    assert!(response.error.is_some());

    for name in NAMES {
        pick(&mut runner, name, &AvalonChoice::Vote(Vote::Approve), now);
    }
    assert_eq!(runner.game().phase(), AvalonPhase::Mission);

    for name in runner.game().on_mission().to_vec() {
        pick(&mut runner, &name, &AvalonChoice::Card(MissionCard::Pass), now);
    }
    assert_eq!(runner.game().board().unwrap().passed, 1);
    assert_eq!(runner.game().phase(), AvalonPhase::TeamSelect);
    assert_ne!(runner.game().leader().unwrap(), leader);
}
