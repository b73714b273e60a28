//! Coup integration tests.
//!
//! Whole turns played through the runner, both with manual commands and
//! with button prompts.

mod common;

use std::time::Instant;

use common::{init_tracing, interrupt_for, later, prompt_for, run, run_ok};
use party_engine::core::config::GameSettings;
use party_engine::dispatch::{GameRunner, Response};
use party_engine::games::coup::{Card, Coup, CoupAction, CoupChoice, CoupPhase, CURRENT_PLAYER};
use party_engine::{ErrorKind, Game, Identity};

fn lobby(seed: u64) -> (GameRunner<Coup>, Instant) {
    init_tracing();
    let mut runner = GameRunner::new(Coup::new(GameSettings::default().with_seed(seed))).unwrap();
    let now = Instant::now();
    for name in ["ann", "ben", "cat"] {
        run_ok(&mut runner, name, &format!("join {name}"), now);
    }
    (runner, now)
}

/// Three players, every choice made with commands.
fn manual_game(seed: u64) -> (GameRunner<Coup>, Instant) {
    let (mut runner, now) = lobby(seed);
    run_ok(&mut runner, "ann", "change_option button_prompts disable", now);
    run_ok(&mut runner, "ann", "change_option interrupt_prompts disable", now);
    run_ok(&mut runner, "ann", "start", now);
    (runner, now)
}

// =============================================================================
// Manual Play
// =============================================================================

/// Start requires at least three players.
#[test]
fn test_start_needs_three() {
    init_tracing();
    let mut runner = GameRunner::new(Coup::new(GameSettings::default())).unwrap();
    let now = Instant::now();
    run_ok(&mut runner, "ann", "join ann", now);
    run_ok(&mut runner, "ben", "join ben", now);
    let response = run(&mut runner, "ann", "start", now);
    assert_eq!(
        response.error.unwrap().message(),
        "Need at least 3 players to start! There are currently: 2"
    );
    assert!(!runner.is_locked());
}

/// An unchallenged tax pays three coins and passes the turn.
#[test]
fn test_tax_advances_turn() {
    let (mut runner, now) = manual_game(7);
    let order = runner.game().order().to_vec();
    let first = order[0].clone();

    run_ok(&mut runner, &first, "action tax", now);
    assert_eq!(runner.game().state(), CoupPhase::Challenge);

    let response = run_ok(&mut runner, &order[1], "next", now);
    assert!(response.mentions(&format!("{first} collected Tax (+3 coins)")));
    assert_eq!(runner.game().hand(&first).unwrap().money, 5);
    assert_eq!(runner.game().current_player().unwrap(), order[1]);
    assert_eq!(runner.game().state(), CoupPhase::Action);
}

/// Only the current player may act.
#[test]
fn test_out_of_turn_action() {
    let (mut runner, now) = manual_game(7);
    let second = runner.game().order()[1].clone();
    let response = run(&mut runner, &second, "action income", now);
    let err = response.error.unwrap();
    assert_eq!(err.kind(), ErrorKind::IllegalMove);
    assert!(err.message().starts_with("Cannot call 'action' from state: action"));
}

/// A bluff caught on a player's last card knocks them out.
#[test]
fn test_failed_bluff_eliminates() {
    let (mut runner, now) = manual_game(3);
    let order = runner.game().order().to_vec();
    let first = order[0].clone();
    runner.game_mut().hand_mut(&first).unwrap().cards = vec![Card::Contessa];

    run_ok(&mut runner, &first, "action tax", now);
    let response = run_ok(&mut runner, &order[2], "challenge", now);
    assert!(response.mentions(&format!("{first} reveals contessa, not duke!")));
    assert!(response.mentions(&format!("{first} has no influence left and is out of the game!")));

    let game = runner.game();
    assert_eq!(game.order(), &order[1..]);
    assert_eq!(game.current_player().unwrap(), order[1]);
    assert!(game.revealed().contains(&Card::Contessa));
    assert_eq!(game.registry().with_role(CURRENT_PLAYER).count(), 1);
}

/// Players cannot challenge their own claim.
#[test]
fn test_self_challenge_rejected() {
    let (mut runner, now) = manual_game(5);
    let first = runner.game().order()[0].clone();
    run_ok(&mut runner, &first, "action tax", now);
    let response = run(&mut runner, &first, "challenge", now);
    assert_eq!(
        response.error.unwrap().message(),
        format!("{first} cannot challenge their own claim.")
    );
    assert_eq!(runner.game().state(), CoupPhase::Challenge);
}

/// Kicking a player frees the name for someone else.
#[test]
fn test_join_kick_join() {
    let (mut runner, now) = lobby(1);
    run_ok(&mut runner, "ann", "kick ben", now);
    assert!(!runner.game().registry().contains("ben"));
    let response = run_ok(&mut runner, "dan", "join ben", now);
    assert!(response.mentions("dan joined as ben"));
}

// =============================================================================
// Button Prompts
// =============================================================================

/// The action prompt goes to the current player and drives the turn.
#[test]
fn test_action_prompt_flow() {
    let (mut runner, now) = lobby(9);
    let response = run_ok(&mut runner, "ann", "start", now);
    let order = runner.game().order().to_vec();
    assert_eq!(response.opened.len(), 1);
    assert!(runner.is_locked());

    let (id, options) = prompt_for(&runner.live_requests(), &order[0]).unwrap();
    let income = CoupChoice::Action(CoupAction::Income);
    assert!(options.contains(&income));

    let response = runner.select(&Identity::new(order[0].as_str()), id, &income, now);
    assert!(response.is_ok());
    assert!(response.mentions(&format!("{} took Income (+1 coin)", order[0])));
    assert_eq!(runner.game().hand(&order[0]).unwrap().money, 3);
    assert!(prompt_for(&runner.live_requests(), &order[1]).is_some());
}

/// A timed-out action prompt names the manual command and frees the lock.
#[test]
fn test_action_prompt_timeout() {
    let (mut runner, now) = lobby(9);
    run_ok(&mut runner, "ann", "start", now);
    let first = runner.game().order()[0].clone();

    let response = runner.tick(later(now, 121));
    let err = response.error.unwrap();
    assert!(err.is_recoverable());
    assert_eq!(
        err.message(),
        format!("{first} did not choose in time. Use the 'action' command")
    );
    assert!(!runner.is_locked());

    run_ok(&mut runner, &first, "action income", later(now, 122));
    assert_eq!(runner.game().hand(&first).unwrap().money, 3);
}

/// Pick `choice` on the prompt addressed to `name`.
fn answer_prompt(runner: &mut GameRunner<Coup>, name: &str, choice: &CoupChoice, now: Instant) -> Response<CoupChoice> {
    let (id, options) = prompt_for(&runner.live_requests(), name)
        .unwrap_or_else(|| panic!("no prompt for {name}"));
    assert!(options.contains(choice), "{choice:?} not offered to {name}");
    let response = runner.select(&Identity::new(name), id, choice, now);
    assert!(response.is_ok(), "{:?}", response.error);
    response
}

/// Pick `choice` on the interrupt `name` is eligible for.
fn answer_interrupt(runner: &mut GameRunner<Coup>, name: &str, choice: &CoupChoice, now: Instant) -> Response<CoupChoice> {
    let (id, _) = interrupt_for(&runner.live_requests(), name)
        .unwrap_or_else(|| panic!("no interrupt for {name}"));
    let response = runner.select(&Identity::new(name), id, choice, now);
    assert!(response.is_ok(), "{:?}", response.error);
    response
}

// =============================================================================
// Interrupts
// =============================================================================

/// A steal nobody challenges or blocks goes through once both windows close.
#[test]
fn test_steal_after_windows_time_out() {
    let (mut runner, now) = lobby(9);
    run_ok(&mut runner, "ann", "start", now);
    let order = runner.game().order().to_vec();

    answer_prompt(&mut runner, &order[0], &CoupChoice::Action(CoupAction::Steal), now);
    answer_prompt(&mut runner, &order[0], &CoupChoice::Player(order[1].clone()), now);
    assert_eq!(runner.game().state(), CoupPhase::Challenge);
    assert!(interrupt_for(&runner.live_requests(), &order[2]).is_some());

    let response = runner.tick(later(now, 31));
    assert!(response.is_ok());
    assert_eq!(runner.game().state(), CoupPhase::Reaction);
    assert!(interrupt_for(&runner.live_requests(), &order[1]).is_some());
    assert!(interrupt_for(&runner.live_requests(), &order[2]).is_none());

    let response = runner.tick(later(now, 62));
    assert!(response.is_ok());
    assert!(response.mentions(&format!("{} stole 2 coins from {}", order[0], order[1])));
    let game = runner.game();
    assert_eq!(game.hand(&order[0]).unwrap().money, 4);
    assert_eq!(game.hand(&order[1]).unwrap().money, 0);
    assert_eq!(game.current_player().unwrap(), order[1]);
    assert_eq!(game.state(), CoupPhase::Action);
    assert!(prompt_for(&runner.live_requests(), &order[1]).is_some());
}

/// A real Duke blocks Foreign Aid and survives the challenge.
#[test]
fn test_foreign_aid_blocked_by_duke() {
    let (mut runner, now) = lobby(4);
    run_ok(&mut runner, "ann", "start", now);
    let order = runner.game().order().to_vec();
    runner.game_mut().hand_mut(&order[1]).unwrap().cards = vec![Card::Duke, Card::Contessa];

    answer_prompt(&mut runner, &order[0], &CoupChoice::Action(CoupAction::ForeignAid), now);
    assert_eq!(runner.game().state(), CoupPhase::Reaction);
    assert!(interrupt_for(&runner.live_requests(), &order[0]).is_none());

    let response = answer_interrupt(&mut runner, &order[1], &CoupChoice::Card(Card::Duke), now);
    assert!(response.mentions(&format!("{} claims duke to block", order[1])));
    assert_eq!(runner.game().state(), CoupPhase::ReactionChallenge);
    assert!(interrupt_for(&runner.live_requests(), &order[1]).is_none());

    answer_interrupt(&mut runner, &order[0], &CoupChoice::Challenge, now);
    assert_eq!(runner.game().state(), CoupPhase::Reveal);
    let response = answer_prompt(&mut runner, &order[1], &CoupChoice::Slot(0, Card::Duke), now);
    assert!(response.mentions(&format!("{} reveals duke! The challenge fails", order[1])));
    assert_eq!(runner.game().state(), CoupPhase::LoseInfluence);

    let lost = runner.game().hand(&order[0]).unwrap().cards[0];
    let response = answer_prompt(&mut runner, &order[0], &CoupChoice::Slot(0, lost), now);
    assert!(response.mentions(&format!(
        "{}'s Foreign Aid was blocked by {}",
        order[0], order[1]
    )));
    let game = runner.game();
    assert_eq!(game.hand(&order[0]).unwrap().money, 2);
    assert_eq!(game.hand(&order[0]).unwrap().cards.len(), 1);
    assert_eq!(game.hand(&order[1]).unwrap().cards.len(), 2);
    assert_eq!(game.current_player().unwrap(), order[1]);
}

/// A bluffed Contessa caught by a challenge lets the assassination land.
#[test]
fn test_false_contessa_block_challenged() {
    let (mut runner, now) = lobby(6);
    run_ok(&mut runner, "ann", "start", now);
    let order = runner.game().order().to_vec();
    runner.game_mut().hand_mut(&order[0]).unwrap().money = 3;
    runner.game_mut().hand_mut(&order[1]).unwrap().cards = vec![Card::Duke, Card::Captain];
    // the opening prompt was built with two coins
    assert!(runner.tick(later(now, 121)).error.is_some());
    let now = later(now, 122);
    run_ok(&mut runner, &order[0], &format!("action assassinate {}", order[1]), now);
    assert_eq!(runner.game().state(), CoupPhase::Challenge);

    answer_interrupt(&mut runner, &order[2], &CoupChoice::Pass, now);
    assert_eq!(runner.game().hand(&order[0]).unwrap().money, 0);
    assert_eq!(runner.game().state(), CoupPhase::Reaction);

    answer_interrupt(&mut runner, &order[1], &CoupChoice::Card(Card::Contessa), now);
    assert_eq!(runner.game().state(), CoupPhase::ReactionChallenge);
    answer_interrupt(&mut runner, &order[2], &CoupChoice::Challenge, now);

    let response = answer_prompt(&mut runner, &order[1], &CoupChoice::Slot(0, Card::Duke), now);
    assert!(response.mentions(&format!(
        "{} reveals duke, not contessa! The challenge succeeds",
        order[1]
    )));
    assert!(response.mentions(&format!("{}'s assassination of {} succeeds", order[0], order[1])));
    assert!(response.mentions(&format!("{} has no influence left and is out of the game!", order[1])));

    let game = runner.game();
    assert_eq!(game.order(), &[order[0].clone(), order[2].clone()]);
    assert_eq!(game.revealed(), &[Card::Duke, Card::Captain]);
    assert_eq!(game.current_player().unwrap(), order[2]);
}
