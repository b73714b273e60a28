//! Property tests for the pieces every game leans on: prompt and interrupt
//! collection, turn order, decks, seeded shuffles and player names.

mod common;

use std::time::{Duration, Instant};

use proptest::prelude::*;

use common::{init_tracing, run_ok};
use party_engine::core::config::GameSettings;
use party_engine::games::coup::{Card, Coup, CoupPhase};
use party_engine::games::lobby::normalize_name;
use party_engine::games::rps::Throw;
use party_engine::protocol::{Interrupt, InterruptCollector, Prompt, PromptCollector};
use party_engine::{Deck, DeckPosition, GameRng, GameRunner, Identity, Player};

fn collector(options: u8, count: usize, now: Instant) -> PromptCollector<u8> {
    let player = Player::new(Identity::new("ann"), Some("ann".to_owned()), ());
    let prompt = Prompt::new(&player, (0..options).collect(), count, Duration::from_secs(60), ())
        .expect("valid prompt");
    PromptCollector::open(prompt.request, now)
}

/// Options, a count that fits them, and a run of picks.
fn prompt_case() -> impl Strategy<Value = (u8, usize, Vec<u8>)> {
    (1u8..8).prop_flat_map(|n| (Just(n), 1..=n as usize, prop::collection::vec(0..n + 2, 0..24)))
}

// =============================================================================
// Prompt Collection
// =============================================================================

proptest! {
    /// Picks toggle until exactly `count` options are held, then nothing moves.
    #[test]
    fn prompt_toggles_until_count((options, count, picks) in prompt_case()) {
        let now = Instant::now();
        let mut prompt = collector(options, count, now);
        let ann = Identity::new("ann");
        let mut model: Vec<u8> = Vec::new();
        let mut done = false;

        for pick in picks {
            let applied = prompt.select(&ann, &pick);
            let expected = !done && pick < options;
            prop_assert_eq!(applied, expected);
            if expected {
                match model.iter().position(|o| *o == pick) {
                    Some(pos) => { model.remove(pos); }
                    None => model.push(pick),
                }
                done = model.len() == count;
            }
            prop_assert!(prompt.selection().len() <= count);
            prop_assert_eq!(prompt.selection(), model.as_slice());
            prop_assert_eq!(prompt.is_resolved(), done);
        }
        prop_assert_eq!(prompt.result().is_some(), done);
    }

    /// Nobody but the target can pick.
    #[test]
    fn prompt_ignores_other_players((options, count, picks) in prompt_case()) {
        let mut prompt = collector(options, count, Instant::now());
        let ben = Identity::new("ben");
        for pick in picks {
            prop_assert!(!prompt.select(&ben, &pick));
        }
        prop_assert!(prompt.selection().is_empty());
        prop_assert!(!prompt.is_resolved());
    }

    /// An open prompt expires at its deadline and never before.
    #[test]
    fn prompt_expires_at_deadline(secs in 0u64..120) {
        let now = Instant::now();
        let mut prompt = collector(3, 1, now);
        let expired = prompt.expire(now + Duration::from_secs(secs));
        prop_assert_eq!(expired, secs >= 60);
        prop_assert_eq!(prompt.result(), None);
    }
}

// =============================================================================
// Interrupt Collection
// =============================================================================

/// A single-response interrupt over `eligible` players named p0, p1, ...
fn single_response(eligible: usize) -> InterruptCollector<&'static str> {
    let players: Vec<Player<()>> = (0..eligible)
        .map(|i| Player::new(Identity::new(format!("p{i}")), None, ()))
        .collect();
    let interrupt = Interrupt::new(&players, vec!["challenge", "doubt"], "pass", Duration::from_secs(30), ())
        .and_then(|i| i.max_responses(1))
        .expect("valid interrupt");
    InterruptCollector::open(interrupt.request, Instant::now())
}

proptest! {
    /// However the picks arrive, one response closes the window and nobody
    /// else gets a selection in.
    #[test]
    fn interrupt_keeps_one_responder(
        eligible in 2usize..6,
        picks in prop::collection::vec((0usize..7, 0usize..3), 1..16),
    ) {
        let options = ["challenge", "doubt", "pass"];
        let mut interrupt = single_response(eligible);
        let mut closed = false;

        for (who, option) in picks {
            let applied = interrupt.select(&Identity::new(format!("p{who}")), &options[option]);
            prop_assert!(!(closed && applied));
            if applied {
                closed = true;
            }
            let results = interrupt.results();
            prop_assert!(results.responder_count() <= 1);
            prop_assert!(results.responder().is_ok());
            prop_assert!(interrupt.response_count() <= 1);
            prop_assert_eq!(interrupt.is_resolved(), closed);
        }
    }
}

// =============================================================================
// Turn Order
// =============================================================================

/// Seats `count` players in a manual Coup game and starts it.
fn coup_table(count: usize, seed: u64) -> (GameRunner<Coup>, Instant) {
    init_tracing();
    let mut runner = GameRunner::new(Coup::new(GameSettings::default().with_seed(seed))).expect("coup tables");
    let now = Instant::now();
    for i in 0..count {
        let name = format!("p{i}");
        run_ok(&mut runner, &name, &format!("join {name}"), now);
    }
    run_ok(&mut runner, "p0", "change_option button_prompts disable", now);
    run_ok(&mut runner, "p0", "change_option interrupt_prompts disable", now);
    run_ok(&mut runner, "p0", "start", now);
    (runner, now)
}

/// The seat after `actor` once `gone` has left the table.
fn successor(order: &[String], actor: &str, gone: &str) -> String {
    let remaining: Vec<&String> = order.iter().filter(|n| *n != gone).collect();
    let start = order.iter().position(|n| n == actor).expect("actor seated");
    (1..=order.len())
        .map(|step| &order[(start + step) % order.len()])
        .find(|n| remaining.contains(n))
        .cloned()
        .expect("someone remains")
}

proptest! {
    /// Knocking players out, whether they hold the turn or not, always hands
    /// the turn to the next seat still in the game.
    #[test]
    fn turn_skips_eliminated_players(
        count in 3usize..=6,
        seed in any::<u64>(),
        rounds in prop::collection::vec((any::<bool>(), 0usize..6), 5),
    ) {
        let (mut runner, now) = coup_table(count, seed);

        for (bluff, pick) in rounds {
            let order = runner.game().order().to_vec();
            if order.len() < 2 {
                break;
            }
            let actor = runner.game().current_player().expect("a current player");
            let idx = order.iter().position(|n| *n == actor).expect("actor seated");

            let gone = if bluff {
                runner.game_mut().hand_mut(&actor).expect("seated").cards = vec![Card::Contessa];
                run_ok(&mut runner, &actor, "action tax", now);
                let challenger = order[(idx + 1) % order.len()].clone();
                run_ok(&mut runner, &challenger, "challenge", now);
                actor.clone()
            } else {
                let others: Vec<&String> = order.iter().filter(|n| **n != actor).collect();
                let victim = others[pick % others.len()].clone();
                runner.game_mut().hand_mut(&actor).expect("seated").money = 7;
                runner.game_mut().hand_mut(&victim).expect("seated").cards.truncate(1);
                run_ok(&mut runner, &actor, &format!("action coup {victim}"), now);
                victim
            };

            let game = runner.game();
            prop_assert!(!game.order().contains(&gone));
            prop_assert_eq!(game.order().len(), order.len() - 1);
            if game.order().len() == 1 {
                prop_assert_eq!(game.state(), CoupPhase::GameEnd);
                break;
            }
            let next = game.current_player().expect("a current player");
            prop_assert_eq!(next, successor(&order, &actor, &gone));
            prop_assert_eq!(game.state(), CoupPhase::Action);
        }
    }
}

// =============================================================================
// Decks and Shuffles
// =============================================================================

proptest! {
    /// Drawing moves cards out of the pile without losing or inventing any.
    #[test]
    fn deck_draw_conserves_cards(size in 0usize..40, count in 0usize..50, bottom in any::<bool>(), seed in any::<u64>()) {
        let mut rng = GameRng::seeded(seed);
        let cards: Vec<usize> = (0..size).collect();
        let mut deck = Deck::new(cards, Some(&mut rng), false);
        let from = if bottom { DeckPosition::Bottom } else { DeckPosition::Top };

        match deck.draw_from(count, from, &mut rng) {
            Ok(drawn) => {
                prop_assert!(count <= size);
                prop_assert_eq!(drawn.len(), count);
                let mut all: Vec<usize> = drawn.into_iter().chain(deck.cards().iter().copied()).collect();
                all.sort_unstable();
                prop_assert_eq!(all, (0..size).collect::<Vec<_>>());
            }
            Err(_) => {
                prop_assert!(count > size);
                prop_assert_eq!(deck.len(), size);
            }
        }
    }

    /// The same seed always shuffles the same way.
    #[test]
    fn seeded_shuffle_is_repeatable(seed in any::<u64>(), len in 0usize..64) {
        let mut first: Vec<usize> = (0..len).collect();
        let mut second = first.clone();
        GameRng::seeded(seed).shuffle(&mut first);
        GameRng::seeded(seed).shuffle(&mut second);
        prop_assert_eq!(&first, &second);
        first.sort_unstable();
        prop_assert_eq!(first, (0..len).collect::<Vec<_>>());
    }
}

// =============================================================================
// Rules and Names
// =============================================================================

proptest! {
    /// Every pair of different throws has exactly one winner.
    #[test]
    fn throws_have_one_winner(a in 0usize..3, b in 0usize..3) {
        let (a, b) = (Throw::ALL[a], Throw::ALL[b]);
        if a == b {
            prop_assert!(!a.beats(b));
        } else {
            prop_assert!(a.beats(b) != b.beats(a));
        }
    }

    /// Accepted names are lowercase alphanumerics and normalize to themselves.
    #[test]
    fn names_normalize_once(name in "[ -~]{0,16}") {
        match normalize_name(&name) {
            Ok(normal) => {
                prop_assert!(!normal.is_empty());
                prop_assert!(normal.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
                prop_assert_eq!(normalize_name(&normal).ok(), Some(normal.clone()));
                prop_assert_eq!(normal, name.to_ascii_lowercase());
            }
            Err(err) => prop_assert!(err.is_recoverable()),
        }
    }
}
