//! Coup: bluff your way to being the last player with influence.
//!
//! ## Turn structure
//!
//! `action` → (`challenge`) → (`reaction` → `reaction_challenge`) → next turn.
//! Reveals, lost influence and exchanges suspend the turn through the
//! [`TurnTracker`](crate::core::TurnTracker) and resume it afterwards.

pub mod cards;
pub mod commands;
pub mod game;
pub mod prompts;

pub use cards::{Card, CoupAction};
pub use game::{Coup, CoupHand};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::core::config::OptionToggle;
use crate::core::phase::Phase;
use crate::rules::{Continuation, GameOutcome};

pub const CURRENT_PLAYER: &str = "current_player";
pub const ACTIVE_PLAYER: &str = "active_player";

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 6;
pub const STARTING_COINS: u32 = 2;
/// At this many coins a player must coup.
pub const FORCED_COUP_COINS: u32 = 10;

pub const INTERRUPT_TIMEOUT: Duration = Duration::from_secs(30);
pub const PROMPT_TIMEOUT: Duration = Duration::from_secs(120);

pub const EMOJIS: &str = "emojis";
pub const BUTTON_PROMPTS: &str = "button_prompts";
pub const INTERRUPT_PROMPTS: &str = "interrupt_prompts";

pub const OPTIONS: &[OptionToggle] = &[
    OptionToggle {
        key: EMOJIS,
        description: "Mark the board with emojis",
        enable_message: "Emojis will be used on the board",
        disable_message: "The board will use plain text",
        default: true,
    },
    OptionToggle {
        key: BUTTON_PROMPTS,
        description: "Ask for choices with prompts instead of commands",
        enable_message: "Choices will be made with prompts",
        disable_message: "Choices will be made with commands",
        default: true,
    },
    OptionToggle {
        key: INTERRUPT_PROMPTS,
        description: "Offer challenges and blocks with interrupts",
        enable_message: "Challenges and blocks will be offered with interrupts",
        disable_message: "Challenges and blocks will need the 'challenge', 'reaction' and 'next' commands",
        default: true,
    },
];

/// Coup phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoupPhase {
    NewGame,
    Action,
    LoseInfluence,
    Reaction,
    Challenge,
    ReactionChallenge,
    Reveal,
    Exchange,
    GameEnd,
}

impl fmt::Display for CoupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CoupPhase::NewGame => "new_game",
            CoupPhase::Action => "action",
            CoupPhase::LoseInfluence => "lose_influence",
            CoupPhase::Reaction => "reaction",
            CoupPhase::Challenge => "challenge",
            CoupPhase::ReactionChallenge => "reaction_challenge",
            CoupPhase::Reveal => "reveal",
            CoupPhase::Exchange => "exchange",
            CoupPhase::GameEnd => "game_end",
        })
    }
}

impl Phase for CoupPhase {
    const ALL: &'static [Self] = &[
        CoupPhase::NewGame,
        CoupPhase::Action,
        CoupPhase::LoseInfluence,
        CoupPhase::Reaction,
        CoupPhase::Challenge,
        CoupPhase::ReactionChallenge,
        CoupPhase::Reveal,
        CoupPhase::Exchange,
        CoupPhase::GameEnd,
    ];

    fn is_turn_state(self) -> bool {
        matches!(
            self,
            CoupPhase::Action
                | CoupPhase::Reaction
                | CoupPhase::Challenge
                | CoupPhase::ReactionChallenge
                | CoupPhase::Exchange
        )
    }
}

/// Options offered by Coup prompts and interrupts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoupChoice {
    Action(CoupAction),
    /// Another player, by name.
    Player(String),
    /// A card as a blocking claim.
    Card(Card),
    /// A position in the chooser's own hand (cards can repeat).
    Slot(usize, Card),
    Challenge,
    Pass,
}

impl fmt::Display for CoupChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoupChoice::Action(a) => write!(f, "{a}"),
            CoupChoice::Player(name) => f.write_str(name),
            CoupChoice::Card(c) => write!(f, "{c}"),
            CoupChoice::Slot(i, c) => write!(f, "{}: {c}", i + 1),
            CoupChoice::Challenge => f.write_str("challenge"),
            CoupChoice::Pass => f.write_str("pass"),
        }
    }
}

/// Where a Coup prompt or interrupt resumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoupStep {
    ActionChosen,
    TargetChosen,
    InfluenceLost,
    CardRevealed,
    CardsReturned,
    Challenged,
    Reacted,
}

impl Continuation for CoupStep {
    const ALL: &'static [Self] = &[
        CoupStep::ActionChosen,
        CoupStep::TargetChosen,
        CoupStep::InfluenceLost,
        CoupStep::CardRevealed,
        CoupStep::CardsReturned,
        CoupStep::Challenged,
        CoupStep::Reacted,
    ];

    fn name(self) -> &'static str {
        match self {
            CoupStep::ActionChosen => "action_chosen",
            CoupStep::TargetChosen => "target_chosen",
            CoupStep::InfluenceLost => "influence_lost",
            CoupStep::CardRevealed => "card_revealed",
            CoupStep::CardsReturned => "cards_returned",
            CoupStep::Challenged => "challenged",
            CoupStep::Reacted => "reacted",
        }
    }
}

pub type CoupOutcome = GameOutcome<Coup>;
