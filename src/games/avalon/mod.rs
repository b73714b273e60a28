//! The Resistance: Avalon.
//!
//! ## Round structure
//!
//! `team_select` → `voting` → (`mission` | back to `team_select`) until three
//! missions pass or fail, then `stab` when Merlin is in play.

pub mod board;
pub mod characters;
pub mod commands;
pub mod game;
pub mod prompts;

pub use board::{Board, MissionResult};
pub use characters::{Character, CharacterSet, Team};
pub use game::{Avalon, AvalonSeat};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::core::config::OptionToggle;
use crate::core::phase::Phase;
use crate::rules::{Continuation, GameOutcome};

pub const LEADER: &str = "leader";
pub const TEAM: &str = "team";
pub const TEAM_GOOD: &str = "team_good";
pub const TEAM_EVIL: &str = "team_evil";
pub const ASSASSIN: &str = "assassin";

pub const TEAM_PROMPT: &str = "team_prompt";
pub const STAB_PROMPT: &str = "stab_prompt";

pub const TEAM_TIMEOUT: Duration = Duration::from_secs(300);
pub const VOTE_TIMEOUT: Duration = Duration::from_secs(120);
pub const MISSION_TIMEOUT: Duration = Duration::from_secs(120);
pub const STAB_TIMEOUT: Duration = Duration::from_secs(300);

pub const MISSION_LOG: &str = "mission_log";
pub const VOTE_LOG: &str = "vote_log";
pub const AUTO_NEXT: &str = "auto_next";
pub const EMOJIS: &str = "emojis";
pub const BUTTON_PROMPTS: &str = "button_prompts";

pub const OPTIONS: &[OptionToggle] = &[
    OptionToggle {
        key: MISSION_LOG,
        description: "Allow checking the mission log with 'check mission_log'",
        enable_message: "Checking Mission Log Enabled! (check with command 'check mission_log')",
        disable_message: "Checking Mission Log Disabled!",
        default: false,
    },
    OptionToggle {
        key: VOTE_LOG,
        description: "Allow checking the vote log with 'check vote_log'",
        enable_message: "Checking Vote Log Enabled! (check with command 'check vote_log')",
        disable_message: "Checking Vote Log Disabled!",
        default: false,
    },
    OptionToggle {
        key: AUTO_NEXT,
        description: "Resolve votes and missions once every card is in (only without button prompts)",
        enable_message: "Auto Next Enabled! The game will call 'next' once votes or mission cards are in",
        disable_message: "Auto Next Disabled! 'next' will no longer be called by the game",
        default: false,
    },
    OptionToggle {
        key: EMOJIS,
        description: "Include emojis in game messages",
        enable_message: "Emojis Enabled for messages from the Game!",
        disable_message: "Emojis Disabled for messages from the Game!",
        default: true,
    },
    OptionToggle {
        key: BUTTON_PROMPTS,
        description: "Use prompts for in game actions",
        enable_message: "Button Prompts Enabled! Most in game actions will now use prompts",
        disable_message: "Button Prompts Disabled!",
        default: true,
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvalonPhase {
    NewGame,
    TeamSelect,
    Voting,
    Mission,
    Stab,
    GameEnd,
}

impl fmt::Display for AvalonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AvalonPhase::NewGame => "new_game",
            AvalonPhase::TeamSelect => "team_select",
            AvalonPhase::Voting => "voting",
            AvalonPhase::Mission => "mission",
            AvalonPhase::Stab => "stab",
            AvalonPhase::GameEnd => "game_end",
        })
    }
}

impl Phase for AvalonPhase {
    const ALL: &'static [Self] = &[
        AvalonPhase::NewGame,
        AvalonPhase::TeamSelect,
        AvalonPhase::Voting,
        AvalonPhase::Mission,
        AvalonPhase::Stab,
        AvalonPhase::GameEnd,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vote {
    Approve,
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionCard {
    Pass,
    Fail,
}

/// Options offered by Avalon prompts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvalonChoice {
    /// A player by turn-order position.
    Seat(usize, String),
    Vote(Vote),
    Card(MissionCard),
}

impl fmt::Display for AvalonChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvalonChoice::Seat(i, name) => write!(f, "{}: {name}", i + 1),
            AvalonChoice::Vote(Vote::Approve) => f.write_str("approve"),
            AvalonChoice::Vote(Vote::Reject) => f.write_str("reject"),
            AvalonChoice::Card(MissionCard::Pass) => f.write_str("pass"),
            AvalonChoice::Card(MissionCard::Fail) => f.write_str("fail"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AvalonStep {
    TeamChosen,
    VotesCast,
    MissionPlayed,
    Stabbed,
}

impl Continuation for AvalonStep {
    const ALL: &'static [Self] = &[
        AvalonStep::TeamChosen,
        AvalonStep::VotesCast,
        AvalonStep::MissionPlayed,
        AvalonStep::Stabbed,
    ];

    fn name(self) -> &'static str {
        match self {
            AvalonStep::TeamChosen => "team_chosen",
            AvalonStep::VotesCast => "votes_cast",
            AvalonStep::MissionPlayed => "mission_played",
            AvalonStep::Stabbed => "stabbed",
        }
    }
}

pub type AvalonOutcome = GameOutcome<Avalon>;
