//! Mission track, vote track and the game logs.

use std::fmt;

use crate::core::error::{Error, Result};

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 10;
/// A rejection with the vote track here hands the game to evil.
pub const HAMMER_VOTE: u32 = 5;
pub const MISSIONS_TO_WIN: u32 = 3;

pub(crate) const LOG_RULE: &str = "================================";

/// Outcome slot on the mission track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissionResult {
    Pending,
    Current,
    Passed,
    Failed,
}

impl fmt::Display for MissionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissionResult::Pending => "",
            MissionResult::Current => "current mission",
            MissionResult::Passed => "PASS!",
            MissionResult::Failed => "FAIL!",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    player_count: usize,
    pub vote_track: u32,
    pub current_mission: usize,
    pub failed: u32,
    pub passed: u32,
    results: Vec<MissionResult>,
    pub mission_log: Vec<String>,
    pub vote_log: Vec<String>,
}

impl Board {
    pub fn new(player_count: usize) -> Result<Self> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(Error::illegal(format!(
                "Cannot Start Game with '{player_count}' players"
            )));
        }
        let mut results = vec![MissionResult::Pending; 5];
        results[0] = MissionResult::Current;
        Ok(Self {
            player_count,
            vote_track: 1,
            current_mission: 0,
            failed: 0,
            passed: 0,
            results,
            mission_log: vec![LOG_RULE.to_owned()],
            vote_log: vec![LOG_RULE.to_owned()],
        })
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    #[must_use]
    pub fn evil_count(&self) -> usize {
        match self.player_count {
            5 | 6 => 2,
            7..=9 => 3,
            _ => 4,
        }
    }

    #[must_use]
    pub fn mission_sizes(&self) -> [usize; 5] {
        match self.player_count {
            5 => [2, 3, 2, 3, 3],
            6 => [2, 3, 4, 3, 4],
            7 => [2, 3, 3, 4, 4],
            _ => [3, 4, 4, 5, 5],
        }
    }

    #[must_use]
    pub fn current_size(&self) -> usize {
        self.mission_sizes()[self.current_mission]
    }

    /// Fail cards needed to sink mission `mission` (0-based).
    #[must_use]
    pub fn fails_required(&self, mission: usize) -> usize {
        if mission == 3 && self.player_count >= 7 {
            2
        } else {
            1
        }
    }

    pub fn advance_vote_track(&mut self) {
        self.vote_track += 1;
    }

    pub fn reset_vote_track(&mut self) {
        self.vote_track = 1;
    }

    /// Record the current mission and move the marker on.
    pub fn record_mission(&mut self, failed: bool) {
        if failed {
            self.results[self.current_mission] = MissionResult::Failed;
            self.failed += 1;
        } else {
            self.results[self.current_mission] = MissionResult::Passed;
            self.passed += 1;
        }
    }

    pub fn next_mission(&mut self) {
        self.current_mission += 1;
        if let Some(slot) = self.results.get_mut(self.current_mission) {
            *slot = MissionResult::Current;
        }
    }

    #[must_use]
    pub fn results(&self) -> &[MissionResult] {
        &self.results
    }

    /// One line per mission.
    #[must_use]
    pub fn mission_info(&self) -> String {
        self.mission_sizes()
            .iter()
            .enumerate()
            .map(|(m, size)| {
                format!(
                    "Mission #{} | player_count = {size} | Fails required: {} | {}",
                    m + 1,
                    self.fails_required(m),
                    self.results[m]
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Vote Track: {}\nPlayer Count: {}\nNumber of Evil Players: {}",
            self.vote_track,
            self.player_count,
            self.evil_count()
        )
    }
}
