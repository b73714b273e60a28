//! Avalon button prompts.
//!
//! When a prompt times out the lock on the manual commands is lifted and the
//! error names the command that finishes the step.

use std::time::Duration;

use crate::core::error::{Error, Result};
use crate::games::avalon::{
    Avalon, AvalonChoice, AvalonOutcome, AvalonStep, MissionCard, Vote, ASSASSIN, MISSION_TIMEOUT,
    STAB_PROMPT, STAB_TIMEOUT, TEAM_EVIL, TEAM_PROMPT, TEAM_TIMEOUT, VOTE_TIMEOUT,
};
use crate::protocol::{Prompt, PromptResults};
use crate::rules::{ContinuationTable, Game};

type AvalonPrompt = Prompt<AvalonChoice, AvalonStep>;

impl Avalon {
    fn timeout(&self, default: Duration) -> Duration {
        self.settings().prompt_timeout_or(default)
    }

    /// Every seat except `skip`, numbered by turn order.
    fn seats(&self, skip: Option<&str>) -> Vec<AvalonChoice> {
        self.order
            .iter()
            .enumerate()
            .filter(|(_, n)| Some(n.as_str()) != skip)
            .map(|(i, n)| AvalonChoice::Seat(i, n.clone()))
            .collect()
    }

    pub(crate) fn team_prompt(&self, leader: &str) -> Result<AvalonPrompt> {
        let size = self.board_ref()?.current_size();
        Ok(Prompt::new(
            self.players.get(leader)?,
            self.seats(None),
            size,
            self.timeout(TEAM_TIMEOUT),
            AvalonStep::TeamChosen,
        )?
        .keyed(TEAM_PROMPT)
        .titled(format!("{leader}, choose {size} players for the mission"))
        .result_message("Team: "))
    }

    pub(crate) fn vote_prompts(&self) -> Result<Vec<AvalonPrompt>> {
        let leader = self.leader()?;
        let team = self.team_list();
        let timeout = self.timeout(VOTE_TIMEOUT);
        self.order
            .iter()
            .map(|name| {
                Ok(Prompt::new(
                    self.players.get(name)?,
                    vec![AvalonChoice::Vote(Vote::Approve), AvalonChoice::Vote(Vote::Reject)],
                    1,
                    timeout,
                    AvalonStep::VotesCast,
                )?
                .titled("Vote on the proposed Mission")
                .described(format!("Team Leader: {leader}\nTeam: {team}"))
                .direct(true)
                .result_message("You voted: "))
            })
            .collect()
    }

    /// Only members of Team Evil are offered `fail`.
    pub(crate) fn mission_prompts(&self) -> Result<Vec<AvalonPrompt>> {
        let timeout = self.timeout(MISSION_TIMEOUT);
        let fails = {
            let board = self.board_ref()?;
            board.fails_required(board.current_mission)
        };
        self.on_mission
            .iter()
            .map(|name| {
                let player = self.players.get(name)?;
                let mut options = vec![AvalonChoice::Card(MissionCard::Pass)];
                if player.has_role(TEAM_EVIL) {
                    options.push(AvalonChoice::Card(MissionCard::Fail));
                }
                Ok(Prompt::new(player, options, 1, timeout, AvalonStep::MissionPlayed)?
                    .titled("Choose a card for the Mission")
                    .described(format!("Fails required: {fails}"))
                    .direct(true)
                    .result_message("You played: "))
            })
            .collect()
    }

    pub(crate) fn stab_prompt(&self) -> Result<AvalonPrompt> {
        let assassin = self.players.sole_with_role(ASSASSIN)?;
        Ok(Prompt::new(
            assassin,
            self.seats(Some(assassin.name())),
            1,
            self.timeout(STAB_TIMEOUT),
            AvalonStep::Stabbed,
        )?
        .keyed(STAB_PROMPT)
        .titled("Stab Merlin")
        .described("Choose the player you think is Merlin")
        .result_message("You stabbed: "))
    }
}

/// Every Avalon continuation.
pub fn continuations() -> Result<ContinuationTable<Avalon>> {
    ContinuationTable::builder()
        .on_prompts(AvalonStep::TeamChosen, team_chosen)
        .on_prompts(AvalonStep::VotesCast, votes_cast)
        .on_prompts(AvalonStep::MissionPlayed, mission_played)
        .on_prompts(AvalonStep::Stabbed, stabbed)
        .build()
}

fn unexpected(selection: &[AvalonChoice]) -> Error {
    Error::game(format!("Unexpected selection: {selection:?}"))
}

fn timed_out(game: &mut Avalon, who: &str, command: &str) -> Error {
    game.lock_voting = false;
    Error::illegal(format!(
        "{who} did not choose in time. Use the '{command}' command"
    ))
}

fn team_chosen(game: &mut Avalon, mut results: PromptResults<AvalonChoice>) -> Result<AvalonOutcome> {
    let Some(selection) = results.take(TEAM_PROMPT)? else {
        let leader = game.leader()?;
        return Err(timed_out(game, &leader, "choose"));
    };
    let mut team = Vec::with_capacity(selection.len());
    for choice in &selection {
        let AvalonChoice::Seat(_, name) = choice else {
            return Err(unexpected(&selection));
        };
        team.push(name.clone());
    }

    for name in game.on_mission.clone() {
        game.remove_from_team(&name)?;
    }
    let mut out = AvalonOutcome::new();
    for name in &team {
        out.push_text(game.choose(name)?);
    }
    game.start_vote(&mut out)?;
    Ok(out)
}

fn votes_cast(game: &mut Avalon, results: PromptResults<AvalonChoice>) -> Result<AvalonOutcome> {
    let mut votes = Vec::with_capacity(results.len());
    let mut missing = Vec::new();
    for (name, selection) in results {
        match selection.as_deref() {
            Some([AvalonChoice::Vote(vote)]) => votes.push((name, *vote)),
            Some(other) => return Err(unexpected(other)),
            None => missing.push(name),
        }
    }
    for (name, vote) in votes {
        game.players.get_mut(&name)?.fields.vote = Some(vote);
    }
    if !missing.is_empty() {
        missing.sort();
        return Err(timed_out(game, &missing.join(", "), "vote"));
    }
    let mut out = AvalonOutcome::new();
    game.process_vote(&mut out)?;
    Ok(out)
}

fn mission_played(game: &mut Avalon, results: PromptResults<AvalonChoice>) -> Result<AvalonOutcome> {
    let mut cards = Vec::with_capacity(results.len());
    let mut missing = Vec::new();
    for (name, selection) in results {
        match selection.as_deref() {
            Some([AvalonChoice::Card(card)]) => cards.push((name, *card)),
            Some(other) => return Err(unexpected(other)),
            None => missing.push(name),
        }
    }
    for (name, card) in cards {
        let player = game.players.get_mut(&name)?;
        if card == MissionCard::Fail && !player.has_role(TEAM_EVIL) {
            return Err(Error::game(format!("{name} is not allowed to fail a mission")));
        }
        player.fields.mission_card = Some(card);
    }
    if !missing.is_empty() {
        missing.sort();
        return Err(timed_out(game, &missing.join(", "), "mission"));
    }
    let mut out = AvalonOutcome::new();
    game.go_on_mission(&mut out)?;
    Ok(out)
}

fn stabbed(game: &mut Avalon, mut results: PromptResults<AvalonChoice>) -> Result<AvalonOutcome> {
    let assassin = game.players.sole_with_role(ASSASSIN)?.name().to_owned();
    let Some(selection) = results.take(STAB_PROMPT)? else {
        return Err(timed_out(game, &assassin, "stab"));
    };
    let [AvalonChoice::Seat(_, target)] = selection.as_slice() else {
        return Err(unexpected(&selection));
    };
    let mut out = AvalonOutcome::new();
    game.process_stab(&assassin, target, &mut out)?;
    Ok(out)
}
