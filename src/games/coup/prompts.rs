//! Coup prompts, interrupts, and the continuations that receive them.
//!
//! Every prompt has a command fallback: when a prompt times out the player
//! is told which command finishes the step by hand, and when button prompts
//! are disabled only the instructions are sent.

use crate::core::error::{Error, Result};
use crate::games::coup::{
    Card, Coup, CoupAction, CoupChoice, CoupOutcome, CoupStep, FORCED_COUP_COINS,
    INTERRUPT_TIMEOUT, PROMPT_TIMEOUT,
};
use crate::protocol::{Interrupt, InterruptResults, Prompt, PromptResults, Selection};
use crate::rules::{ContinuationTable, Game};

impl Coup {
    fn prompt_timeout(&self) -> std::time::Duration {
        self.settings().prompt_timeout_or(PROMPT_TIMEOUT)
    }

    fn interrupt_timeout(&self) -> std::time::Duration {
        self.settings().interrupt_timeout_or(INTERRUPT_TIMEOUT)
    }

    fn hand_slots(&self, name: &str) -> Result<Vec<CoupChoice>> {
        Ok(self
            .hand(name)?
            .cards
            .iter()
            .enumerate()
            .map(|(i, c)| CoupChoice::Slot(i, *c))
            .collect())
    }

    /// Ask the current player for an action.
    pub(crate) fn prompt_action(&mut self, out: &mut CoupOutcome) -> Result<()> {
        let name = self.current_player()?;
        let money = self.hand(&name)?.money;
        if money >= FORCED_COUP_COINS {
            out.push_text(format!("{name} has {money} coins and must launch a Coup"));
            self.current_action = Some(CoupAction::Coup);
            return self.prompt_target(CoupAction::Coup, out);
        }
        if !self.buttons() {
            out.push_text(format!("{name}: use 'action <action> [target]' to take your turn"));
            return Ok(());
        }
        let options = CoupAction::ALL
            .into_iter()
            .filter(|a| a.cost() <= money)
            .map(CoupChoice::Action)
            .collect();
        let prompt = Prompt::new(
            self.players.get(&name)?,
            options,
            1,
            self.prompt_timeout(),
            CoupStep::ActionChosen,
        )?
        .titled(format!("{name}, choose an action"));
        out.push_prompt(prompt);
        Ok(())
    }

    /// Ask the current player who `action` is aimed at.
    pub(crate) fn prompt_target(&mut self, action: CoupAction, out: &mut CoupOutcome) -> Result<()> {
        let name = self.current_player()?;
        if !self.buttons() {
            out.push_text(format!("{name}: use 'action {action} <target>'"));
            return Ok(());
        }
        let options = self
            .order
            .iter()
            .filter(|n| **n != name)
            .cloned()
            .map(CoupChoice::Player)
            .collect();
        let prompt = Prompt::new(
            self.players.get(&name)?,
            options,
            1,
            self.prompt_timeout(),
            CoupStep::TargetChosen,
        )?
        .titled(format!("Choose a target for {}", action.title()));
        out.push_prompt(prompt);
        Ok(())
    }

    pub(crate) fn prompt_lose_influence(&mut self, name: &str, out: &mut CoupOutcome) -> Result<()> {
        if !self.buttons() {
            out.push_text(format!("{name}: use 'reveal <card>' to choose the influence you lose"));
            return Ok(());
        }
        let prompt = Prompt::new(
            self.players.get(name)?,
            self.hand_slots(name)?,
            1,
            self.prompt_timeout(),
            CoupStep::InfluenceLost,
        )?
        .titled("Lose an influence")
        .described("Choose the card you give up")
        .direct(true);
        out.push_prompt(prompt);
        Ok(())
    }

    pub(crate) fn prompt_reveal(&mut self, name: &str, out: &mut CoupOutcome) -> Result<()> {
        if !self.buttons() {
            out.push_text(format!("{name}: use 'reveal <card>' to answer the challenge"));
            return Ok(());
        }
        let prompt = Prompt::new(
            self.players.get(name)?,
            self.hand_slots(name)?,
            1,
            self.prompt_timeout(),
            CoupStep::CardRevealed,
        )?
        .titled("You have been challenged")
        .described("Choose the card to reveal")
        .direct(true);
        out.push_prompt(prompt);
        Ok(())
    }

    pub(crate) fn prompt_exchange(&mut self, name: &str, out: &mut CoupOutcome) -> Result<()> {
        if !self.buttons() {
            let cards: Vec<_> = self.hand(name)?.cards.iter().map(ToString::to_string).collect();
            out.push_message(
                self.players
                    .get(name)?
                    .message(format!("Your cards: {}", cards.join(", "))),
            );
            out.push_text(format!("{name}: use 'exchange <card> <card>' to return two cards"));
            return Ok(());
        }
        let prompt = Prompt::new(
            self.players.get(name)?,
            self.hand_slots(name)?,
            2,
            self.prompt_timeout(),
            CoupStep::CardsReturned,
        )?
        .titled("Exchange")
        .described("Choose two cards to return to the Court Deck")
        .direct(true);
        out.push_prompt(prompt);
        Ok(())
    }

    /// Let everyone but `claimant` challenge the claim of `card`.
    pub(crate) fn offer_challenge(&mut self, claimant: &str, card: Card, out: &mut CoupOutcome) -> Result<()> {
        if !self.interrupts() {
            out.push_text(format!(
                "Anyone may 'challenge' {claimant}'s claim of {card}, or use 'next' to let it stand"
            ));
            return Ok(());
        }
        let eligible = self
            .order
            .iter()
            .filter(|n| *n != claimant)
            .filter_map(|n| self.players.get(n).ok());
        let interrupt = Interrupt::new(
            eligible,
            vec![CoupChoice::Challenge],
            CoupChoice::Pass,
            self.interrupt_timeout(),
            CoupStep::Challenged,
        )?
        .max_responses(1)?
        .titled(format!("Challenge {claimant}?"))
        .described(format!("{claimant} claims to have {card}"));
        out.push_interrupt(interrupt);
        Ok(())
    }

    /// Let `eligible` block `action` with one of its blockers.
    pub(crate) fn offer_reaction(&mut self, action: CoupAction, eligible: &[String], out: &mut CoupOutcome) -> Result<()> {
        let actor = self.current_player()?;
        if !self.interrupts() {
            let cards: Vec<_> = action.blockers().iter().map(ToString::to_string).collect();
            out.push_text(format!(
                "{} may block {actor}'s {} with 'reaction <{}>', or use 'next' to let it happen",
                eligible.join(", "),
                action.title(),
                cards.join("|")
            ));
            return Ok(());
        }
        let players = eligible.iter().filter_map(|n| self.players.get(n).ok());
        let options = action.blockers().iter().copied().map(CoupChoice::Card).collect();
        let interrupt = Interrupt::new(
            players,
            options,
            CoupChoice::Pass,
            self.interrupt_timeout(),
            CoupStep::Reacted,
        )?
        .max_responses(1)?
        .titled(format!("Block {actor}'s {}?", action.title()))
        .described("Claim a card that blocks the action")
        .result_message("Blocked with: ");
        out.push_interrupt(interrupt);
        Ok(())
    }
}

/// Every Coup continuation.
pub fn continuations() -> Result<ContinuationTable<Coup>> {
    ContinuationTable::builder()
        .on_prompts(CoupStep::ActionChosen, action_chosen)
        .on_prompts(CoupStep::TargetChosen, target_chosen)
        .on_prompts(CoupStep::InfluenceLost, influence_lost)
        .on_prompts(CoupStep::CardRevealed, card_revealed)
        .on_prompts(CoupStep::CardsReturned, cards_returned)
        .on_interrupt(CoupStep::Challenged, challenged)
        .on_interrupt(CoupStep::Reacted, reacted)
        .build()
}

/// The lone prompt's player and selection. A timeout names the manual command.
fn single(results: PromptResults<CoupChoice>, command: &str) -> Result<(String, Selection<CoupChoice>)> {
    let (name, selection) = results.into_single()?;
    match selection {
        Some(selection) => Ok((name, selection)),
        None => Err(Error::illegal(format!(
            "{name} did not choose in time. Use the '{command}' command"
        ))),
    }
}

fn unexpected(selection: &[CoupChoice]) -> Error {
    Error::game(format!("Unexpected selection: {selection:?}"))
}

fn action_chosen(game: &mut Coup, results: PromptResults<CoupChoice>) -> Result<CoupOutcome> {
    let (_, selection) = single(results, "action")?;
    let [CoupChoice::Action(action)] = selection.as_slice() else {
        return Err(unexpected(&selection));
    };
    let mut out = CoupOutcome::new();
    if action.needs_target() {
        game.current_action = Some(*action);
        game.prompt_target(*action, &mut out)?;
    } else {
        game.process_action(*action, None, &mut out)?;
    }
    Ok(out)
}

fn target_chosen(game: &mut Coup, results: PromptResults<CoupChoice>) -> Result<CoupOutcome> {
    let (_, selection) = single(results, "action")?;
    let [CoupChoice::Player(target)] = selection.as_slice() else {
        return Err(unexpected(&selection));
    };
    let action = game
        .current_action
        .ok_or_else(|| Error::game("A target was chosen with no action pending"))?;
    let mut out = CoupOutcome::new();
    game.process_action(action, Some(target), &mut out)?;
    Ok(out)
}

fn influence_lost(game: &mut Coup, results: PromptResults<CoupChoice>) -> Result<CoupOutcome> {
    let (name, selection) = single(results, "reveal")?;
    let [CoupChoice::Slot(_, card)] = selection.as_slice() else {
        return Err(unexpected(&selection));
    };
    let mut out = CoupOutcome::new();
    game.process_lost_influence(&name, *card, &mut out)?;
    Ok(out)
}

fn card_revealed(game: &mut Coup, results: PromptResults<CoupChoice>) -> Result<CoupOutcome> {
    let (name, selection) = single(results, "reveal")?;
    let [CoupChoice::Slot(_, card)] = selection.as_slice() else {
        return Err(unexpected(&selection));
    };
    let mut out = CoupOutcome::new();
    game.process_reveal(&name, *card, &mut out)?;
    Ok(out)
}

fn cards_returned(game: &mut Coup, results: PromptResults<CoupChoice>) -> Result<CoupOutcome> {
    let (name, selection) = single(results, "exchange")?;
    let [CoupChoice::Slot(_, first), CoupChoice::Slot(_, second)] = selection.as_slice() else {
        return Err(unexpected(&selection));
    };
    let mut out = CoupOutcome::new();
    game.process_exchange(&name, *first, *second, &mut out)?;
    Ok(out)
}

fn challenged(game: &mut Coup, results: InterruptResults<CoupChoice>) -> Result<CoupOutcome> {
    let challenger = results.responder()?.map(|r| r.name.clone());
    let mut out = CoupOutcome::new();
    game.process_challenge(challenger.as_deref(), &mut out)?;
    Ok(out)
}

fn reacted(game: &mut Coup, results: InterruptResults<CoupChoice>) -> Result<CoupOutcome> {
    let mut out = CoupOutcome::new();
    match results.responder()? {
        None => game.process_reaction(None, &mut out)?,
        Some(response) => {
            let [CoupChoice::Card(card)] = response.selection.as_slice() else {
                return Err(unexpected(&response.selection));
            };
            let name = response.name.clone();
            game.process_reaction(Some((&name, *card)), &mut out)?;
        }
    }
    Ok(out)
}
