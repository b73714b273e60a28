//! Coup game state and rules.

use tracing::{debug, info};

use crate::commands::CommandTable;
use crate::core::config::{GameSettings, Toggles};
use crate::core::error::{Error, Result};
use crate::core::phase::TurnTracker;
use crate::core::player::{PlayerRegistry, PLAYER};
use crate::core::rng::GameRng;
use crate::games::coup::{
    commands, prompts, Card, CoupAction, CoupChoice, CoupOutcome, CoupPhase, CoupStep,
    ACTIVE_PLAYER, BUTTON_PROMPTS, CURRENT_PLAYER, EMOJIS, FORCED_COUP_COINS, INTERRUPT_PROMPTS,
    MAX_PLAYERS, MIN_PLAYERS, OPTIONS, STARTING_COINS,
};
use crate::games::lobby::Lobby;
use crate::rules::{ContinuationTable, Game};
use crate::zones::{Deck, DeckPosition};

/// A player's influence and coins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoupHand {
    pub cards: Vec<Card>,
    pub money: u32,
}

impl CoupHand {
    /// Take one copy of `card` out of the hand.
    fn discard(&mut self, card: Card) -> bool {
        match self.cards.iter().position(|c| *c == card) {
            Some(idx) => {
                self.cards.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// One game of Coup.
pub struct Coup {
    settings: GameSettings,
    pub(crate) players: PlayerRegistry<CoupHand>,
    pub(crate) lobby: Lobby,
    pub(crate) turn: TurnTracker<CoupPhase>,
    pub(crate) options: Toggles,
    pub(crate) rng: GameRng,
    pub(crate) deck: Deck<Card>,
    pub(crate) order: Vec<String>,
    pub(crate) revealed: Vec<Card>,
    pub(crate) current_action: Option<CoupAction>,
    pub(crate) target: Option<String>,
    pub(crate) reacting: Option<(String, Card)>,
    pub(crate) challenger: Option<String>,
}

fn court_deck() -> Vec<Card> {
    Card::ALL.iter().flat_map(|c| [*c; 3]).collect()
}

impl Coup {
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        let mut rng = GameRng::from_seed(settings.seed);
        let deck = Deck::new(court_deck(), Some(&mut rng), false);
        Self {
            settings,
            players: PlayerRegistry::new(),
            lobby: Lobby::new(),
            turn: TurnTracker::new(CoupPhase::NewGame),
            options: Toggles::new(OPTIONS),
            rng,
            deck,
            order: Vec::new(),
            revealed: Vec::new(),
            current_action: None,
            target: None,
            reacting: None,
            challenger: None,
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn state(&self) -> CoupPhase {
        self.turn.state()
    }

    #[must_use]
    pub fn turn_state(&self) -> Option<CoupPhase> {
        self.turn.turn_state()
    }

    /// Turn order of players still in the game.
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn hand(&self, name: &str) -> Result<&CoupHand> {
        Ok(&self.players.get(name)?.fields)
    }

    /// Mutable access to a hand, for table corrections and test setups.
    pub fn hand_mut(&mut self, name: &str) -> Result<&mut CoupHand> {
        Ok(&mut self.players.get_mut(name)?.fields)
    }

    pub fn current_player(&self) -> Result<String> {
        self.players
            .sole_with_role(CURRENT_PLAYER)
            .map(|p| p.name().to_owned())
    }

    #[must_use]
    pub fn deck(&self) -> &Deck<Card> {
        &self.deck
    }

    /// Cards lost so far, face up.
    #[must_use]
    pub fn revealed(&self) -> &[Card] {
        &self.revealed
    }

    #[must_use]
    pub fn current_action(&self) -> Option<CoupAction> {
        self.current_action
    }

    #[must_use]
    pub fn options(&self) -> &Toggles {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Toggles {
        &mut self.options
    }

    pub(crate) fn buttons(&self) -> bool {
        self.options.is_enabled(BUTTON_PROMPTS)
    }

    pub(crate) fn interrupts(&self) -> bool {
        self.buttons() && self.options.is_enabled(INTERRUPT_PROMPTS)
    }

    pub(crate) fn in_game(&self, name: &str) -> bool {
        self.order.iter().any(|n| n == name)
    }

    fn action(&self) -> Result<CoupAction> {
        self.current_action
            .ok_or_else(|| Error::game("No action is in progress"))
    }

    fn target_name(&self) -> Result<String> {
        self.target
            .clone()
            .ok_or_else(|| Error::game("The current action has no target"))
    }

    fn reaction(&self) -> Result<(String, Card)> {
        self.reacting
            .clone()
            .ok_or_else(|| Error::game("No reaction is in progress"))
    }

    fn clear_turn(&mut self) {
        self.current_action = None;
        self.target = None;
        self.reacting = None;
        self.challenger = None;
    }

    // === Lobby ===

    /// Send everyone back to the lobby, keeping their seats.
    pub fn restart(&mut self) {
        for player in self.players.iter_mut() {
            player.fields = CoupHand::default();
            player.remove_role(CURRENT_PLAYER);
            player.remove_role(ACTIVE_PLAYER);
            player.give_role(PLAYER);
        }
        self.deck = Deck::new(court_deck(), Some(&mut self.rng), false);
        self.order.clear();
        self.revealed.clear();
        self.clear_turn();
        self.turn.reset(CoupPhase::NewGame);
        info!("coup restarted");
    }

    // === Board ===

    /// Public view of the table.
    #[must_use]
    pub fn board(&self) -> String {
        let mut lines = Vec::new();
        if !self.revealed.is_empty() {
            let cards: Vec<_> = self.revealed.iter().map(ToString::to_string).collect();
            lines.push(format!("Revealed cards: {}", cards.join(", ")));
        }
        for name in &self.order {
            let Ok(player) = self.players.get(name) else {
                continue;
            };
            let marker = match (player.has_role(CURRENT_PLAYER), self.options.is_enabled(EMOJIS)) {
                (false, _) => "",
                (true, true) => " :crown:",
                (true, false) => " | Current Player",
            };
            lines.push(format!(
                "{name} | cards: {} | money: {}{marker}",
                player.fields.cards.len(),
                player.fields.money
            ));
        }
        lines.join("\n")
    }

    /// A player's private view of their own hand.
    pub fn my_info(&self, name: &str) -> Result<String> {
        let hand = self.hand(name)?;
        let cards: Vec<_> = hand.cards.iter().map(ToString::to_string).collect();
        Ok(format!("{name} | cards: {} | money: {}", cards.join(", "), hand.money))
    }

    /// Everything, for debugging.
    #[must_use]
    pub fn cheat_sheet(&self) -> String {
        let deck: Vec<_> = self.deck.cards().iter().map(ToString::to_string).collect();
        let mut lines = vec![format!("deck: {}", deck.join(", "))];
        for player in self.players.iter() {
            let cards: Vec<_> = player.fields.cards.iter().map(ToString::to_string).collect();
            lines.push(format!(
                "{} | cards: {} | money: {}",
                player.name(),
                cards.join(", "),
                player.fields.money
            ));
        }
        lines.join("\n")
    }

    // === Turn flow ===

    /// Deal, seat, and hand the first turn out.
    pub fn start_game(&mut self, out: &mut CoupOutcome) -> Result<()> {
        let count = self.players.len();
        if count < MIN_PLAYERS {
            return Err(Error::illegal(format!(
                "Need at least {MIN_PLAYERS} players to start! There are currently: {count}"
            )));
        }
        if count > MAX_PLAYERS {
            return Err(Error::illegal(format!(
                "Max player count is {MAX_PLAYERS}! There are currently: {count}"
            )));
        }

        self.deck = Deck::new(court_deck(), Some(&mut self.rng), false);
        self.revealed.clear();
        for name in self.players.names() {
            let cards = self.deck.draw(2, &mut self.rng)?;
            let player = self.players.get_mut(&name)?;
            player.fields = CoupHand {
                cards: cards.clone(),
                money: STARTING_COINS,
            };
            for card in cards {
                out.push_message(player.message_with_image(card.describe(), card.image(), false));
            }
        }

        let mut order = self.players.names();
        self.rng.shuffle(&mut order);
        self.order = order;
        let first = self.order[0].clone();
        self.players.get_mut(&first)?.give_role(CURRENT_PLAYER);
        self.turn.advance(CoupPhase::Action)?;
        self.clear_turn();

        info!(players = count, first = %first, "coup started");
        out.push_text("Beginning Game of Coup!");
        out.push_text(self.board());
        out.push_text(format!("{first} it is your turn!"));
        self.prompt_action(out)
    }

    /// Pass the turn to the next player in order.
    pub(crate) fn next_turn(&mut self, out: &mut CoupOutcome) -> Result<()> {
        let current = self.current_player()?;
        let idx = self
            .order
            .iter()
            .position(|n| *n == current)
            .ok_or_else(|| Error::game(format!("{current} is not in the turn order")))?;
        let next = self.order[(idx + 1) % self.order.len()].clone();

        self.players.get_mut(&current)?.remove_role(CURRENT_PLAYER);
        self.players.get_mut(&next)?.give_role(CURRENT_PLAYER);
        self.turn.advance(CoupPhase::Action)?;
        self.clear_turn();

        debug!(from = %current, to = %next, "next turn");
        out.push_text(self.board());
        out.push_text(format!("{next} it is your turn!"));
        self.prompt_action(out)
    }

    fn game_over(&mut self, out: &mut CoupOutcome) -> Result<()> {
        let [winner] = self.order.as_slice() else {
            return Err(Error::game(format!(
                "Game over with {} players left",
                self.order.len()
            )));
        };
        let winner = winner.clone();
        self.turn.reset(CoupPhase::GameEnd);
        self.clear_turn();
        info!(winner = %winner, "coup finished");
        out.push_text(format!(
            "GAME OVER\n{winner} is the only player left standing! They win!!!\n Play Again? (use the command: 'restart')"
        ));
        Ok(())
    }

    // === Actions ===

    /// The current player takes `action`.
    pub fn process_action(&mut self, action: CoupAction, target: Option<&str>, out: &mut CoupOutcome) -> Result<()> {
        let actor = self.current_player()?;
        let money = self.hand(&actor)?.money;
        if money >= FORCED_COUP_COINS && action != CoupAction::Coup {
            return Err(Error::illegal(format!(
                "{actor} has {money} coins. With {FORCED_COUP_COINS} or more you have to 'coup' someone"
            )));
        }

        let target = match (action.needs_target(), target) {
            (true, None) => {
                return Err(Error::illegal(format!("Action: {action} requires a target")));
            }
            (false, Some(_)) => {
                return Err(Error::illegal(format!("Action: {action} does not take a target")));
            }
            (false, None) => None,
            (true, Some(t)) => {
                let t = t.to_ascii_lowercase();
                if t == actor {
                    return Err(Error::illegal(format!(
                        "Cannot target yourself with {action}. Try again."
                    )));
                }
                if !self.in_game(&t) {
                    return Err(Error::illegal(format!("{t} is not in the game")));
                }
                Some(t)
            }
        };
        if money < action.cost() {
            return Err(Error::illegal(format!(
                "{action} costs {} coins. {actor} only has {money}",
                action.cost()
            )));
        }

        self.current_action = Some(action);
        self.target = target.clone();
        debug!(actor = %actor, %action, target = ?target, "action declared");

        match action {
            CoupAction::Income => {
                self.hand_mut(&actor)?.money += 1;
                out.push_text(format!("{actor} took Income (+1 coin)"));
                self.next_turn(out)
            }
            CoupAction::ForeignAid => {
                out.push_text(format!("{actor} is attempting Foreign Aid"));
                self.ask_for_reaction(out)
            }
            CoupAction::Coup => {
                let target = self.target_name()?;
                self.hand_mut(&actor)?.money -= action.cost();
                out.push_text(format!("{actor} launched a Coup against {target}!"));
                self.lose_influence(&target, out)
            }
            CoupAction::Tax | CoupAction::Assassinate | CoupAction::Steal | CoupAction::Exchange => {
                let card = action
                    .claimed_card()
                    .ok_or_else(|| Error::game(format!("{action} has no character")))?;
                let against = self.target.as_ref().map(|t| format!(" against {t}")).unwrap_or_default();
                out.push_text(format!("{actor} claims {card} to {action}{against}"));
                self.ask_for_challenge(out)
            }
        }
    }

    /// The claimed action stands: carry it out.
    fn resolve_action(&mut self, out: &mut CoupOutcome) -> Result<()> {
        let actor = self.current_player()?;
        match self.action()? {
            CoupAction::Tax => {
                self.hand_mut(&actor)?.money += 3;
                out.push_text(format!("{actor} collected Tax (+3 coins)"));
                self.next_turn(out)
            }
            CoupAction::Assassinate => {
                let target = self.target_name()?;
                let hand = self.hand_mut(&actor)?;
                hand.money = hand
                    .money
                    .checked_sub(CoupAction::Assassinate.cost())
                    .ok_or_else(|| Error::game(format!("{actor} cannot pay for the assassination")))?;
                out.push_text(format!("{actor} paid 3 coins to assassinate {target}"));
                if self.in_game(&target) {
                    self.ask_for_reaction(out)
                } else {
                    self.next_turn(out)
                }
            }
            CoupAction::Steal => self.ask_for_reaction(out),
            CoupAction::Exchange => {
                let drawn = self.deck.draw(2, &mut self.rng)?;
                self.hand_mut(&actor)?.cards.extend(drawn);
                self.turn.advance(CoupPhase::Exchange)?;
                out.push_text(format!("{actor} is exchanging cards with the Court Deck"));
                self.prompt_exchange(&actor, out)
            }
            other => Err(Error::game(format!("{other} cannot be challenged"))),
        }
    }

    /// Nobody blocked, or the block fell: the action succeeds.
    fn action_succeeds(&mut self, out: &mut CoupOutcome) -> Result<()> {
        self.turn.resume()?;
        let actor = self.current_player()?;
        match self.action()? {
            CoupAction::ForeignAid => {
                self.hand_mut(&actor)?.money += 2;
                out.push_text(format!("{actor} took Foreign Aid (+2 coins)"));
                self.next_turn(out)
            }
            CoupAction::Assassinate => {
                let target = self.target_name()?;
                self.turn.advance(CoupPhase::Action)?;
                if self.in_game(&target) {
                    out.push_text(format!("{actor}'s assassination of {target} succeeds"));
                    self.lose_influence(&target, out)
                } else {
                    self.next_turn(out)
                }
            }
            CoupAction::Steal => {
                let target = self.target_name()?;
                let amount = self.hand(&target)?.money.min(2);
                self.hand_mut(&target)?.money -= amount;
                self.hand_mut(&actor)?.money += amount;
                out.push_text(format!("{actor} stole {amount} coins from {target}"));
                self.next_turn(out)
            }
            other => Err(Error::game(format!("{other} cannot be blocked"))),
        }
    }

    // === Challenges ===

    /// Who is claiming which card right now.
    fn claim(&self) -> Result<(String, Card)> {
        match self.turn.turn_state() {
            Some(CoupPhase::Challenge) => {
                let action = self.action()?;
                let card = action
                    .claimed_card()
                    .ok_or_else(|| Error::game(format!("{action} claims no character")))?;
                Ok((self.current_player()?, card))
            }
            Some(CoupPhase::ReactionChallenge) => self.reaction(),
            other => Err(Error::game(format!("No claim to challenge in turn state {other:?}"))),
        }
    }

    /// Open the floor for challenges to the current claim.
    pub(crate) fn ask_for_challenge(&mut self, out: &mut CoupOutcome) -> Result<()> {
        match self.turn.state() {
            CoupPhase::Action => self.turn.advance(CoupPhase::Challenge)?,
            CoupPhase::Reaction => self.turn.advance(CoupPhase::ReactionChallenge)?,
            other => {
                return Err(Error::game(format!("Cannot ask for a challenge from state: {other}")));
            }
        }
        let (claimant, card) = self.claim()?;
        self.offer_challenge(&claimant, card, out)
    }

    /// Resolve the challenge window. `None` means nobody challenged.
    pub fn process_challenge(&mut self, challenger: Option<&str>, out: &mut CoupOutcome) -> Result<()> {
        let Some(challenger) = challenger else {
            return match self.turn.state() {
                CoupPhase::Challenge => self.resolve_action(out),
                CoupPhase::ReactionChallenge => {
                    let (reactor, card) = self.reaction()?;
                    out.push_text(format!(
                        "Nobody challenged. {reactor}'s {card} blocked {}'s {}",
                        self.current_player()?,
                        self.action()?.title()
                    ));
                    self.next_turn(out)
                }
                other => Err(Error::game(format!("Cannot pass on a challenge from state: {other}"))),
            };
        };

        let (claimant, card) = self.claim()?;
        if challenger == claimant {
            return Err(Error::illegal(format!("{challenger} cannot challenge their own claim.")));
        }
        if !self.in_game(challenger) {
            return Err(Error::illegal(format!("{challenger} is not in the game")));
        }
        self.challenger = Some(challenger.to_owned());
        out.push_text(format!("{challenger} challenges {claimant}'s claim of {card}!"));
        self.ask_for_reveal(&claimant, out)
    }

    fn ask_for_reveal(&mut self, claimant: &str, out: &mut CoupOutcome) -> Result<()> {
        let cards = self.hand(claimant)?.cards.clone();
        self.turn.interrupt(CoupPhase::Reveal);
        match cards.as_slice() {
            [] => Err(Error::game(format!("{claimant} has no cards to reveal"))),
            [only] => {
                out.push_text(format!("{claimant} has only one card and must reveal it"));
                self.process_reveal(claimant, *only, out)
            }
            _ => {
                self.players.get_mut(claimant)?.give_role(ACTIVE_PLAYER);
                self.prompt_reveal(claimant, out)
            }
        }
    }

    /// The challenged player shows `card`.
    pub fn process_reveal(&mut self, name: &str, card: Card, out: &mut CoupOutcome) -> Result<()> {
        let (claimant, claimed) = self.claim()?;
        if name != claimant {
            return Err(Error::illegal(format!("{name} is not the one who was challenged")));
        }
        if !self.hand(name)?.cards.contains(&card) {
            return Err(Error::illegal(format!(
                "You don't have {card} in your hand. Choose another"
            )));
        }
        self.players.get_mut(name)?.remove_role(ACTIVE_PLAYER);

        if card != claimed {
            out.push_text(format!("{name} reveals {card}, not {claimed}! The challenge succeeds"));
            return self.process_lost_influence(name, card, out);
        }

        out.push_text(format!("{name} reveals {card}! The challenge fails"));
        self.hand_mut(name)?.discard(card);
        self.deck.add_to_deck(vec![card], DeckPosition::Bottom);
        self.deck.shuffle(&mut self.rng);
        let replacement = self.deck.draw(1, &mut self.rng)?;
        let player = self.players.get_mut(name)?;
        player.fields.cards.extend(replacement.iter().copied());
        for new_card in replacement {
            out.push_message(player.message(format!("You drew a new card: {new_card}")));
        }
        let challenger = self
            .challenger
            .clone()
            .ok_or_else(|| Error::game("A challenge was answered but nobody challenged"))?;
        self.lose_influence(&challenger, out)
    }

    // === Influence ===

    /// `name` must give up a card.
    pub(crate) fn lose_influence(&mut self, name: &str, out: &mut CoupOutcome) -> Result<()> {
        let cards = self.hand(name)?.cards.clone();
        self.turn.interrupt(CoupPhase::LoseInfluence);
        match cards.as_slice() {
            [] => Err(Error::game(format!("{name} has no influence to lose"))),
            [only] => self.process_lost_influence(name, *only, out),
            _ => {
                self.players.get_mut(name)?.give_role(ACTIVE_PLAYER);
                out.push_text(format!("{name} must lose an influence"));
                self.prompt_lose_influence(name, out)
            }
        }
    }

    /// `name` gives up `card`.
    pub fn process_lost_influence(&mut self, name: &str, card: Card, out: &mut CoupOutcome) -> Result<()> {
        let player = self.players.get_mut(name)?;
        if !player.fields.discard(card) {
            return Err(Error::illegal(format!(
                "You don't have {card} in your hand. Choose another"
            )));
        }
        player.remove_role(ACTIVE_PLAYER);
        let eliminated = player.fields.cards.is_empty();
        let was_current = player.has_role(CURRENT_PLAYER);
        self.revealed.push(card);
        out.push_text(format!("{name} lost their {card}"));

        if eliminated {
            info!(player = %name, "player eliminated");
            out.push_text(format!("{name} has no influence left and is out of the game!"));
            let idx = self
                .order
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| Error::game(format!("{name} is not in the turn order")))?;
            if was_current {
                let len = self.order.len();
                let previous = self.order[(idx + len - 1) % len].clone();
                self.players.get_mut(name)?.remove_role(CURRENT_PLAYER);
                self.players.get_mut(&previous)?.give_role(CURRENT_PLAYER);
                self.order.remove(idx);
                return if self.order.len() <= 1 {
                    self.game_over(out)
                } else {
                    self.next_turn(out)
                };
            }
            self.order.remove(idx);
            if self.order.len() <= 1 {
                return self.game_over(out);
            }
        }

        match (self.turn.state(), self.turn.turn_state()) {
            (CoupPhase::LoseInfluence, Some(CoupPhase::Action)) => {
                self.turn.resume()?;
                self.next_turn(out)
            }
            (CoupPhase::LoseInfluence, Some(CoupPhase::Reaction)) => {
                self.turn.resume()?;
                self.next_turn(out)
            }
            (CoupPhase::LoseInfluence, Some(CoupPhase::Challenge)) => {
                self.turn.resume()?;
                self.resolve_action(out)
            }
            (CoupPhase::LoseInfluence, Some(CoupPhase::ReactionChallenge)) => {
                let (reactor, _) = self.reaction()?;
                out.push_text(format!(
                    "{}'s {} was blocked by {reactor}",
                    self.current_player()?,
                    self.action()?.title()
                ));
                self.next_turn(out)
            }
            (CoupPhase::Reveal, Some(CoupPhase::Challenge)) => self.next_turn(out),
            (CoupPhase::Reveal, Some(CoupPhase::ReactionChallenge)) => self.action_succeeds(out),
            (state, turn_state) => Err(Error::game(format!(
                "Unexpected state after losing influence: {state} (turn state {turn_state:?})"
            ))),
        }
    }

    // === Reactions ===

    pub(crate) fn ask_for_reaction(&mut self, out: &mut CoupOutcome) -> Result<()> {
        let action = self.action()?;
        let actor = self.current_player()?;
        let eligible: Vec<String> = match action {
            CoupAction::ForeignAid => self.order.iter().filter(|n| **n != actor).cloned().collect(),
            CoupAction::Steal | CoupAction::Assassinate => vec![self.target_name()?],
            other => return Err(Error::game(format!("{other} cannot be blocked"))),
        };
        self.turn.advance(CoupPhase::Reaction)?;
        self.offer_reaction(action, &eligible, out)
    }

    /// Resolve the block window. `None` means nobody blocked.
    pub fn process_reaction(&mut self, reaction: Option<(&str, Card)>, out: &mut CoupOutcome) -> Result<()> {
        let Some((name, card)) = reaction else {
            return self.action_succeeds(out);
        };
        let action = self.action()?;
        let actor = self.current_player()?;
        match action {
            CoupAction::ForeignAid => {
                if name == actor {
                    return Err(Error::illegal(format!("{actor} cannot block their own Foreign Aid")));
                }
            }
            CoupAction::Steal | CoupAction::Assassinate => {
                let target = self.target_name()?;
                if name != target {
                    return Err(Error::illegal(format!(
                        "Only {target} can block the {}",
                        action.title()
                    )));
                }
            }
            other => return Err(Error::game(format!("{other} cannot be blocked"))),
        }
        if !action.blockers().contains(&card) {
            return Err(Error::illegal(format!("{card} cannot block {}", action.title())));
        }
        if !self.in_game(name) {
            return Err(Error::illegal(format!("{name} is not in the game")));
        }
        self.reacting = Some((name.to_owned(), card));
        out.push_text(format!("{name} claims {card} to block {actor}'s {}", action.title()));
        self.ask_for_challenge(out)
    }

    // === Exchange ===

    /// The current player returns two cards to the court deck.
    pub fn process_exchange(&mut self, name: &str, first: Card, second: Card, out: &mut CoupOutcome) -> Result<()> {
        let current = self.current_player()?;
        if name != current {
            return Err(Error::illegal(format!("Only {current} is exchanging cards")));
        }
        let mut hand = self.hand(name)?.clone();
        for card in [first, second] {
            if !hand.discard(card) {
                return Err(Error::illegal(format!("You don't have {card} in your hand")));
            }
        }
        let player = self.players.get_mut(name)?;
        player.fields = hand;
        let kept: Vec<_> = player.fields.cards.iter().map(ToString::to_string).collect();
        out.push_message(player.message(format!("You kept: {}", kept.join(", "))));

        self.deck.add_to_deck(vec![first, second], DeckPosition::Bottom);
        self.deck.shuffle(&mut self.rng);
        out.push_text(format!("{name} returned two cards to the Court Deck"));
        self.next_turn(out)
    }
}

impl Game for Coup {
    type Phase = CoupPhase;
    type Choice = CoupChoice;
    type Step = CoupStep;
    type Fields = CoupHand;

    fn phase(&self) -> CoupPhase {
        self.turn.state()
    }

    fn settings(&self) -> &GameSettings {
        &self.settings
    }

    fn registry(&self) -> &PlayerRegistry<CoupHand> {
        &self.players
    }

    fn command_table() -> Result<CommandTable<Self>> {
        commands::table()
    }

    fn continuation_table() -> Result<ContinuationTable<Self>> {
        prompts::continuations()
    }

    fn kill(&mut self) {
        self.restart();
        self.players.clear();
        self.lobby.clear();
    }
}
