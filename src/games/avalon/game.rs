//! Avalon game state and rules.

use tracing::{debug, info};

use crate::commands::CommandTable;
use crate::core::config::{GameSettings, Toggles};
use crate::core::error::{Error, Result};
use crate::core::identity::Identity;
use crate::core::player::PlayerRegistry;
use crate::core::rng::GameRng;
use crate::games::avalon::board::{Board, HAMMER_VOTE, LOG_RULE, MISSIONS_TO_WIN};
use crate::games::avalon::characters::{Character, CharacterSet, Team};
use crate::games::avalon::{
    commands, prompts, AvalonChoice, AvalonOutcome, AvalonPhase, AvalonStep, MissionCard, Vote,
    ASSASSIN, AUTO_NEXT, BUTTON_PROMPTS, EMOJIS, LEADER, OPTIONS, TEAM, TEAM_EVIL, TEAM_GOOD,
};
use crate::games::lobby::{normalize_name, Lobby};
use crate::protocol::RichMessage;
use crate::rules::{ContinuationTable, Game};

const BLANK: &str = ".";

/// A player's hidden character and current cards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvalonSeat {
    pub character: Option<Character>,
    pub vote: Option<Vote>,
    pub mission_card: Option<MissionCard>,
    pub private_info: Option<RichMessage>,
    /// Public markers: leadership and mission status.
    pub public: [String; 2],
}

impl Default for AvalonSeat {
    fn default() -> Self {
        Self {
            character: None,
            vote: None,
            mission_card: None,
            private_info: None,
            public: [BLANK.to_owned(), BLANK.to_owned()],
        }
    }
}

#[derive(Clone, Copy)]
enum Symbol {
    Leader,
    Hammer,
    OnMission,
    Approve,
    Reject,
    Team(Team),
}

/// One game of Avalon.
pub struct Avalon {
    settings: GameSettings,
    pub(crate) players: PlayerRegistry<AvalonSeat>,
    pub(crate) lobby: Lobby,
    phase: AvalonPhase,
    pub(crate) options: Toggles,
    rng: GameRng,
    board: Option<Board>,
    pub(crate) order: Vec<String>,
    pub(crate) specials: CharacterSet,
    pub(crate) on_mission: Vec<String>,
    winner: Option<String>,
    pub(crate) lock_voting: bool,
}

impl Avalon {
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        let rng = GameRng::from_seed(settings.seed);
        Self {
            settings,
            players: PlayerRegistry::new(),
            lobby: Lobby::new(),
            phase: AvalonPhase::NewGame,
            options: Toggles::new(OPTIONS),
            rng,
            board: None,
            order: Vec::new(),
            specials: CharacterSet::new(),
            on_mission: Vec::new(),
            winner: None,
            lock_voting: false,
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn seat(&self, name: &str) -> Result<&AvalonSeat> {
        Ok(&self.players.get(name)?.fields)
    }

    #[must_use]
    pub fn on_mission(&self) -> &[String] {
        &self.on_mission
    }

    #[must_use]
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    #[must_use]
    pub fn specials(&self) -> &CharacterSet {
        &self.specials
    }

    #[must_use]
    pub fn options(&self) -> &Toggles {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Toggles {
        &mut self.options
    }

    /// Whether manual `vote`/`mission` commands are refused.
    #[must_use]
    pub fn is_voting_locked(&self) -> bool {
        self.lock_voting
    }

    pub fn leader(&self) -> Result<String> {
        self.players.sole_with_role(LEADER).map(|p| p.name().to_owned())
    }

    pub(crate) fn buttons(&self) -> bool {
        self.options.is_enabled(BUTTON_PROMPTS)
    }

    pub(crate) fn board_ref(&self) -> Result<&Board> {
        self.board
            .as_ref()
            .ok_or_else(|| Error::game("No game board: the game has not started"))
    }

    fn board_mut(&mut self) -> Result<&mut Board> {
        self.board
            .as_mut()
            .ok_or_else(|| Error::game("No game board: the game has not started"))
    }

    fn symbol(&self, symbol: Symbol) -> &'static str {
        let emojis = self.options.is_enabled(EMOJIS);
        match (symbol, emojis) {
            (Symbol::Leader, false) => "Team Leader",
            (Symbol::Leader, true) => "Team Leader :crown:",
            (Symbol::Hammer, false) => "Hammer",
            (Symbol::Hammer, true) => ":hammer:",
            (Symbol::OnMission, false) => "On Mission",
            (Symbol::OnMission, true) => ":crossed_swords:",
            (Symbol::Approve, false) => "approve",
            (Symbol::Approve, true) => ":white_check_mark:",
            (Symbol::Reject, false) => "reject",
            (Symbol::Reject, true) => ":x:",
            (Symbol::Team(_), false) => "",
            (Symbol::Team(Team::Good), true) => ":blue_circle:",
            (Symbol::Team(Team::Evil), true) => ":red_circle:",
        }
    }

    pub(crate) fn team_list(&self) -> String {
        self.on_mission.join(", ")
    }

    fn seat_mut(&mut self, name: &str) -> Result<&mut AvalonSeat> {
        Ok(&mut self.players.get_mut(name)?.fields)
    }

    // === Lobby ===

    /// Seat a new player at the end of the turn order.
    pub fn join(&mut self, identity: &Identity, name: &str) -> Result<String> {
        let debug = self.settings.debug;
        let name = normalize_name(name)?;
        let joined = self
            .lobby
            .join(&mut self.players, identity, &name, AvalonSeat::default(), debug)?;
        self.order.push(name);
        Ok(joined)
    }

    pub fn kick(&mut self, name: &str) -> Result<String> {
        let name = name.to_ascii_lowercase();
        self.lobby.kick(&mut self.players, &name)?;
        self.order.retain(|n| *n != name);
        Ok(format!("{name} has been kicked"))
    }

    /// Back to `new_game` with the same players and rules.
    pub fn reset_game(&mut self) {
        for player in self.players.iter_mut() {
            player.fields = AvalonSeat::default();
            for role in [TEAM_GOOD, TEAM_EVIL, LEADER, TEAM, ASSASSIN] {
                player.remove_role(role);
            }
        }
        self.board = None;
        self.phase = AvalonPhase::NewGame;
        self.on_mission.clear();
        self.winner = None;
        self.lock_voting = false;
    }

    // === Views ===

    /// `identity: name | marker | status` per seat.
    #[must_use]
    pub fn players_info(&self) -> String {
        self.order
            .iter()
            .filter_map(|name| self.players.get(name).ok())
            .map(|p| {
                format!(
                    "{}: {} | {} | {}",
                    p.identity(),
                    p.name(),
                    p.fields.public[0],
                    p.fields.public[1]
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn help_message(&self) -> Result<String> {
        Ok(match self.phase {
            AvalonPhase::NewGame => "Everyone join and select the rules!".to_owned(),
            AvalonPhase::TeamSelect => format!(
                "{} please choose {} players for the mission [command: 'choose <player>']",
                self.leader()?,
                self.board_ref()?.current_size()
            ),
            AvalonPhase::Voting => "Everyone vote approve or reject on the current mission! \
                 [command: 'vote approve' or 'vote reject']"
                .to_owned(),
            AvalonPhase::Mission => format!(
                "{} please select pass or fail [command: 'mission pass' or 'mission fail']",
                self.team_list()
            ),
            AvalonPhase::Stab => "Three Missions have Passed!\nAssassin please try to stab Merlin".to_owned(),
            AvalonPhase::GameEnd => format!(
                "{}\n Play Again?",
                self.winner.as_deref().unwrap_or_default()
            ),
        })
    }

    fn push_board(&self, out: &mut AvalonOutcome) -> Result<()> {
        let board = self.board_ref()?;
        out.push_text(board.mission_info());
        out.push_text(board.summary());
        Ok(())
    }

    pub fn my_info(&self, name: &str) -> Result<RichMessage> {
        self.seat(name)?
            .private_info
            .clone()
            .ok_or_else(|| Error::illegal("Characters have not been dealt yet"))
    }

    /// Special characters and enabled options.
    #[must_use]
    pub fn rules_summary(&self) -> String {
        let mut lines = vec!["The special characters are:".to_owned()];
        lines.extend(
            self.specials
                .iter()
                .map(|c| format!("    {c} | {} | {}", c.team(), c.description())),
        );
        lines.push(String::new());
        lines.push(self.options.describe());
        lines.join("\n")
    }

    /// Every rule that `change_rule` accepts.
    #[must_use]
    pub fn rule_options(&self) -> String {
        let mut lines = vec!["Special Characters:".to_owned()];
        lines.extend(
            Character::ALL
                .into_iter()
                .filter(|c| c.is_special())
                .map(|c| format!("rule: {c} | options: 'add' 'remove' | description: {}", c.description())),
        );
        lines.push(String::new());
        lines.push("Enable/Disable-able rules:".to_owned());
        lines.extend(
            OPTIONS
                .iter()
                .map(|t| format!("rule: '{}' | options: 'enable' 'disable' | description: {}", t.key, t.description)),
        );
        lines.join("\n")
    }

    /// `add`/`remove` a special character or `enable`/`disable` an option.
    pub fn change_rule(&mut self, rule: &str, value: &str) -> Result<Vec<String>> {
        let value = value.to_ascii_lowercase();
        if let Some(character) = Character::parse_special(rule) {
            return match value.as_str() {
                "add" => self.specials.add(character),
                "remove" => self.specials.remove(character),
                _ => Err(Error::illegal(format!(
                    "Modifier not recognized, please select 'add' or 'remove' to change the character rule {character}"
                ))),
            };
        }
        if self.options.knows(rule) {
            return Ok(vec![self.options.set(rule, &value)?.to_owned()]);
        }
        Err(Error::illegal(format!("Rule not recognized: {rule}")))
    }

    // === Game flow ===

    /// `next`: advance whichever step the game is waiting on.
    pub fn next(&mut self, out: &mut AvalonOutcome) -> Result<()> {
        if self.buttons() {
            self.lock_voting = true;
        }
        let result = match self.phase {
            AvalonPhase::NewGame => self.set_up_game(out),
            AvalonPhase::TeamSelect => self.start_vote(out),
            AvalonPhase::Voting => self.process_vote(out),
            AvalonPhase::Mission => self.go_on_mission(out),
            AvalonPhase::Stab => {
                out.push_text("Currently Waiting for the Assassin to Stab someone");
                out.push_text(self.help_message()?);
                Ok(())
            }
            AvalonPhase::GameEnd => {
                self.reset_game();
                out.push_text("New Game!");
                out.push_text(self.players_info());
                out.push_text(self.help_message()?);
                Ok(())
            }
        };
        if result.is_err() {
            self.lock_voting = false;
        }
        result
    }

    /// Deal characters and hand out the first leadership.
    pub fn set_up_game(&mut self, out: &mut AvalonOutcome) -> Result<()> {
        let board = Board::new(self.players.len())?;
        let evil = board.evil_count();
        let good = board.player_count() - evil;
        let evil_specials = self.specials.count(Team::Evil);
        let good_specials = self.specials.count(Team::Good);
        if evil_specials > evil {
            return Err(Error::illegal(
                "Too many evil special characters for current player count",
            ));
        }
        if good_specials > good {
            return Err(Error::illegal(
                "Too many good special characters for current player count",
            ));
        }

        let mut deck: Vec<Character> = self.specials.iter().collect();
        deck.extend(std::iter::repeat(Character::VanillaEvil).take(evil - evil_specials));
        deck.extend(std::iter::repeat(Character::VanillaGood).take(good - good_specials));
        self.rng.shuffle(&mut deck);
        self.rng.shuffle(&mut self.order);

        for (name, character) in self.order.iter().zip(deck) {
            let player = self.players.get_mut(name)?;
            player.fields = AvalonSeat {
                character: Some(character),
                ..AvalonSeat::default()
            };
            player.give_role(match character.team() {
                Team::Good => TEAM_GOOD,
                Team::Evil => TEAM_EVIL,
            });
            if character == Character::Assassin {
                player.give_role(ASSASSIN);
            }
        }

        self.deal_private_info()?;

        let first = self.order[0].clone();
        let leader_symbol = self.symbol(Symbol::Leader).to_owned();
        let hammer_symbol = self.symbol(Symbol::Hammer).to_owned();
        let hammer = self.order[4 % self.order.len()].clone();
        let starting = self.players.get_mut(&first)?;
        starting.give_role(LEADER);
        starting.fields.public[0] = leader_symbol;
        self.seat_mut(&hammer)?.public[0] = hammer_symbol;

        self.board = Some(board);
        self.phase = AvalonPhase::TeamSelect;
        self.on_mission.clear();
        self.winner = None;
        info!(players = self.order.len(), leader = %first, "avalon started");

        self.push_board(out)?;
        out.push_text(self.players_info());
        for name in &self.order {
            if let Some(message) = self.seat(name)?.private_info.clone() {
                out.push_message(message);
            }
        }
        self.announce_leader(&first, out)
    }

    fn deal_private_info(&mut self) -> Result<()> {
        let mut merlin_sees = Vec::new();
        let mut percival_sees = Vec::new();
        let mut evil_sees = Vec::new();
        for name in &self.order {
            let Some(character) = self.seat(name)?.character else {
                continue;
            };
            if character.team() == Team::Evil && !character.hidden_from_merlin() {
                merlin_sees.push(name.clone());
            }
            if matches!(character, Character::Merlin | Character::Morgana) {
                percival_sees.push(name.clone());
            }
            if character.team() == Team::Evil && !character.hidden_from_evil() {
                evil_sees.push(name.clone());
            }
        }
        self.rng.shuffle(&mut merlin_sees);
        self.rng.shuffle(&mut percival_sees);
        self.rng.shuffle(&mut evil_sees);

        for name in self.order.clone() {
            let character = self
                .seat(&name)?
                .character
                .ok_or_else(|| Error::game(format!("{name} was not dealt a character")))?;
            let mut info = format!(
                "Your Player name is: {name}\nYour Character is: {character}\nYou are on: {}\n",
                character.team()
            );
            match character {
                Character::Merlin => {
                    info.push_str("You know the following are members of Team Evil:\n  ");
                    info.push_str(&merlin_sees.join("\n  "));
                    for hidden in [Character::Mordred, Character::Mordroberon] {
                        if self.specials.contains(hidden) {
                            info.push_str(&format!("\n\nHowever {hidden} (evil) is unknown to you"));
                        }
                    }
                }
                Character::Percival => {
                    info.push_str("You see the following players:\n  ");
                    info.push_str(&percival_sees.join("\n  "));
                    match percival_sees.len() {
                        1 => info.push_str("\n\nThis player is Merlin!"),
                        2 => info.push_str("\n\nOne of them is Merlin, the other Morgana"),
                        n => return Err(Error::game(format!("Percival sees {n} characters"))),
                    }
                }
                c if c.team() == Team::Evil && !c.hidden_from_evil() => {
                    info.push_str("You know the following are members of Team Evil:\n  ");
                    info.push_str(&evil_sees.join("\n  "));
                    for hidden in [Character::Oberon, Character::Mordroberon] {
                        if self.specials.contains(hidden) {
                            info.push_str(&format!("\n\nHowever {hidden} (evil) is unknown to you"));
                        }
                    }
                }
                _ => info.push_str("You don't know who anyone is. Good Luck!"),
            }
            let card = character.random_card(&mut self.rng);
            let player = self.players.get_mut(&name)?;
            player.fields.private_info = Some(player.message_with_image(info, card, true));
        }
        Ok(())
    }

    fn announce_leader(&mut self, leader: &str, out: &mut AvalonOutcome) -> Result<()> {
        let size = self.board_ref()?.current_size();
        let player = self.players.get(leader)?;
        out.push_message(player.message(format!(
            "{leader}: You are the Team Leader! Choose {size} players for your Mission! [command: 'choose <player_name>']"
        )));
        out.push_text(self.help_message()?);
        if self.buttons() {
            out.push_prompt(self.team_prompt(leader)?);
        }
        Ok(())
    }

    /// Leader adds `name` to the proposed team.
    pub fn choose(&mut self, name: &str) -> Result<String> {
        let name = name.to_ascii_lowercase();
        self.players.get(&name)?;
        if self.on_mission.contains(&name) {
            return Err(Error::illegal(format!("{name} is already on the mission.")));
        }
        let size = self.board_ref()?.current_size();
        if self.on_mission.len() >= size {
            return Err(Error::illegal(format!(
                "There are already {} people on the mission!",
                self.on_mission.len()
            )));
        }
        let symbol = self.symbol(Symbol::OnMission).to_owned();
        self.seat_mut(&name)?.public[1] = symbol;
        self.on_mission.push(name.clone());
        Ok(format!("{name} was added to the mission"))
    }

    /// Leader takes `name` off the proposed team.
    pub fn remove_from_team(&mut self, name: &str) -> Result<String> {
        let name = name.to_ascii_lowercase();
        let Some(idx) = self.on_mission.iter().position(|n| *n == name) else {
            return Err(Error::illegal(format!("{name} is NOT on the mission.")));
        };
        self.on_mission.remove(idx);
        self.seat_mut(&name)?.public[1] = BLANK.to_owned();
        Ok(format!("{name} was removed from the mission"))
    }

    /// Put the proposed team to a vote.
    pub fn start_vote(&mut self, out: &mut AvalonOutcome) -> Result<()> {
        let size = self.board_ref()?.current_size();
        let chosen = self.on_mission.len();
        if chosen < size {
            return Err(Error::illegal(format!(
                "Not enough players on the mission! Need {size}"
            )));
        }
        if chosen > size {
            return Err(Error::illegal(format!(
                "Too many players on the mission! Need {size}"
            )));
        }

        let leader = self.leader()?;
        let vote_track = self.board_ref()?.vote_track;
        self.phase = AvalonPhase::Voting;
        debug!(leader = %leader, team = %self.team_list(), "team proposed");

        if self.buttons() {
            self.lock_voting = true;
            out.push_text(self.help_message()?);
            for prompt in self.vote_prompts()? {
                out.push_prompt(prompt);
            }
        } else {
            let text = format!(
                "Vote on the proposed Mission!\n     Team Leader: {leader}\n     Team: {}\n     Vote Track: {vote_track}\n     [command: 'vote approve' or 'vote reject']",
                self.team_list()
            );
            for player in self.players.iter() {
                out.push_message(player.message(format!("{}: {text}", player.name())));
            }
            out.push_text(self.players_info());
            out.push_text(self.help_message()?);
        }
        Ok(())
    }

    /// Manual `vote approve|reject`.
    pub fn cast_vote(&mut self, name: &str, choice: &str, out: &mut AvalonOutcome) -> Result<()> {
        if self.lock_voting {
            return Err(Error::illegal(
                "Cannot Vote using the 'vote' Command while prompts are active!",
            ));
        }
        let vote = match choice.to_ascii_lowercase().as_str() {
            "approve" => Vote::Approve,
            "reject" => Vote::Reject,
            other => {
                return Err(Error::illegal(format!(
                    "'{other}' is not a valid option. Select 'approve' or 'reject'"
                )))
            }
        };
        let player = self.players.get_mut(name)?;
        if player.fields.vote.is_some() {
            return Err(Error::illegal("Vote failed: You already voted!"));
        }
        player.fields.vote = Some(vote);
        out.push_message(player.message(format!("You voted '{}' as {name}", AvalonChoice::Vote(vote))));

        let all_in = self.players.iter().all(|p| p.fields.vote.is_some());
        if all_in && self.options.is_enabled(AUTO_NEXT) && !self.buttons() {
            return self.process_vote(out);
        }
        Ok(())
    }

    /// Count the votes: approve the team, or pass leadership on.
    pub fn process_vote(&mut self, out: &mut AvalonOutcome) -> Result<()> {
        let mut approve = 0;
        let mut reject = 0;
        let mut missing = Vec::new();
        for name in &self.order {
            match self.seat(name)?.vote {
                Some(Vote::Approve) => approve += 1,
                Some(Vote::Reject) => reject += 1,
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(Error::illegal(format!(
                "The following players still need to vote: {}",
                missing.join(", ")
            )));
        }

        let leader = self.leader()?;
        let board = self.board_ref()?;
        let mut log = format!(
            "{LOG_RULE}\nMISSION {}\nVote Track: {}\nTeam Leader: {leader}\nTeam: {}\n\n",
            board.current_mission + 1,
            board.vote_track,
            self.team_list()
        );
        for name in &self.order {
            let symbol = match self.seat(name)?.vote {
                Some(Vote::Approve) => self.symbol(Symbol::Approve),
                _ => self.symbol(Symbol::Reject),
            };
            log.push_str(&format!("{name} : {symbol}\n"));
        }
        self.board_mut()?.vote_log.push(log.clone());
        out.push_text(log);
        for player in self.players.iter_mut() {
            player.fields.vote = None;
        }
        debug!(approve, reject, "votes counted");

        if approve > reject {
            out.push_text("MISSION APPROVED");
            for name in self.on_mission.clone() {
                self.players.get_mut(&name)?.give_role(TEAM);
            }
            self.board_mut()?.reset_vote_track();
            self.phase = AvalonPhase::Mission;
            let fails = {
                let board = self.board_ref()?;
                board.fails_required(board.current_mission)
            };
            if self.buttons() {
                self.push_board(out)?;
                out.push_text(self.help_message()?);
                for prompt in self.mission_prompts()? {
                    out.push_prompt(prompt);
                }
            } else {
                let text = format!(
                    "Choose pass or fail for the Mission!\n   Team: {}\n   Fails Required: {fails}\n   [command: 'mission pass' or 'mission fail']",
                    self.team_list()
                );
                for name in &self.on_mission {
                    out.push_message(self.players.get(name)?.message(format!("{name}: {text}")));
                }
                self.push_board(out)?;
                out.push_text(self.help_message()?);
            }
            return Ok(());
        }

        out.push_text("MISSION REJECTED");
        if self.board_ref()?.vote_track >= HAMMER_VOTE {
            return self.end_game("5 Teams got voted down in a row! Team Evil Wins!", out);
        }

        self.board_mut()?.advance_vote_track();
        self.on_mission.clear();
        for player in self.players.iter_mut() {
            player.fields.public[1] = BLANK.to_owned();
        }
        self.seat_mut(&leader)?.public[0] = BLANK.to_owned();
        let next = self.pass_leadership()?;
        let leader_symbol = self.symbol(Symbol::Leader);
        let hammer_symbol = self.symbol(Symbol::Hammer);
        let seat = self.seat_mut(&next)?;
        seat.public[0] = if seat.public[0] == hammer_symbol {
            format!("{leader_symbol} | {hammer_symbol}")
        } else {
            leader_symbol.to_owned()
        };

        self.phase = AvalonPhase::TeamSelect;
        self.push_board(out)?;
        out.push_text(self.players_info());
        self.announce_leader(&next, out)
    }

    /// Move `leader` to the next seat. Returns the new leader.
    fn pass_leadership(&mut self) -> Result<String> {
        let current = self.leader()?;
        let idx = self
            .order
            .iter()
            .position(|n| *n == current)
            .ok_or_else(|| Error::game(format!("{current} is not in the turn order")))?;
        let next = self.order[(idx + 1) % self.order.len()].clone();
        self.players.get_mut(&current)?.remove_role(LEADER);
        self.players.get_mut(&next)?.give_role(LEADER);
        Ok(next)
    }

    /// Manual `mission pass|fail`.
    pub fn play_card(&mut self, name: &str, choice: &str, out: &mut AvalonOutcome) -> Result<()> {
        if self.lock_voting {
            return Err(Error::illegal(
                "Cannot Choose a Mission Card using the 'mission' Command while prompts are active!",
            ));
        }
        if !self.on_mission.iter().any(|n| n == name) {
            return Err(Error::illegal(format!("{name}, you are not on the Mission!")));
        }
        let card = match choice.to_ascii_lowercase().as_str() {
            "pass" => MissionCard::Pass,
            "fail" => MissionCard::Fail,
            other => {
                return Err(Error::illegal(format!(
                    "'{other}' is not a valid option. Select 'pass' or 'fail'"
                )))
            }
        };
        let player = self.players.get_mut(name)?;
        if let Some(played) = player.fields.mission_card {
            return Err(Error::illegal(format!(
                "You've already selected: {}",
                AvalonChoice::Card(played)
            )));
        }
        if card == MissionCard::Fail && !player.has_role(TEAM_EVIL) {
            return Err(Error::illegal(format!(
                "Cannot vote 'fail' as {name}! Only members of Team Evil can vote 'fail'."
            )));
        }
        player.fields.mission_card = Some(card);
        out.push_message(player.message(format!("You chose '{}' as {name}", AvalonChoice::Card(card))));

        let all_in = self
            .on_mission
            .iter()
            .all(|n| self.seat(n).is_ok_and(|s| s.mission_card.is_some()));
        if all_in && self.options.is_enabled(AUTO_NEXT) && !self.buttons() {
            return self.go_on_mission(out);
        }
        Ok(())
    }

    /// Reveal the mission cards and score the mission.
    pub fn go_on_mission(&mut self, out: &mut AvalonOutcome) -> Result<()> {
        let mut passes = 0;
        let mut fails = 0;
        let mut missing = Vec::new();
        for name in &self.on_mission {
            match self.seat(name)?.mission_card {
                Some(MissionCard::Pass) => passes += 1,
                Some(MissionCard::Fail) => fails += 1,
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(Error::illegal(format!(
                "The following players haven't played yet: {}",
                missing.join(", ")
            )));
        }

        let leader = self.leader()?;
        let board = self.board_ref()?;
        let mission = board.current_mission;
        let failed = fails >= board.fails_required(mission);
        let log = format!(
            "{LOG_RULE}\nMISSION {}\nTeam Leader: {leader}\nTeam: {}\n\nThere were:\nPasses: {passes}\nFails: {fails}",
            mission + 1,
            self.team_list()
        );
        let board = self.board_mut()?;
        board.mission_log.push(log.clone());
        board.record_mission(failed);
        let (failed_count, passed_count) = (board.failed, board.passed);
        out.push_text(log);
        out.push_text(if failed { "MISSION FAILED!" } else { "MISSION PASSED!" });
        info!(mission = mission + 1, passes, fails, failed, "mission resolved");

        for player in self.players.iter_mut() {
            player.fields.mission_card = None;
            player.remove_role(TEAM);
        }
        self.on_mission.clear();

        if failed_count >= MISSIONS_TO_WIN {
            return self.end_game("Three Missions Have Failed! Team Evil Wins!", out);
        }
        if passed_count >= MISSIONS_TO_WIN {
            if !self.specials.contains(Character::Merlin) {
                return self.end_game("Three Missions Have Passed! Team Good Wins!", out);
            }
            for player in self.players.iter_mut() {
                player.fields.public = [BLANK.to_owned(), BLANK.to_owned()];
            }
            for player in self.players.with_role(ASSASSIN) {
                out.push_message(player.message(format!(
                    "{}: Consult with the rest of Team Evil and attempt to stab Merlin! [command: 'stab <player_name>']",
                    player.name()
                )));
            }
            self.phase = AvalonPhase::Stab;
            self.push_board(out)?;
            out.push_text(self.players_info());
            out.push_text(self.help_message()?);
            if self.buttons() {
                out.push_prompt(self.stab_prompt()?);
            }
            return Ok(());
        }

        self.board_mut()?.next_mission();
        for player in self.players.iter_mut() {
            player.fields.public = [BLANK.to_owned(), BLANK.to_owned()];
        }
        let next = self.pass_leadership()?;
        let leader_symbol = self.symbol(Symbol::Leader).to_owned();
        let hammer_symbol = self.symbol(Symbol::Hammer).to_owned();
        self.seat_mut(&next)?.public[0] = leader_symbol;
        let idx = self.order.iter().position(|n| *n == next).unwrap_or_default();
        let hammer = self.order[(idx + 4) % self.order.len()].clone();
        self.seat_mut(&hammer)?.public[0] = hammer_symbol;

        self.phase = AvalonPhase::TeamSelect;
        self.push_board(out)?;
        out.push_text(self.players_info());
        self.announce_leader(&next, out)
    }

    /// The assassin's guess at Merlin ends the game.
    pub fn process_stab(&mut self, assassin: &str, guess: &str, out: &mut AvalonOutcome) -> Result<()> {
        let guess = guess.to_ascii_lowercase();
        if !self.players.contains(&guess) {
            return Err(Error::illegal(format!(
                "{guess} is not a recognized player in the game! Choose again"
            )));
        }
        let merlins: Vec<String> = self
            .players
            .iter()
            .filter(|p| p.fields.character == Some(Character::Merlin))
            .map(|p| p.name().to_owned())
            .collect();
        let merlin = match merlins.as_slice() {
            [m] => m.clone(),
            [] => return Err(Error::game("Somehow there's no Merlin")),
            _ => return Err(Error::game("Somehow there's more than one Merlin")),
        };

        out.push_text(format!("{assassin} stabbed {guess}"));
        if guess == merlin {
            out.push_text(format!("{guess} was Merlin!"));
            self.end_game("Merlin was stabbed! Team Evil wins!", out)
        } else {
            out.push_text(format!("{guess} was NOT Merlin! {merlin} was!"));
            self.end_game("Merlin was NOT Stabbed! Team Good wins!", out)
        }
    }

    fn end_game(&mut self, winner: &str, out: &mut AvalonOutcome) -> Result<()> {
        self.winner = Some(winner.to_owned());
        let symbols: Vec<_> = self
            .players
            .iter()
            .map(|p| p.fields.character.map(|c| (self.symbol(Symbol::Team(c.team())), c)))
            .collect();
        for (player, revealed) in self.players.iter_mut().zip(symbols) {
            if let Some((symbol, character)) = revealed {
                player.fields.public = [symbol.to_owned(), character.name().to_owned()];
            }
        }
        self.on_mission.clear();
        self.phase = AvalonPhase::GameEnd;
        info!(winner, "avalon finished");
        self.push_board(out)?;
        out.push_text(self.players_info());
        out.push_text(self.help_message()?);
        Ok(())
    }
}

impl Game for Avalon {
    type Phase = AvalonPhase;
    type Choice = AvalonChoice;
    type Step = AvalonStep;
    type Fields = AvalonSeat;

    fn phase(&self) -> AvalonPhase {
        self.phase
    }

    fn settings(&self) -> &GameSettings {
        &self.settings
    }

    fn registry(&self) -> &PlayerRegistry<AvalonSeat> {
        &self.players
    }

    fn command_table() -> Result<CommandTable<Self>> {
        commands::table()
    }

    fn continuation_table() -> Result<ContinuationTable<Self>> {
        prompts::continuations()
    }

    fn kill(&mut self) {
        self.reset_game();
        self.players.clear();
        self.lobby.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [&str; 5] = ["ann", "ben", "cat", "dan", "eve"];

    fn lobby(names: &[&str]) -> Avalon {
        let mut game = Avalon::new(GameSettings::default().with_seed(3));
        game.options.set(BUTTON_PROMPTS, "disable").unwrap();
        for name in names {
            game.join(&Identity::new(*name), name).unwrap();
        }
        game
    }

    fn started() -> Avalon {
        let mut game = lobby(&NAMES);
        game.next(&mut AvalonOutcome::new()).unwrap();
        game
    }

    fn propose(game: &mut Avalon) {
        let size = game.board().unwrap().current_size();
        for name in game.order().to_vec().iter().take(size) {
            game.choose(name).unwrap();
        }
        game.next(&mut AvalonOutcome::new()).unwrap();
    }

    fn vote_all(game: &mut Avalon, approvals: usize) {
        for (i, name) in game.order().to_vec().iter().enumerate() {
            let choice = if i < approvals { "approve" } else { "reject" };
            game.cast_vote(name, choice, &mut AvalonOutcome::new()).unwrap();
        }
        game.next(&mut AvalonOutcome::new()).unwrap();
    }

    #[test]
    fn test_setup_deals_teams() {
        let game = started();
        assert_eq!(game.phase(), AvalonPhase::TeamSelect);
        let evil = game.players.with_role(TEAM_EVIL).count();
        let good = game.players.with_role(TEAM_GOOD).count();
        assert_eq!((evil, good), (2, 3));
        assert_eq!(game.leader().unwrap(), game.order()[0]);
        assert!(game.seat(&game.order()[0]).unwrap().public[0].starts_with("Team Leader"));
        assert_eq!(game.seat(&game.order()[4]).unwrap().public[0], ":hammer:");
    }

    #[test]
    fn test_setup_rejects_small_tables() {
        let mut game = lobby(&NAMES[..4]);
        let err = game.next(&mut AvalonOutcome::new()).unwrap_err();
        assert_eq!(err.message(), "Cannot Start Game with '4' players");
        assert_eq!(game.phase(), AvalonPhase::NewGame);
    }

    #[test]
    fn test_merlin_sees_evil() {
        let mut game = lobby(&NAMES);
        game.change_rule("Merlin", "add").unwrap();
        game.next(&mut AvalonOutcome::new()).unwrap();
        let merlin = game
            .order()
            .iter()
            .find(|n| game.seat(n).unwrap().character == Some(Character::Merlin))
            .unwrap()
            .clone();
        let info = game.my_info(&merlin).unwrap();
        let text = info.text.unwrap();
        for name in game.players.with_role(TEAM_EVIL).map(|p| p.name()) {
            assert!(text.contains(name));
        }
        assert!(game.players.with_role(ASSASSIN).count() == 1);
    }

    #[test]
    fn test_team_size_enforced() {
        let mut game = started();
        let first = game.order()[0].clone();
        game.choose(&first).unwrap();
        assert!(game.choose(&first).is_err());
        let err = game.next(&mut AvalonOutcome::new()).unwrap_err();
        assert_eq!(err.message(), "Not enough players on the mission! Need 2");
        game.remove_from_team(&first).unwrap();
        assert!(game.on_mission().is_empty());
    }

    #[test]
    fn test_votes_must_all_be_in() {
        let mut game = started();
        propose(&mut game);
        let first = game.order()[0].clone();
        game.cast_vote(&first, "approve", &mut AvalonOutcome::new()).unwrap();
        assert!(game.cast_vote(&first, "reject", &mut AvalonOutcome::new()).is_err());
        let err = game.next(&mut AvalonOutcome::new()).unwrap_err();
        assert!(err.message().starts_with("The following players still need to vote"));
    }

    #[test]
    fn test_approved_team_goes_on_mission() {
        let mut game = started();
        propose(&mut game);
        vote_all(&mut game, 3);
        assert_eq!(game.phase(), AvalonPhase::Mission);
        assert_eq!(game.players.with_role(TEAM).count(), 2);
        assert_eq!(game.board().unwrap().vote_track, 1);
    }

    #[test]
    fn test_rejection_rotates_leader() {
        let mut game = started();
        let second = game.order()[1].clone();
        propose(&mut game);
        vote_all(&mut game, 2);
        assert_eq!(game.phase(), AvalonPhase::TeamSelect);
        assert_eq!(game.leader().unwrap(), second);
        assert_eq!(game.board().unwrap().vote_track, 2);
        assert!(game.on_mission().is_empty());
    }

    #[test]
    fn test_only_evil_may_fail() {
        let mut game = started();
        propose(&mut game);
        vote_all(&mut game, 5);
        let team = game.on_mission().to_vec();
        for name in &team {
            let evil = game.players.get(name).unwrap().has_role(TEAM_EVIL);
            let res = game.play_card(name, "fail", &mut AvalonOutcome::new());
            assert_eq!(res.is_ok(), evil);
        }
    }

    #[test]
    fn test_mission_clears_team_role() {
        let mut game = started();
        propose(&mut game);
        vote_all(&mut game, 5);
        for name in game.on_mission().to_vec() {
            game.play_card(&name, "pass", &mut AvalonOutcome::new()).unwrap();
        }
        game.next(&mut AvalonOutcome::new()).unwrap();
        assert_eq!(game.board().unwrap().passed, 1);
        assert_eq!(game.players.with_role(TEAM).count(), 0);
        assert_eq!(game.phase(), AvalonPhase::TeamSelect);
        assert_eq!(game.leader().unwrap(), game.order()[1]);
    }

    #[test]
    fn test_auto_next_resolves_vote() {
        let mut game = started();
        game.options.set(AUTO_NEXT, "enable").unwrap();
        propose(&mut game);
        for name in game.order().to_vec() {
            game.cast_vote(&name, "approve", &mut AvalonOutcome::new()).unwrap();
        }
        assert_eq!(game.phase(), AvalonPhase::Mission);
    }

    #[test]
    fn test_stab() {
        let mut game = lobby(&NAMES);
        game.change_rule("merlin", "add").unwrap();
        game.next(&mut AvalonOutcome::new()).unwrap();
        let merlin = game
            .players
            .iter()
            .find(|p| p.fields.character == Some(Character::Merlin))
            .unwrap()
            .name()
            .to_owned();
        let assassin = game.players.sole_with_role(ASSASSIN).unwrap().name().to_owned();
        game.process_stab(&assassin, &merlin, &mut AvalonOutcome::new()).unwrap();
        assert_eq!(game.phase(), AvalonPhase::GameEnd);
        assert_eq!(game.winner(), Some("Merlin was stabbed! Team Evil wins!"));
    }

    #[test]
    fn test_stab_misses_merlin() {
        let mut game = lobby(&NAMES);
        game.change_rule("merlin", "add").unwrap();
        game.next(&mut AvalonOutcome::new()).unwrap();
        let assassin = game.players.sole_with_role(ASSASSIN).unwrap().name().to_owned();
        let bystander = game
            .players
            .iter()
            .find(|p| p.fields.character == Some(Character::VanillaGood))
            .unwrap()
            .name()
            .to_owned();

        let err = game
            .process_stab(&assassin, "nobody", &mut AvalonOutcome::new())
            .unwrap_err();
        assert_eq!(err.message(), "nobody is not a recognized player in the game! Choose again");

        let mut out = AvalonOutcome::new();
        game.process_stab(&assassin, &bystander, &mut out).unwrap();
        assert_eq!(game.winner(), Some("Merlin was NOT Stabbed! Team Good wins!"));
    }

    #[test]
    fn test_too_many_specials() {
        let mut game = lobby(&NAMES);
        game.change_rule("morgana", "add").unwrap();
        game.change_rule("mordred", "add").unwrap();
        let err = game.next(&mut AvalonOutcome::new()).unwrap_err();
        assert_eq!(err.message(), "Too many evil special characters for current player count");
        assert!(!game.is_voting_locked());
    }
}
