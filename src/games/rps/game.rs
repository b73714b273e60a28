use tracing::info;

use crate::commands::CommandTable;
use crate::core::config::GameSettings;
use crate::core::error::{Error, Result};
use crate::core::player::PlayerRegistry;
use crate::games::lobby::Lobby;
use crate::games::rps::{commands, RpsOutcome, RpsPhase, RpsStep, Throw, THROW_TIMEOUT};
use crate::protocol::{Prompt, PromptResults};
use crate::rules::{ContinuationTable, Game};

const RULE: &str = "===========================================";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RpsSeat {
    pub throw: Option<Throw>,
}

pub struct RockPaperScissors {
    settings: GameSettings,
    pub(crate) players: PlayerRegistry<RpsSeat>,
    pub(crate) lobby: Lobby,
    phase: RpsPhase,
    records: Vec<String>,
    result: Option<String>,
}

impl RockPaperScissors {
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        Self {
            settings,
            players: PlayerRegistry::new(),
            lobby: Lobby::new(),
            phase: RpsPhase::PlayerSelect,
            records: Vec::new(),
            result: None,
        }
    }

    /// Every result this session, oldest first.
    #[must_use]
    pub fn records(&self) -> &[String] {
        &self.records
    }

    pub fn reset_game(&mut self) {
        for player in self.players.iter_mut() {
            player.fields = RpsSeat::default();
        }
        self.result = None;
        self.phase = RpsPhase::PlayerSelect;
    }

    /// Start a game. `manual` asks for `throw` commands instead of prompts.
    pub fn play(&mut self, manual: bool) -> Result<RpsOutcome> {
        match self.players.len() {
            0 | 1 => return Err(Error::illegal("Too Few Players! Need 2 to play")),
            2 => {}
            _ => return Err(Error::illegal("Too Many Players! Need 2 to play")),
        }
        self.phase = RpsPhase::Throw;

        let mut out = RpsOutcome::new();
        if manual {
            for player in self.players.iter() {
                out.push_message(player.message(format!(
                    "{}: Throw 'Rock', 'Paper', or 'Scissors'! ['throw <selection>']",
                    player.name()
                )));
            }
            out.push_text("Both Players: Throw 'Rock', 'Paper', or 'Scissors'! ['throw <selection>']");
            return Ok(out);
        }

        out.push_text("Both Players: Throw 'Rock', 'Paper', or 'Scissors'!");
        let timeout = self.settings.prompt_timeout_or(THROW_TIMEOUT);
        for player in self.players.iter() {
            let prompt = Prompt::new(player, Throw::ALL.to_vec(), 1, timeout, RpsStep::ThrowsMade)?
                .titled("Choose Rock, Paper, or Scissors!")
                .direct(true)
                .result_message("You threw: ");
            out.push_prompt(prompt);
        }
        Ok(out)
    }

    /// Manual throw. Resolves the game once both players have thrown.
    pub fn throw(&mut self, name: &str, option: &str) -> Result<RpsOutcome> {
        let throw = Throw::parse(option)?;
        let player = self.players.get_mut(name)?;
        if let Some(thrown) = player.fields.throw {
            return Err(Error::illegal(format!("{name} already threw {thrown}")));
        }
        player.fields.throw = Some(throw);

        let mut out = RpsOutcome::new();
        out.push_message(player.message(format!("You threw {throw}!")));
        out.push_text(format!("\n{name} has made their choice!"));
        if self.players.iter().all(|p| p.fields.throw.is_some()) {
            self.process_result(&mut out)?;
        }
        Ok(out)
    }

    fn process_result(&mut self, out: &mut RpsOutcome) -> Result<()> {
        let mut thrown = self.players.iter().map(|p| (p.name().to_owned(), p.fields.throw));
        let (Some((first, Some(a))), Some((second, Some(b)))) = (thrown.next(), thrown.next()) else {
            return Err(Error::game("Both players must throw before the result"));
        };

        let verdict = if a == b {
            "It's a Tie!".to_owned()
        } else if a.beats(b) {
            format!("{first} wins!")
        } else {
            format!("{second} wins!")
        };
        let record = [
            RULE.to_owned(),
            format!("{first} vs. {second}"),
            format!("{first} chose {a}"),
            format!("{second} chose {b}"),
            verdict,
        ]
        .join("\n");
        info!(%first, %second, "rock paper scissors resolved");

        self.records.push(record.clone());
        out.push_text(record.clone());
        out.push_text("\nUse the Command 'reset' to go back to player select!");
        self.result = Some(record);
        self.phase = RpsPhase::Result;
        Ok(())
    }

    #[must_use]
    pub fn info(&self) -> String {
        match self.phase {
            RpsPhase::PlayerSelect => {
                let mut lines = vec!["The following players are in the game:".to_owned()];
                lines.extend(self.players.names());
                if self.players.len() == 2 {
                    lines.push("\nsend the command 'play' to begin!".to_owned());
                }
                lines.join("\n")
            }
            RpsPhase::Throw => {
                let mut lines = vec![format!(
                    "{} are playing a game of Rock, Paper, Scissors!",
                    self.players.names().join(" and ")
                )];
                for player in self.players.iter() {
                    lines.push(match player.fields.throw {
                        Some(_) => format!("{} has chosen!", player.name()),
                        None => format!("{} has not chosen yet!", player.name()),
                    });
                }
                lines.join("\n")
            }
            RpsPhase::Result => self.result.clone().unwrap_or_default(),
        }
    }
}

pub(crate) fn throws_made(
    game: &mut RockPaperScissors,
    results: PromptResults<Throw>,
) -> Result<RpsOutcome> {
    let mut throws = Vec::with_capacity(results.len());
    for (name, selection) in results {
        match selection.as_deref() {
            None | Some([]) => {
                return Err(Error::game(format!(
                    "{name} never made a choice and timed out! Please Reset Game."
                )))
            }
            Some([throw]) => throws.push((name, *throw)),
            Some(many) => {
                return Err(Error::game(format!(
                    "{name} managed to pick more than one choice: {many:?}"
                )))
            }
        }
    }
    for (name, throw) in throws {
        game.players.get_mut(&name)?.fields.throw = Some(throw);
    }
    let mut out = RpsOutcome::new();
    game.process_result(&mut out)?;
    Ok(out)
}

impl Game for RockPaperScissors {
    type Phase = RpsPhase;
    type Choice = Throw;
    type Step = RpsStep;
    type Fields = RpsSeat;

    fn phase(&self) -> RpsPhase {
        self.phase
    }

    fn settings(&self) -> &GameSettings {
        &self.settings
    }

    fn registry(&self) -> &PlayerRegistry<RpsSeat> {
        &self.players
    }

    fn command_table() -> Result<CommandTable<Self>> {
        commands::table()
    }

    fn continuation_table() -> Result<ContinuationTable<Self>> {
        ContinuationTable::builder()
            .on_prompts(RpsStep::ThrowsMade, throws_made)
            .build()
    }

    fn kill(&mut self) {
        self.reset_game();
        self.players.clear();
        self.lobby.clear();
    }
}
