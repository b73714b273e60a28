use crate::commands::{Call, CommandDescriptor, CommandTable};
use crate::core::error::Result;
use crate::core::player::{PLAYER, USER};
use crate::games::rps::{RockPaperScissors, RpsOutcome, RpsPhase, RpsSeat};
use crate::rules::Game;

type RpsCall<'a> = Call<'a, RockPaperScissors>;

pub fn table() -> Result<CommandTable<RockPaperScissors>> {
    CommandTable::builder()
        .command(
            CommandDescriptor::new("reset")
                .help("reset the game (go back to 'player_select')")
                .allow_always(PLAYER)
                .requires_lock(),
            reset,
        )
        .command(
            CommandDescriptor::new("play")
                .help("start the game! add 'manual' to throw with commands")
                .allow(PLAYER, &[RpsPhase::PlayerSelect])
                .requires_lock(),
            play,
        )
        .command(
            CommandDescriptor::new("throw")
                .help("Throw either 'Rock', 'Paper', or 'Scissors'!")
                .allow(PLAYER, &[RpsPhase::Throw])
                .requires_lock(),
            throw,
        )
        .command(
            CommandDescriptor::new("info")
                .help("Get the current game info")
                .allow_always(USER),
            info,
        )
        .command(
            CommandDescriptor::new("record")
                .help("check the record of who beat who in this game session")
                .allow_always(USER),
            record,
        )
        .command(
            CommandDescriptor::new("control")
                .help("take control of a player")
                .allow_always(PLAYER)
                .debug_only(),
            control,
        )
        .command(
            CommandDescriptor::new("check_control")
                .help("see who's controlling which player")
                .allow_always(USER)
                .debug_only(),
            check_control,
        )
        .command(
            CommandDescriptor::new("join")
                .help("join <name>: join the game")
                .allow(USER, &[RpsPhase::PlayerSelect]),
            join,
        )
        .command(
            CommandDescriptor::new("kick")
                .help("kick <name>: remove a player from the game")
                .allow(PLAYER, &[RpsPhase::PlayerSelect]),
            kick,
        )
        .build()
}

fn reset(game: &mut RockPaperScissors, _call: &RpsCall<'_>) -> Result<RpsOutcome> {
    game.reset_game();
    Ok("Restarting Game! Choose Players!".into())
}

fn play(game: &mut RockPaperScissors, call: &RpsCall<'_>) -> Result<RpsOutcome> {
    let manual = call.arg(0).is_some_and(|mode| mode.eq_ignore_ascii_case("manual"));
    game.play(manual)
}

fn throw(game: &mut RockPaperScissors, call: &RpsCall<'_>) -> Result<RpsOutcome> {
    let name = game.lobby.controlled(&game.players, call.identity)?;
    let option = call.required(0, "rock|paper|scissors")?;
    game.throw(&name, option)
}

fn info(game: &mut RockPaperScissors, _call: &RpsCall<'_>) -> Result<RpsOutcome> {
    Ok(game.info().into())
}

fn record(game: &mut RockPaperScissors, _call: &RpsCall<'_>) -> Result<RpsOutcome> {
    let mut out = RpsOutcome::new();
    if game.records().is_empty() {
        out.push_text("No games have been played yet");
    }
    for record in game.records() {
        out.push_text(record.clone());
    }
    Ok(out)
}

fn control(game: &mut RockPaperScissors, call: &RpsCall<'_>) -> Result<RpsOutcome> {
    let name = call.required(0, "player name")?;
    Ok(game.lobby.control(&game.players, call.identity, name)?.into())
}

fn check_control(game: &mut RockPaperScissors, call: &RpsCall<'_>) -> Result<RpsOutcome> {
    Ok(game.lobby.check_control(call.identity).into())
}

fn join(game: &mut RockPaperScissors, call: &RpsCall<'_>) -> Result<RpsOutcome> {
    let name = call.required(0, "player name")?;
    let debug = game.debug();
    let joined = game
        .lobby
        .join(&mut game.players, call.identity, name, RpsSeat::default(), debug)?;
    Ok(joined.into())
}

fn kick(game: &mut RockPaperScissors, call: &RpsCall<'_>) -> Result<RpsOutcome> {
    let name = call.required(0, "player name")?.to_ascii_lowercase();
    game.lobby.kick(&mut game.players, &name)?;
    Ok(format!("{name} has been kicked").into())
}
