//! Coup command table.

use crate::commands::{Call, CommandDescriptor, CommandTable};
use crate::core::error::{Error, Result};
use crate::core::player::{Role, PLAYER, USER};
use crate::games::coup::cards::rules_sheet;
use crate::games::coup::{
    Card, Coup, CoupAction, CoupHand, CoupOutcome, ACTIVE_PLAYER, CURRENT_PLAYER,
};
use crate::rules::Game;

use crate::games::coup::CoupPhase::*;

/// Build the Coup command table.
pub fn table() -> Result<CommandTable<Coup>> {
    CommandTable::builder()
        .command(
            CommandDescriptor::new("restart")
                .help("Return everyone to the lobby")
                .allow_always(PLAYER)
                .requires_lock(),
            restart,
        )
        .command(
            CommandDescriptor::new("control")
                .help("Act as another player you own")
                .allow_always(PLAYER)
                .debug_only(),
            control,
        )
        .command(
            CommandDescriptor::new("check_control")
                .help("Show which player you act as")
                .allow_always(USER)
                .debug_only(),
            check_control,
        )
        .command(
            CommandDescriptor::new("join")
                .help("join <name>: take a seat")
                .allow(USER, &[NewGame]),
            join,
        )
        .command(
            CommandDescriptor::new("kick")
                .help("kick <name>: remove a player")
                .allow(PLAYER, &[NewGame]),
            kick,
        )
        .command(
            CommandDescriptor::new("commands")
                .help("List the commands available right now")
                .allow_always(PLAYER),
            commands,
        )
        .command(
            CommandDescriptor::new("start")
                .help("Deal the cards and begin")
                .allow(PLAYER, &[NewGame])
                .requires_lock(),
            start,
        )
        .command(
            CommandDescriptor::new("action")
                .help("action <action> [target]: take your turn")
                .allow(CURRENT_PLAYER, &[Action])
                .requires_lock(),
            action,
        )
        .command(
            CommandDescriptor::new("challenge")
                .help("Call out the current claim")
                .allow(PLAYER, &[Challenge, ReactionChallenge])
                .requires_lock(),
            challenge,
        )
        .command(
            CommandDescriptor::new("reaction")
                .help("reaction <card>: block the action")
                .allow(PLAYER, &[Reaction])
                .requires_lock(),
            reaction,
        )
        .command(
            CommandDescriptor::new("next")
                .help("Let the claim or action stand")
                .allow(PLAYER, &[Challenge, Reaction, ReactionChallenge])
                .requires_lock(),
            next,
        )
        .command(
            CommandDescriptor::new("reveal")
                .help("reveal <card>: show or give up a card")
                .allow(ACTIVE_PLAYER, &[LoseInfluence, Reveal])
                .requires_lock(),
            reveal,
        )
        .command(
            CommandDescriptor::new("exchange")
                .help("exchange <card> <card>: return two cards to the deck")
                .allow(CURRENT_PLAYER, &[Exchange])
                .requires_lock(),
            exchange,
        )
        .command(
            CommandDescriptor::new("check")
                .help("check board|rules|options|my_info")
                .allow_always(PLAYER),
            check,
        )
        .command(
            CommandDescriptor::new("all_options")
                .help("List the game options")
                .allow(USER, &[NewGame]),
            all_options,
        )
        .command(
            CommandDescriptor::new("change_option")
                .help("change_option <option> enable|disable")
                .allow(PLAYER, &[NewGame]),
            change_option,
        )
        .command(
            CommandDescriptor::new("cheat")
                .help("Show every hand and the deck")
                .allow_always(PLAYER)
                .debug_only(),
            cheat,
        )
        .build()
}

/// The player the caller acts as, who must hold `role`.
fn acting_as(game: &Coup, call: &Call<'_, Coup>, role: Role) -> Result<String> {
    let name = game.lobby.controlled(&game.players, call.identity)?;
    if !game.players.get(&name)?.has_role(role) {
        return Err(Error::illegal(format!("{name} does not have the role: {role}")));
    }
    Ok(name)
}

fn restart(game: &mut Coup, _call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    game.restart();
    Ok("Restarting game. Use 'start' to play again".into())
}

fn control(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    let name = call.required(0, "player name")?;
    Ok(game.lobby.control(&game.players, call.identity, name)?.into())
}

fn check_control(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    Ok(game.lobby.check_control(call.identity).into())
}

fn join(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    let name = call.required(0, "player name")?;
    let debug = game.debug();
    let joined = game
        .lobby
        .join(&mut game.players, call.identity, name, CoupHand::default(), debug)?;
    Ok(joined.into())
}

fn kick(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    let name = call.required(0, "player name")?.to_ascii_lowercase();
    game.lobby.kick(&mut game.players, &name)?;
    game.order.retain(|n| *n != name);
    Ok(format!("{name} has been kicked").into())
}

fn commands(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    Ok(call.commands.describe_current(game.phase(), game.debug()).into())
}

fn start(game: &mut Coup, _call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    let mut out = CoupOutcome::new();
    game.start_game(&mut out)?;
    Ok(out)
}

fn action(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    acting_as(game, call, CURRENT_PLAYER)?;
    let action = CoupAction::parse(call.required(0, "action")?)?;
    let mut out = CoupOutcome::new();
    game.process_action(action, call.arg(1), &mut out)?;
    Ok(out)
}

fn challenge(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    let name = acting_as(game, call, PLAYER)?;
    let mut out = CoupOutcome::new();
    game.process_challenge(Some(&name), &mut out)?;
    Ok(out)
}

fn reaction(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    let name = acting_as(game, call, PLAYER)?;
    let card = Card::parse(call.required(0, "card")?)?;
    let mut out = CoupOutcome::new();
    game.process_reaction(Some((&name, card)), &mut out)?;
    Ok(out)
}

fn next(game: &mut Coup, _call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    let mut out = CoupOutcome::new();
    match game.state() {
        Reaction => game.process_reaction(None, &mut out)?,
        _ => game.process_challenge(None, &mut out)?,
    }
    Ok(out)
}

fn reveal(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    let name = acting_as(game, call, ACTIVE_PLAYER)?;
    let card = Card::parse(call.required(0, "card")?)?;
    let mut out = CoupOutcome::new();
    match game.state() {
        Reveal => game.process_reveal(&name, card, &mut out)?,
        _ => game.process_lost_influence(&name, card, &mut out)?,
    }
    Ok(out)
}

fn exchange(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    let name = acting_as(game, call, CURRENT_PLAYER)?;
    let first = Card::parse(call.required(0, "first card")?)?;
    let second = Card::parse(call.required(1, "second card")?)?;
    let mut out = CoupOutcome::new();
    game.process_exchange(&name, first, second, &mut out)?;
    Ok(out)
}

fn check(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    match call.required(0, "board|rules|options|my_info")? {
        "board" => Ok(game.board().into()),
        "rules" => Ok(rules_sheet().into()),
        "options" => Ok(game.options().describe().into()),
        "my_info" => {
            let name = game.lobby.controlled(&game.players, call.identity)?;
            let info = game.my_info(&name)?;
            Ok(game.players.get(&name)?.message(info).into())
        }
        other => Err(Error::illegal(format!(
            "'{other}' not recognized. Use board, rules, options or my_info"
        ))),
    }
}

fn all_options(game: &mut Coup, _call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    Ok(game.options().describe().into())
}

fn change_option(game: &mut Coup, call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    let key = call.required(0, "option")?;
    let value = call.required(1, "enable|disable")?;
    Ok(game.options_mut().set(key, value)?.into())
}

fn cheat(game: &mut Coup, _call: &Call<'_, Coup>) -> Result<CoupOutcome> {
    Ok(game.cheat_sheet().into())
}
