//! Avalon command table.

use crate::commands::{Call, CommandDescriptor, CommandTable};
use crate::core::error::{Error, Result};
use crate::core::player::{PLAYER, USER};
use crate::games::avalon::{
    Avalon, AvalonOutcome, ASSASSIN, LEADER, MISSION_LOG, TEAM, VOTE_LOG,
};
use crate::rules::Game;

use crate::games::avalon::AvalonPhase::*;

/// Build the Avalon command table.
pub fn table() -> Result<CommandTable<Avalon>> {
    CommandTable::builder()
        .command(
            CommandDescriptor::new("restart")
                .help("Start over with the same players and rules")
                .allow_always(PLAYER)
                .requires_lock(),
            restart,
        )
        .command(
            CommandDescriptor::new("next")
                .help("Move the game to its next step")
                .allow_always(PLAYER)
                .requires_lock(),
            next,
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
            CommandDescriptor::new("check")
                .help("check board|players|rules|my_info|help|mission_log|vote_log")
                .allow_always(PLAYER),
            check,
        )
        .command(
            CommandDescriptor::new("commands")
                .help("List the commands available right now")
                .allow_always(PLAYER),
            commands,
        )
        .command(
            CommandDescriptor::new("rule_options")
                .help("List every rule that can be changed")
                .allow(USER, &[NewGame]),
            rule_options,
        )
        .command(
            CommandDescriptor::new("change_rule")
                .help("change_rule <rule> add|remove|enable|disable")
                .allow(PLAYER, &[NewGame]),
            change_rule,
        )
        .command(
            CommandDescriptor::new("choose")
                .help("choose <player>: add a player to the mission")
                .allow(LEADER, &[TeamSelect])
                .requires_lock(),
            choose,
        )
        .command(
            CommandDescriptor::new("remove")
                .help("remove <player>: take a player off the mission")
                .allow(LEADER, &[TeamSelect])
                .requires_lock(),
            remove,
        )
        .command(
            CommandDescriptor::new("vote")
                .help("vote approve|reject")
                .allow(PLAYER, &[Voting]),
            vote,
        )
        .command(
            CommandDescriptor::new("mission")
                .help("mission pass|fail")
                .allow(TEAM, &[Mission]),
            mission,
        )
        .command(
            CommandDescriptor::new("stab")
                .help("stab <player>: guess who Merlin is")
                .allow(ASSASSIN, &[Stab])
                .requires_lock(),
            stab,
        )
        .build()
}

fn restart(game: &mut Avalon, _call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    game.reset_game();
    let mut out = AvalonOutcome::text("Restarting Game!");
    out.push_text(game.players_info());
    out.push_text(game.help_message()?);
    Ok(out)
}

fn next(game: &mut Avalon, _call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let mut out = AvalonOutcome::new();
    game.next(&mut out)?;
    Ok(out)
}

fn control(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let name = call.required(0, "player name")?;
    Ok(game.lobby.control(&game.players, call.identity, name)?.into())
}

fn check_control(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    Ok(game.lobby.check_control(call.identity).into())
}

fn join(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let name = call.required(0, "player name")?;
    let mut out = AvalonOutcome::text(game.join(call.identity, name)?);
    out.push_text(game.players_info());
    Ok(out)
}

fn kick(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let name = call.required(0, "player name")?;
    Ok(game.kick(name)?.into())
}

fn check(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let what = call.required(0, "board|players|rules|my_info|help|mission_log|vote_log")?;
    match what {
        "board" => {
            let board = game.board_ref()?;
            let mut out = AvalonOutcome::text(board.mission_info());
            out.push_text(board.summary());
            Ok(out)
        }
        "players" => Ok(game.players_info().into()),
        "rules" => Ok(game.rules_summary().into()),
        "help" => Ok(game.help_message()?.into()),
        "my_info" => {
            let name = game.lobby.controlled(&game.players, call.identity)?;
            Ok(game.my_info(&name)?.into())
        }
        "mission_log" | "vote_log" => {
            let key = if what == "mission_log" { MISSION_LOG } else { VOTE_LOG };
            if !game.options().is_enabled(key) {
                return Err(Error::illegal(format!(
                    "Checking the {what} is disabled. Enable it with 'change_rule {key} enable'"
                )));
            }
            let board = game.board_ref()?;
            let log = if what == "mission_log" { &board.mission_log } else { &board.vote_log };
            Ok(log.join("\n").into())
        }
        other => Err(Error::illegal(format!(
            "'{other}' not recognized. Use board, players, rules, my_info, help, mission_log or vote_log"
        ))),
    }
}

fn commands(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    Ok(call.commands.describe_current(game.phase(), game.debug()).into())
}

fn rule_options(game: &mut Avalon, _call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    Ok(game.rule_options().into())
}

fn change_rule(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let rule = call.required(0, "rule")?;
    let value = call.required(1, "add|remove|enable|disable")?;
    Ok(game.change_rule(rule, value)?.join("\n").into())
}

fn choose(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let name = call.required(0, "player name")?;
    let mut out = AvalonOutcome::text(game.choose(name)?);
    out.push_text(game.players_info());
    Ok(out)
}

fn remove(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let name = call.required(0, "player name")?;
    let mut out = AvalonOutcome::text(game.remove_from_team(name)?);
    out.push_text(game.players_info());
    Ok(out)
}

fn vote(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let name = game.lobby.controlled(&game.players, call.identity)?;
    let choice = call.required(0, "approve|reject")?;
    let mut out = AvalonOutcome::new();
    game.cast_vote(&name, choice, &mut out)?;
    Ok(out)
}

fn mission(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let name = game.lobby.controlled(&game.players, call.identity)?;
    let choice = call.required(0, "pass|fail")?;
    let mut out = AvalonOutcome::new();
    game.play_card(&name, choice, &mut out)?;
    Ok(out)
}

fn stab(game: &mut Avalon, call: &Call<'_, Avalon>) -> Result<AvalonOutcome> {
    let assassin = game.lobby.controlled(&game.players, call.identity)?;
    if !game.players.get(&assassin)?.has_role(ASSASSIN) {
        return Err(Error::illegal(format!("{assassin} is not the Assassin")));
    }
    let target = call.required(0, "player name")?;
    let mut out = AvalonOutcome::new();
    game.process_stab(&assassin, target, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameSettings;
    use crate::core::identity::Identity;
    use crate::games::avalon::AvalonPhase;

    #[test]
    fn test_table_builds() {
        let table = table().unwrap();
        assert_eq!(table.len(), 15);
        assert!(table.lookup("control", false).is_err());
        assert!(table.lookup("control", true).is_ok());
    }

    #[test]
    fn test_lobby_commands() {
        let table = table().unwrap();
        let mut game = Avalon::new(GameSettings::default());
        let stranger = Identity::new("stranger");
        assert!(table.authorize(&game, &stranger, "join").is_ok());
        assert!(table.authorize(&game, &stranger, "next").is_err());
        game.join(&stranger, "sam").unwrap();
        assert!(table.authorize(&game, &stranger, "next").is_ok());
        assert!(table.authorize(&game, &stranger, "choose").is_err());
    }

    #[test]
    fn test_listing_for_team_select() {
        let table = table().unwrap();
        let listing = table.describe_current(AvalonPhase::TeamSelect, false);
        assert!(listing.contains("choose | choose <player>: add a player to the mission | leader"));
        assert!(!listing.contains("join"));
    }
}
