//! The dispatch loop.
//!
//! A [`GameRunner`] owns one game instance and turns transport events into
//! game calls:
//!
//! 1. `dispatch` authorizes a command, takes the lock if needed, and runs it.
//! 2. If the result carries prompts or an interrupt, they are opened and the
//!    runner waits. `select` feeds player picks in; `tick` expires deadlines.
//! 3. Once every open request resolved, the continuation runs and its result
//!    is handled the same way, until only output remains.
//!
//! Whatever ends a chain (plain output, an error, or a panic) releases the
//! lock in one place.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, error, trace, warn};

use crate::commands::{Call, CatalogEntry, CommandDescriptor, CommandHandler, CommandTable};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::identity::{Destination, Identity};
use crate::core::player::Role;
use crate::dispatch::lock::CommandLock;
use crate::protocol::{
    Flow, InterruptCollector, InterruptRequest, Output, PromptCollector, PromptRequest,
    PromptResults, RequestId, RichMessage,
};
use crate::rules::{Continuation, ContinuationTable, Game, GameOutcome};

/// A command issued by an identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub identity: Identity,
    pub channel: Destination,
    pub command: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(identity: impl Into<Identity>, channel: Destination, command: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            channel,
            command: command.into(),
            args: Vec::new(),
        }
    }

    /// Split a command line on whitespace: the first word is the command.
    pub fn parse(identity: impl Into<Identity>, channel: Destination, line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = words.next()?;
        Some(Self::new(identity, channel, command).with_args(words))
    }

    #[must_use]
    pub fn with_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// A prompt or interrupt waiting on players.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiveRequest<O> {
    Prompt { id: RequestId, request: PromptRequest<O> },
    Interrupt { id: RequestId, request: InterruptRequest<O> },
}

impl<O> LiveRequest<O> {
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            Self::Prompt { id, .. } | Self::Interrupt { id, .. } => *id,
        }
    }
}

/// A request that resolved, with the text to show in its place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClosedRequest {
    pub id: RequestId,
    pub summary: String,
}

/// Everything the transport should do after one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response<O> {
    pub messages: Vec<RichMessage>,
    pub opened: Vec<LiveRequest<O>>,
    pub closed: Vec<ClosedRequest>,
    pub error: Option<Error>,
}

impl<O> Default for Response<O> {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            opened: Vec::new(),
            closed: Vec::new(),
            error: None,
        }
    }
}

impl<O> Response<O> {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Text of every message, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().filter_map(|m| m.text.as_deref())
    }

    /// Whether any message text contains `needle`.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

enum Pending<O, K> {
    Prompts {
        step: K,
        collectors: Vec<(RequestId, PromptCollector<O>)>,
    },
    Interrupt {
        step: K,
        id: RequestId,
        collector: InterruptCollector<O>,
    },
}

struct Chain<O, K> {
    pending: Pending<O, K>,
    holds_lock: bool,
}

impl<O: Clone + Eq + std::fmt::Display, K> Chain<O, K> {
    fn select(&mut self, id: RequestId, identity: &Identity, option: &O) -> bool {
        match &mut self.pending {
            Pending::Prompts { collectors, .. } => collectors
                .iter_mut()
                .find(|(cid, _)| *cid == id)
                .is_some_and(|(_, c)| c.select(identity, option)),
            Pending::Interrupt { id: iid, collector, .. } => *iid == id && collector.select(identity, option),
        }
    }

    fn expire(&mut self, now: Instant) {
        match &mut self.pending {
            Pending::Prompts { collectors, .. } => {
                for (_, c) in collectors {
                    c.expire(now);
                }
            }
            Pending::Interrupt { collector, .. } => {
                collector.expire(now);
            }
        }
    }

    fn is_resolved(&self) -> bool {
        match &self.pending {
            Pending::Prompts { collectors, .. } => collectors.iter().all(|(_, c)| c.is_resolved()),
            Pending::Interrupt { collector, .. } => collector.is_resolved(),
        }
    }

    fn live(&self) -> Vec<LiveRequest<O>> {
        match &self.pending {
            Pending::Prompts { collectors, .. } => collectors
                .iter()
                .map(|(id, c)| LiveRequest::Prompt {
                    id: *id,
                    request: c.request().clone(),
                })
                .collect(),
            Pending::Interrupt { id, collector, .. } => vec![LiveRequest::Interrupt {
                id: *id,
                request: collector.request().clone(),
            }],
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        match &self.pending {
            Pending::Prompts { collectors, .. } => collectors
                .iter()
                .filter(|(_, c)| !c.is_resolved())
                .map(|(_, c)| c.deadline())
                .min(),
            Pending::Interrupt { collector, .. } => {
                (!collector.is_resolved()).then(|| collector.deadline())
            }
        }
    }
}

type GameFlow<G> = Flow<<G as Game>::Choice, <G as Game>::Step>;

/// Runs one game instance.
pub struct GameRunner<G: Game> {
    game: G,
    commands: CommandTable<G>,
    continuations: ContinuationTable<G>,
    lock: CommandLock,
    chain: Option<Chain<G::Choice, G::Step>>,
    next_request: u32,
}

impl<G: Game> GameRunner<G> {
    /// Wrap `game`, building its command and continuation tables.
    pub fn new(game: G) -> Result<Self> {
        Ok(Self {
            game,
            commands: G::command_table()?,
            continuations: G::continuation_table()?,
            lock: CommandLock::new(),
            chain: None,
            next_request: 0,
        })
    }

    #[must_use]
    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    #[must_use]
    pub fn commands(&self) -> &CommandTable<G> {
        &self.commands
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_held()
    }

    /// Requests currently waiting on players.
    #[must_use]
    pub fn live_requests(&self) -> Vec<LiveRequest<G::Choice>> {
        self.chain.as_ref().map(Chain::live).unwrap_or_default()
    }

    /// When the next open request expires.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.chain.as_ref().and_then(Chain::next_deadline)
    }

    /// Every command visible in this game's debug mode.
    #[must_use]
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.commands.catalog(self.game.debug())
    }

    /// Commands someone may call right now, with the roles allowed to.
    #[must_use]
    pub fn current_commands(&self) -> Vec<(&CommandDescriptor<G::Phase>, Vec<Role>)> {
        self.commands
            .current_commands(self.game.phase(), self.game.debug())
    }

    /// Commands the named player may call right now.
    pub fn player_current_commands(&self, name: &str) -> Result<Vec<&CommandDescriptor<G::Phase>>> {
        let player = self.game.registry().get(name)?;
        Ok(self
            .commands
            .player_current_commands(player, self.game.phase(), self.game.debug()))
    }

    /// Tear the game down and drop anything in flight.
    pub fn kill(&mut self) -> RichMessage {
        self.game.kill();
        self.chain = None;
        if let Some(holder) = self.lock.release() {
            debug!(command = holder, "lock dropped by kill");
        }
        RichMessage::text("killing game")
    }

    /// Run a command.
    pub fn dispatch(&mut self, invocation: &Invocation, now: Instant) -> Response<G::Choice> {
        debug!(
            command = %invocation.command,
            identity = %invocation.identity,
            phase = %self.game.phase(),
            "dispatching command"
        );
        let mut response = Response::default();
        if let Err(err) = self.start(invocation, now, &mut response) {
            Self::fail(err, Some(&invocation.channel), &mut response);
        }
        response
    }

    /// Apply a player's pick on a live request.
    pub fn select(
        &mut self,
        identity: &Identity,
        request: RequestId,
        option: &G::Choice,
        now: Instant,
    ) -> Response<G::Choice> {
        let mut response = Response::default();
        let applied = self
            .chain
            .as_mut()
            .is_some_and(|chain| chain.select(request, identity, option));
        if applied {
            trace!(%identity, %request, %option, "selection applied");
            self.continue_chain(now, &mut response);
        } else {
            trace!(%identity, %request, %option, "selection ignored");
        }
        response
    }

    /// Expire every open request whose deadline passed.
    pub fn tick(&mut self, now: Instant) -> Response<G::Choice> {
        let mut response = Response::default();
        if let Some(chain) = self.chain.as_mut() {
            chain.expire(now);
            self.continue_chain(now, &mut response);
        }
        response
    }

    fn start(&mut self, invocation: &Invocation, now: Instant, response: &mut Response<G::Choice>) -> Result<()> {
        let cmd = self
            .commands
            .authorize(&self.game, &invocation.identity, &invocation.command)?;
        let (name, locking, handler) = (cmd.descriptor.name(), cmd.descriptor.is_locking(), cmd.handler);
        if locking {
            self.lock.acquire(name)?;
            trace!(command = name, "acquired game lock");
        }
        let flow = self.invoke(invocation, handler).and_then(|o| o.into_flow());
        self.drive(flow, locking, Some(&invocation.channel), now, response)
    }

    fn invoke(&mut self, invocation: &Invocation, handler: CommandHandler<G>) -> Result<GameOutcome<G>> {
        let call = Call {
            identity: &invocation.identity,
            channel: &invocation.channel,
            args: &invocation.args,
            commands: &self.commands,
        };
        let game = &mut self.game;
        guarded(|| handler(game, &call))
    }

    fn continue_chain(&mut self, now: Instant, response: &mut Response<G::Choice>) {
        let Some(holds_lock) = self.chain.as_ref().map(|c| c.holds_lock) else {
            return;
        };
        if let Some(flow) = self.take_resolved(response) {
            if let Err(err) = self.drive(flow, holds_lock, None, now, response) {
                Self::fail(err, None, response);
            }
        }
    }

    /// Feed results into continuations until the chain waits or ends.
    fn drive(
        &mut self,
        mut flow: Result<GameFlow<G>>,
        holds_lock: bool,
        reply_to: Option<&Destination>,
        now: Instant,
        response: &mut Response<G::Choice>,
    ) -> Result<()> {
        let mut reply_to = reply_to.cloned();
        loop {
            let waiting = flow.and_then(|f| self.open(f, holds_lock, reply_to.as_ref(), now, response));
            match waiting {
                Err(err) => {
                    self.settle(holds_lock);
                    return Err(err);
                }
                Ok(false) => {
                    self.settle(holds_lock);
                    return Ok(());
                }
                Ok(true) => match self.take_resolved(response) {
                    Some(next) => {
                        flow = next;
                        reply_to = None;
                    }
                    None => return Ok(()),
                },
            }
        }
    }

    /// Deliver outputs and open any requests. Returns whether the chain now waits.
    fn open(
        &mut self,
        flow: GameFlow<G>,
        holds_lock: bool,
        reply_to: Option<&Destination>,
        now: Instant,
        response: &mut Response<G::Choice>,
    ) -> Result<bool> {
        let deliver = |outputs: Vec<Output>, response: &mut Response<G::Choice>| {
            response
                .messages
                .extend(outputs.into_iter().map(|o| o.into_message(reply_to)));
        };
        let pending = match flow {
            Flow::Done(outputs) => {
                deliver(outputs, response);
                return Ok(false);
            }
            Flow::Prompts(outputs, prompts) => {
                deliver(outputs, response);
                let step = prompts
                    .first()
                    .map(|p| p.continuation)
                    .ok_or_else(|| Error::game("Empty prompt batch"))?;
                self.continuations.prompt_handler(step)?;
                self.ensure_idle()?;
                let collectors = prompts
                    .into_iter()
                    .map(|p| (self.next_id(), PromptCollector::open(p.request, now)))
                    .collect();
                Pending::Prompts { step, collectors }
            }
            Flow::Interrupt(outputs, interrupt) => {
                deliver(outputs, response);
                self.continuations.interrupt_handler(interrupt.continuation)?;
                self.ensure_idle()?;
                Pending::Interrupt {
                    step: interrupt.continuation,
                    id: self.next_id(),
                    collector: InterruptCollector::open(interrupt.request, now),
                }
            }
        };
        let chain = Chain { pending, holds_lock };
        let opened = chain.live();
        debug!(
            requests = opened.len(),
            phase = %self.game.phase(),
            "waiting on players"
        );
        response.opened.extend(opened);
        self.chain = Some(chain);
        Ok(true)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.chain.is_some() {
            return Err(Error::game(
                "Cannot open new prompts while another command is still collecting responses",
            ));
        }
        Ok(())
    }

    fn next_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    /// If every live request resolved, close them and run the continuation.
    fn take_resolved(&mut self, response: &mut Response<G::Choice>) -> Option<Result<GameFlow<G>>> {
        if !self.chain.as_ref()?.is_resolved() {
            return None;
        }
        let chain = self.chain.take()?;
        Some(self.resume(chain.pending, response))
    }

    fn resume(
        &mut self,
        pending: Pending<G::Choice, G::Step>,
        response: &mut Response<G::Choice>,
    ) -> Result<GameFlow<G>> {
        let outcome = match pending {
            Pending::Prompts { step, collectors } => {
                let mut results = PromptResults::new();
                for (id, collector) in collectors {
                    response.closed.push(ClosedRequest {
                        id,
                        summary: collector.summary(),
                    });
                    results.insert(collector.request().key.clone(), collector.result());
                }
                debug!(continuation = step.name(), "prompts resolved");
                let handler = self.continuations.prompt_handler(step)?;
                let game = &mut self.game;
                guarded(|| handler(game, results))?
            }
            Pending::Interrupt { step, id, collector } => {
                response.closed.push(ClosedRequest {
                    id,
                    summary: collector.summary(),
                });
                let results = collector.results();
                if results.responder_count() > 1 {
                    return Err(Error::game(format!(
                        "Interrupt '{}' resolved with more than one responding player",
                        step.name()
                    )));
                }
                debug!(continuation = step.name(), "interrupt resolved");
                let handler = self.continuations.interrupt_handler(step)?;
                let game = &mut self.game;
                guarded(|| handler(game, results))?
            }
        };
        outcome.into_flow()
    }

    fn settle(&mut self, holds_lock: bool) {
        if holds_lock {
            if let Some(holder) = self.lock.release() {
                trace!(command = holder, "released game lock");
            }
        }
    }

    fn fail(err: Error, reply_to: Option<&Destination>, response: &mut Response<G::Choice>) {
        match err.kind() {
            ErrorKind::IllegalMove => {
                warn!(target: "moderation", code = err.code(), "{}", err.message());
            }
            ErrorKind::Game | ErrorKind::Unclassified => {
                error!(code = err.code(), "{}", err.message());
            }
        }
        let message = Output::Text(err.to_string()).into_message(reply_to);
        response.messages.push(message);
        response.error = Some(err);
    }
}

/// Run `f`, turning a panic into an unclassified error.
fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "command panicked".to_owned());
            Err(Error::Unclassified(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invocation() {
        let inv = Invocation::parse("u-1", Destination::channel("game"), "  action steal bob ").unwrap();
        assert_eq!(inv.command, "action");
        assert_eq!(inv.args, vec!["steal", "bob"]);
        assert!(Invocation::parse("u-1", Destination::channel("game"), "   ").is_none());
    }

    #[test]
    fn test_guarded_converts_panics() {
        let err = guarded::<()>(|| panic!("deck exploded")).unwrap_err();
        assert_eq!(err, Error::Unclassified("deck exploded".into()));

        let ok = guarded(|| Ok(3)).unwrap();
        assert_eq!(ok, 3);
    }
}
