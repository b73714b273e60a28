//! Single-player prompts.
//!
//! A prompt asks one player to pick exactly `count` of a set of options.
//! Each pick toggles an option in or out of the running selection; the prompt
//! resolves as soon as the selection holds `count` options, or with `None`
//! once its deadline passes.

use rustc_hash::FxHashMap;
use std::fmt::Display;
use std::time::{Duration, Instant};

use crate::core::error::{Error, Result};
use crate::core::identity::Identity;
use crate::core::player::Player;
use crate::protocol::{join_options, Selection, TIMEOUT_NOTICE};

/// What the transport needs to present a prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptRequest<O> {
    pub target: Identity,
    pub target_name: String,
    /// Routing key of the result. Defaults to the target's name.
    pub key: String,
    pub options: Vec<O>,
    pub count: usize,
    pub timeout: Duration,
    pub title: String,
    pub description: String,
    /// Send privately instead of to the game channel.
    pub direct: bool,
    pub result_message: String,
}

/// A prompt plus the continuation that receives its result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt<O, K> {
    pub request: PromptRequest<O>,
    pub continuation: K,
}

impl<O: Clone + Eq + Display, K> Prompt<O, K> {
    /// Ask `player` to pick `count` of `options`.
    ///
    /// Fails with a game error when `count` is zero, exceeds the number of
    /// options, or the options repeat.
    pub fn new<F>(
        player: &Player<F>,
        options: Vec<O>,
        count: usize,
        timeout: Duration,
        continuation: K,
    ) -> Result<Self> {
        if count < 1 {
            return Err(Error::game("A prompt must ask for at least one option"));
        }
        if count > options.len() {
            return Err(Error::game(format!(
                "Cannot ask for {count} options out of {}",
                options.len()
            )));
        }
        if has_duplicates(&options) {
            return Err(Error::game("Prompt options must be unique"));
        }
        let description = format!(
            "Please Select {count} of the following: {}",
            join_options(&options)
        );
        Ok(Self {
            request: PromptRequest {
                target: player.identity().clone(),
                target_name: player.name().to_owned(),
                key: player.name().to_owned(),
                options,
                count,
                timeout,
                title: "Make a selection".to_owned(),
                description,
                direct: false,
                result_message: "You Chose: ".to_owned(),
            },
            continuation,
        })
    }

    #[must_use]
    pub fn keyed(mut self, key: impl Into<String>) -> Self {
        self.request.key = key.into();
        self
    }

    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.request.title = title.into();
        self
    }

    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.request.description = description.into();
        self
    }

    #[must_use]
    pub fn direct(mut self, direct: bool) -> Self {
        self.request.direct = direct;
        self
    }

    #[must_use]
    pub fn result_message(mut self, message: impl Into<String>) -> Self {
        self.request.result_message = message.into();
        self
    }
}

pub(crate) fn has_duplicates<O: PartialEq>(options: &[O]) -> bool {
    options
        .iter()
        .enumerate()
        .any(|(i, o)| options[..i].contains(o))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PromptState {
    Open,
    Chosen,
    TimedOut,
}

/// Live state of one presented prompt.
#[derive(Clone, Debug)]
pub struct PromptCollector<O> {
    request: PromptRequest<O>,
    selection: Selection<O>,
    deadline: Instant,
    state: PromptState,
}

impl<O: Clone + Eq + Display> PromptCollector<O> {
    pub fn open(request: PromptRequest<O>, now: Instant) -> Self {
        let deadline = now + request.timeout;
        Self {
            request,
            selection: Selection::new(),
            deadline,
            state: PromptState::Open,
        }
    }

    #[must_use]
    pub fn request(&self) -> &PromptRequest<O> {
        &self.request
    }

    /// The options picked so far.
    #[must_use]
    pub fn selection(&self) -> &[O] {
        &self.selection
    }

    /// Toggle `option` for `identity`.
    ///
    /// Picks from anyone but the target, of unknown options, or after the
    /// prompt resolved are ignored. Returns whether the pick was applied.
    pub fn select(&mut self, identity: &Identity, option: &O) -> bool {
        if self.state != PromptState::Open
            || identity != &self.request.target
            || !self.request.options.contains(option)
        {
            return false;
        }
        if let Some(pos) = self.selection.iter().position(|o| o == option) {
            self.selection.remove(pos);
        } else {
            self.selection.push(option.clone());
        }
        if self.selection.len() == self.request.count {
            self.state = PromptState::Chosen;
        }
        true
    }

    /// Time the prompt out if its deadline has passed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.state == PromptState::Open && now >= self.deadline {
            self.state = PromptState::TimedOut;
            return true;
        }
        false
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state != PromptState::Open
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// The selection if the player finished, `None` if it timed out or is open.
    #[must_use]
    pub fn result(&self) -> Option<Selection<O>> {
        (self.state == PromptState::Chosen).then(|| self.selection.clone())
    }

    /// Closing text shown in place of the prompt.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.state {
            PromptState::Chosen => format!(
                "{}{}",
                self.request.result_message,
                join_options(&self.selection)
            ),
            _ => TIMEOUT_NOTICE.to_owned(),
        }
    }
}

/// Prompt results keyed by each prompt's routing key.
///
/// `None` means that prompt timed out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptResults<O> {
    results: FxHashMap<String, Option<Selection<O>>>,
}

impl<O> Default for PromptResults<O> {
    fn default() -> Self {
        Self {
            results: FxHashMap::default(),
        }
    }
}

impl<O> PromptResults<O> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, result: Option<Selection<O>>) {
        self.results.insert(key.into(), result);
    }

    /// Take the result routed to `key`. A missing key is a game error.
    pub fn take(&mut self, key: &str) -> Result<Option<Selection<O>>> {
        self.results
            .remove(key)
            .ok_or_else(|| Error::game(format!("Missing prompt result for '{key}'")))
    }

    /// The single result when exactly one prompt was sent.
    pub fn into_single(self) -> Result<(String, Option<Selection<O>>)> {
        if self.results.len() != 1 {
            return Err(Error::game(format!(
                "Expected a single prompt result, got {}",
                self.results.len()
            )));
        }
        self.results
            .into_iter()
            .next()
            .ok_or_else(|| Error::game("Expected a single prompt result, got 0"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Option<Selection<O>>)> {
        self.results.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl<O> IntoIterator for PromptResults<O> {
    type Item = (String, Option<Selection<O>>);
    type IntoIter = std::collections::hash_map::IntoIter<String, Option<Selection<O>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
