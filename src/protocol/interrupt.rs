//! Multi-player interrupts.
//!
//! An interrupt offers the same options to several eligible players at once
//! ("does anyone challenge?"). It ends when somebody picks the end option,
//! when the total response count reaches `max_responses`, or on timeout.

use std::fmt::Display;
use std::time::{Duration, Instant};

use crate::core::error::{Error, Result};
use crate::core::identity::Identity;
use crate::core::player::Player;
use crate::protocol::prompt::has_duplicates;
use crate::protocol::{join_options, Selection, TIMEOUT_NOTICE};

/// A player who may answer an interrupt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eligible {
    pub name: String,
    pub identity: Identity,
}

/// What the transport needs to present an interrupt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterruptRequest<O> {
    pub eligible: Vec<Eligible>,
    pub options: Vec<O>,
    /// Picking this ends the interrupt for everyone.
    pub end_option: O,
    pub max_responses: Option<usize>,
    pub timeout: Duration,
    pub title: String,
    pub description: String,
    pub result_message: String,
}

/// An interrupt plus the continuation that receives its result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interrupt<O, K> {
    pub request: InterruptRequest<O>,
    pub continuation: K,
}

impl<O: Clone + Eq + Display, K> Interrupt<O, K> {
    pub fn new<'a, F: 'a>(
        eligible: impl IntoIterator<Item = &'a Player<F>>,
        options: Vec<O>,
        end_option: O,
        timeout: Duration,
        continuation: K,
    ) -> Result<Self> {
        if options.is_empty() {
            return Err(Error::game("An interrupt needs at least one option"));
        }
        if has_duplicates(&options) || options.contains(&end_option) {
            return Err(Error::game("Interrupt options must be unique"));
        }
        let eligible = eligible
            .into_iter()
            .map(|p| Eligible {
                name: p.name().to_owned(),
                identity: p.identity().clone(),
            })
            .collect();
        Ok(Self {
            request: InterruptRequest {
                eligible,
                options,
                end_option,
                max_responses: None,
                timeout,
                title: "Interrupt".to_owned(),
                description: String::new(),
                result_message: "Chosen: ".to_owned(),
            },
            continuation,
        })
    }

    /// Stop once this many responses are in.
    pub fn max_responses(mut self, max: usize) -> Result<Self> {
        if max < 1 {
            return Err(Error::game("max_responses must be at least 1"));
        }
        self.request.max_responses = Some(max);
        Ok(self)
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
    pub fn result_message(mut self, message: impl Into<String>) -> Self {
        self.request.result_message = message.into();
        self
    }
}

/// One eligible player's answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterruptResponse<O> {
    pub name: String,
    pub selection: Selection<O>,
}

/// Every eligible player's answer, in eligibility order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterruptResults<O> {
    pub responses: Vec<InterruptResponse<O>>,
}

impl<O> InterruptResults<O> {
    /// How many players gave a non-empty answer.
    #[must_use]
    pub fn responder_count(&self) -> usize {
        self.responses.iter().filter(|r| !r.selection.is_empty()).count()
    }

    /// The only player who answered, if any.
    pub fn responder(&self) -> Result<Option<&InterruptResponse<O>>> {
        let mut answered = self.responses.iter().filter(|r| !r.selection.is_empty());
        match (answered.next(), answered.next()) {
            (None, _) => Ok(None),
            (Some(only), None) => Ok(Some(only)),
            (Some(_), Some(_)) => Err(Error::game(
                "Somehow more than one player responded to an interrupt",
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InterruptState {
    Open,
    Ended,
    TimedOut,
}

/// Live state of a presented interrupt.
#[derive(Clone, Debug)]
pub struct InterruptCollector<O> {
    request: InterruptRequest<O>,
    selections: Vec<Selection<O>>,
    response_count: usize,
    deadline: Instant,
    state: InterruptState,
}

impl<O: Clone + Eq + Display> InterruptCollector<O> {
    /// Start collecting. With nobody eligible it resolves immediately.
    pub fn open(request: InterruptRequest<O>, now: Instant) -> Self {
        let deadline = now + request.timeout;
        let state = if request.eligible.is_empty() {
            InterruptState::Ended
        } else {
            InterruptState::Open
        };
        Self {
            selections: vec![Selection::new(); request.eligible.len()],
            request,
            response_count: 0,
            deadline,
            state,
        }
    }

    #[must_use]
    pub fn request(&self) -> &InterruptRequest<O> {
        &self.request
    }

    #[must_use]
    pub fn response_count(&self) -> usize {
        self.response_count
    }

    /// Apply a pick from `identity`. Returns whether it was applied.
    pub fn select(&mut self, identity: &Identity, option: &O) -> bool {
        if self.state != InterruptState::Open {
            return false;
        }
        let Some(slot) = self
            .request
            .eligible
            .iter()
            .position(|e| &e.identity == identity)
        else {
            return false;
        };
        if option == &self.request.end_option {
            self.state = InterruptState::Ended;
            return true;
        }
        if !self.request.options.contains(option) {
            return false;
        }
        let selection = &mut self.selections[slot];
        if let Some(pos) = selection.iter().position(|o| o == option) {
            selection.remove(pos);
            self.response_count -= 1;
        } else {
            selection.push(option.clone());
            self.response_count += 1;
        }
        if self
            .request
            .max_responses
            .is_some_and(|max| self.response_count >= max)
        {
            self.state = InterruptState::Ended;
        }
        true
    }

    pub fn expire(&mut self, now: Instant) -> bool {
        if self.state == InterruptState::Open && now >= self.deadline {
            self.state = InterruptState::TimedOut;
            return true;
        }
        false
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state != InterruptState::Open
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// One response per eligible player.
    #[must_use]
    pub fn results(&self) -> InterruptResults<O> {
        let responses = self
            .request
            .eligible
            .iter()
            .zip(&self.selections)
            .map(|(e, s)| InterruptResponse {
                name: e.name.clone(),
                selection: s.clone(),
            })
            .collect();
        InterruptResults { responses }
    }

    /// Closing text shown in place of the interrupt.
    #[must_use]
    pub fn summary(&self) -> String {
        let answered: Vec<String> = self
            .request
            .eligible
            .iter()
            .zip(&self.selections)
            .filter(|(_, s)| !s.is_empty())
            .map(|(e, s)| format!("{}: {}", e.name, join_options(s)))
            .collect();
        match (self.state, answered.is_empty()) {
            (InterruptState::TimedOut, true) => TIMEOUT_NOTICE.to_owned(),
            (_, true) => format!("{}{}", self.request.result_message, self.request.end_option),
            (_, false) => format!("{}{}", self.request.result_message, answered.join(", ")),
        }
    }
}
