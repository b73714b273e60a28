//! What a command or continuation hands back to the runner.

use crate::core::error::{Error, Result};
use crate::protocol::interrupt::Interrupt;
use crate::protocol::output::{Output, RichMessage};
use crate::protocol::prompt::Prompt;

/// One item of an [`Outcome`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply<O, K> {
    Output(Output),
    Prompt(Prompt<O, K>),
    Interrupt(Interrupt<O, K>),
}

/// Ordered list of outputs and at most one kind of pending request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome<O, K> {
    replies: Vec<Reply<O, K>>,
}

impl<O, K> Default for Outcome<O, K> {
    fn default() -> Self {
        Self { replies: Vec::new() }
    }
}

impl<O, K> Outcome<O, K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome holding a single line of text.
    pub fn text(text: impl Into<String>) -> Self {
        let mut out = Self::new();
        out.push_text(text);
        out
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.replies.push(Reply::Output(Output::Text(text.into())));
    }

    pub fn push_message(&mut self, message: RichMessage) {
        self.replies.push(Reply::Output(Output::Message(message)));
    }

    pub fn push_prompt(&mut self, prompt: Prompt<O, K>) {
        self.replies.push(Reply::Prompt(prompt));
    }

    pub fn push_interrupt(&mut self, interrupt: Interrupt<O, K>) {
        self.replies.push(Reply::Interrupt(interrupt));
    }

    /// Append everything from `other`.
    pub fn extend(&mut self, other: Self) {
        self.replies.extend(other.replies);
    }

    #[must_use]
    pub fn replies(&self) -> &[Reply<O, K>] {
        &self.replies
    }

    /// Plain text outputs, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.replies.iter().filter_map(|r| match r {
            Reply::Output(Output::Text(t)) => Some(t.as_str()),
            Reply::Output(Output::Message(m)) => m.text.as_deref(),
            _ => None,
        })
    }

    #[must_use]
    pub fn has_requests(&self) -> bool {
        self.replies
            .iter()
            .any(|r| !matches!(r, Reply::Output(_)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}

impl<O, K> From<&str> for Outcome<O, K> {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl<O, K> From<String> for Outcome<O, K> {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl<O, K> From<RichMessage> for Outcome<O, K> {
    fn from(message: RichMessage) -> Self {
        let mut out = Self::new();
        out.push_message(message);
        out
    }
}

/// An outcome sorted into what the runner does next.
#[derive(Debug)]
pub enum Flow<O, K> {
    /// Only output: the chain is finished.
    Done(Vec<Output>),
    /// Send the outputs, then collect every prompt.
    Prompts(Vec<Output>, Vec<Prompt<O, K>>),
    /// Send the outputs, then collect the interrupt.
    Interrupt(Vec<Output>, Interrupt<O, K>),
}

impl<O, K: PartialEq> Outcome<O, K> {
    /// Sort the replies, rejecting combinations the runner cannot drive.
    pub fn into_flow(self) -> Result<Flow<O, K>> {
        let mut outputs = Vec::new();
        let mut prompts = Vec::new();
        let mut interrupts = Vec::new();
        for reply in self.replies {
            match reply {
                Reply::Output(o) => outputs.push(o),
                Reply::Prompt(p) => prompts.push(p),
                Reply::Interrupt(i) => interrupts.push(i),
            }
        }
        if !prompts.is_empty() && !interrupts.is_empty() {
            return Err(Error::game(
                "Command returned prompts and an interrupt. Only one or the other is allowed.",
            ));
        }
        if interrupts.len() > 1 {
            return Err(Error::game(
                "Command returned multiple interrupts. Only one is allowed.",
            ));
        }
        if let Some(interrupt) = interrupts.pop() {
            return Ok(Flow::Interrupt(outputs, interrupt));
        }
        if let Some(first) = prompts.first() {
            if prompts.iter().any(|p| p.continuation != first.continuation) {
                return Err(Error::game(
                    "All prompts returned together must share one continuation",
                ));
            }
            let mut keys: Vec<&str> = prompts.iter().map(|p| p.request.key.as_str()).collect();
            keys.sort_unstable();
            if let Some(pair) = keys.windows(2).find(|pair| pair[0] == pair[1]) {
                return Err(Error::game(format!(
                    "More than one prompt is keyed '{}'. Each prompt in a batch needs its own key",
                    pair[0]
                )));
            }
            return Ok(Flow::Prompts(outputs, prompts));
        }
        Ok(Flow::Done(outputs))
    }
}
