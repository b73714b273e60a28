//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Once;
use std::time::{Duration, Instant};

use party_engine::dispatch::{GameRunner, Invocation, LiveRequest, Response};
use party_engine::{Destination, Game};

static TRACING: Once = Once::new();

/// Route engine logs to the test harness output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn channel() -> Destination {
    Destination::channel("game")
}

/// Run `line` as `identity` from the game channel.
pub fn run<G: Game>(runner: &mut GameRunner<G>, identity: &str, line: &str, now: Instant) -> Response<G::Choice> {
    let invocation = Invocation::parse(identity, channel(), line).expect("empty command line");
    runner.dispatch(&invocation, now)
}

/// Run `line` and fail the test if it errors.
pub fn run_ok<G: Game>(runner: &mut GameRunner<G>, identity: &str, line: &str, now: Instant) -> Response<G::Choice> {
    let response = run(runner, identity, line, now);
    if let Some(err) = &response.error {
        panic!("'{line}' as {identity} failed: {err}");
    }
    response
}

/// The prompt addressed to `name`, if one is live.
pub fn prompt_for<O: Clone>(requests: &[LiveRequest<O>], name: &str) -> Option<(party_engine::protocol::RequestId, Vec<O>)> {
    requests.iter().find_map(|r| match r {
        LiveRequest::Prompt { id, request } if request.target_name == name => {
            Some((*id, request.options.clone()))
        }
        _ => None,
    })
}

/// The interrupt `name` may answer, if one is live.
pub fn interrupt_for<O: Clone>(requests: &[LiveRequest<O>], name: &str) -> Option<(party_engine::protocol::RequestId, Vec<O>)> {
    requests.iter().find_map(|r| match r {
        LiveRequest::Interrupt { id, request } if request.eligible.iter().any(|e| e.name == name) => {
            Some((*id, request.options.clone()))
        }
        _ => None,
    })
}

pub fn later(start: Instant, secs: u64) -> Instant {
    start + Duration::from_secs(secs)
}
