//! Retry decision logic for the request executor.
//!
//! Each network attempt is classified into an [`AttemptOutcome`], and the
//! pure [`next_action`] function decides what the executor does next. The
//! decision function never touches the network, so the whole retry policy
//! is unit-testable in isolation.

use std::time::Duration;

use crate::error::{HttpError, TransportError};
use crate::response::ApiResponse;

/// Classification of a single attempt inside the retry loop.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// An HTTP response outside the 5xx band. Final, whatever the status;
    /// 4xx responses are valid outcomes for assertion and are never retried.
    Success(ApiResponse),
    /// A 5xx response, treated as transient.
    ServerError(ApiResponse),
    /// A timeout or connection failure, treated as transient.
    Transient(TransportError),
    /// A transport failure that retrying cannot fix.
    Fatal(HttpError),
}

/// What the executor does after an attempt.
#[derive(Debug)]
pub enum NextAction {
    /// Sleep `delay`, then issue the next attempt.
    Retry { delay: Duration },
    /// Hand the response back to the caller.
    Return(ApiResponse),
    /// Propagate a terminal error.
    Fail(HttpError),
}

/// Decide the executor's next step after attempt `attempt` of `retries`.
///
/// Backoff is linear in the attempt number (`backoff_base * attempt`),
/// which keeps test timing predictable. When the 5xx band exhausts its
/// attempts the last response is returned as data, not raised; transient
/// network failures on the final attempt become terminal errors.
pub fn next_action(
    outcome: AttemptOutcome,
    attempt: u32,
    retries: u32,
    backoff_base: Duration,
) -> NextAction {
    let attempts_remain = attempt < retries;
    match outcome {
        AttemptOutcome::Success(response) => NextAction::Return(response),
        AttemptOutcome::ServerError(response) => {
            if attempts_remain {
                NextAction::Retry {
                    delay: backoff_base * attempt,
                }
            } else {
                NextAction::Return(response)
            }
        }
        AttemptOutcome::Transient(transport) => {
            if attempts_remain {
                NextAction::Retry {
                    delay: backoff_base * attempt,
                }
            } else {
                NextAction::Fail(transport.into_fatal(attempt))
            }
        }
        AttemptOutcome::Fatal(error) => NextAction::Fail(error),
    }
}
