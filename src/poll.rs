// ABOUTME: Bounded fixed-interval poller for asynchronous platform transitions.
// ABOUTME: Distinguishes running out of iterations from a check reporting failure.

use std::future::Future;
use std::time::Duration;

/// Outcome of a single check.
#[derive(Debug)]
pub enum PollStatus<T, E> {
    /// The awaited condition holds.
    Ready(T),
    /// Not there yet; check again after the interval.
    Pending,
    /// The check observed a terminal failure; stop immediately.
    Failed(E),
}

#[derive(Debug, PartialEq, Eq)]
pub enum PollError<E> {
    /// The condition did not hold within the iteration cap.
    Timeout { iterations: u32 },
    /// A check reported failure before the cap was reached.
    Failed(E),
}

/// Checks a condition up to `max_iterations` times, sleeping `interval`
/// between checks.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    interval: Duration,
    max_iterations: u32,
}

impl Poller {
    pub fn new(interval: Duration, max_iterations: u32) -> Self {
        Self {
            interval,
            max_iterations,
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run `check` until it reports ready or failed, or the cap is reached.
    /// The check receives the 1-based iteration number.
    pub async fn wait_until<T, E, F, Fut>(&self, mut check: F) -> Result<T, PollError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = PollStatus<T, E>>,
    {
        for iteration in 1..=self.max_iterations {
            match check(iteration).await {
                PollStatus::Ready(value) => return Ok(value),
                PollStatus::Failed(err) => return Err(PollError::Failed(err)),
                PollStatus::Pending => {
                    tracing::debug!(iteration, max = self.max_iterations, "condition pending");
                }
            }
            if iteration < self.max_iterations {
                tokio::time::sleep(self.interval).await;
            }
        }

        Err(PollError::Timeout {
            iterations: self.max_iterations,
        })
    }
}
