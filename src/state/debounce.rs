// Coalescing of rapid filter changes
// Author: Gabriel Demetrios Lafis

use std::time::{Duration, Instant};

use log::debug;
use tokio::sync::mpsc;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Identifies one submitted request; only the latest is current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

/// Single-slot debouncer.
///
/// Each `submit` replaces whatever was pending and restarts the quiet
/// period. The value becomes available from `take_ready` once `delay` has
/// passed without another submit.
#[derive(Debug)]
pub struct FilterDebouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
    generation: u64,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    submitted_at: Instant,
    token: RequestToken,
}

impl<T> FilterDebouncer<T> {
    pub fn new(delay: Duration) -> Self {
        FilterDebouncer {
            delay,
            pending: None,
            generation: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Store `value` as the pending request, discarding any earlier one
    pub fn submit(&mut self, value: T, now: Instant) -> RequestToken {
        self.generation += 1;
        let token = RequestToken(self.generation);

        if let Some(previous) = self.pending.take() {
            debug!("Filter request {:?} superseded by {:?}", previous.token, token);
        }

        self.pending = Some(Pending {
            value,
            submitted_at: now,
            token,
        });

        token
    }

    /// Take the pending value if its quiet period is over
    pub fn take_ready(&mut self, now: Instant) -> Option<(RequestToken, T)> {
        let ready = self.pending.as_ref()
            .map_or(false, |p| now.saturating_duration_since(p.submitted_at) >= self.delay);

        if !ready {
            return None;
        }

        self.pending.take().map(|p| (p.token, p.value))
    }

    /// When the pending value becomes ready
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.submitted_at + self.delay)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether `token` belongs to the most recent submit
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    /// Drop the pending value, if any
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

impl<T> Default for FilterDebouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Spawn a task forwarding only the last value of each burst.
///
/// A value is forwarded once `delay` passes with no newer value. When the
/// input side closes, the value still pending is flushed and the output
/// closes. Must be called from within a Tokio runtime.
pub fn spawn_debouncer<T: Send + 'static>(
    delay: Duration,
) -> (mpsc::UnboundedSender<T>, mpsc::UnboundedReceiver<T>) {
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<T>();
    let (output_tx, output_rx) = mpsc::unbounded_channel::<T>();

    tokio::spawn(async move {
        while let Some(mut latest) = input_rx.recv().await {
            loop {
                match tokio::time::timeout(delay, input_rx.recv()).await {
                    Ok(Some(next)) => {
                        debug!("Debounced value superseded");
                        latest = next;
                    },
                    Ok(None) => {
                        let _ = output_tx.send(latest);
                        return;
                    },
                    Err(_) => break,
                }
            }

            if output_tx.send(latest).is_err() {
                return;
            }
        }
    });

    (input_tx, output_rx)
}
