//! Politeness throttle
//!
//! A single throttle guards every request the crawler sends to the site,
//! page GETs and PDF HEAD probes alike. The interval runs from the moment
//! one request finishes to the moment the next one starts, so a slow
//! response never eats into the pause.

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Enforces a minimum pause between two requests
#[derive(Debug, Clone)]
pub struct Throttle {
    /// Minimum pause after a request completes
    interval: Duration,

    /// When the last request completed
    last_completed: Option<Instant>,
}

impl Throttle {
    /// Creates a throttle from a delay in seconds
    ///
    /// Negative or non-finite delays are treated as zero.
    pub fn new(delay_secs: f64) -> Self {
        Self {
            interval: secs_to_duration(delay_secs),
            last_completed: None,
        }
    }

    /// The current minimum interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Raises the interval to a robots.txt `Crawl-delay`, if that is longer
    ///
    /// Returns true if the interval changed.
    pub fn apply_crawl_delay(&mut self, crawl_delay_secs: f64) -> bool {
        let requested = secs_to_duration(crawl_delay_secs);
        if requested > self.interval {
            info!(
                "robots.txt Crawl-delay of {:.2}s exceeds configured delay of {:.2}s; using it",
                requested.as_secs_f64(),
                self.interval.as_secs_f64()
            );
            self.interval = requested;
            true
        } else {
            false
        }
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_completed?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.interval {
            Some(self.interval - elapsed)
        } else {
            None
        }
    }

    /// Records that a request completed at `now`
    pub fn record_completion(&mut self, now: Instant) {
        self.last_completed = Some(now);
    }

    /// Starts the pause; call once the response (or its failure) is in
    pub fn finish(&mut self) {
        self.record_completion(Instant::now());
    }

    /// Waits until the next request may start
    ///
    /// Returns false if `cancel` fires first.
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }

        if let Some(remaining) = self.time_until_next_request(Instant::now()) {
            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = sleep(remaining) => {}
            }
        }

        true
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}
