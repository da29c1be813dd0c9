use std::time::Duration;

use tokio::time::Instant;

/// Owned, cancelable countdown. Arming always replaces the previous deadline,
/// so a monitor never has two countdowns running.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    threshold: Duration,
    deadline: Option<Instant>,
}

impl IdleTimer {
    pub fn new(threshold: Duration) -> Self { Self { threshold, deadline: None } }

    pub fn threshold(&self) -> Duration { self.threshold }

    pub fn arm(&mut self) { self.deadline = Some(Instant::now() + self.threshold); }

    pub fn cancel(&mut self) { self.deadline = None; }

    pub fn is_armed(&self) -> bool { self.deadline.is_some() }

    pub fn deadline(&self) -> Option<Instant> { self.deadline }
}

/// Resolves at `deadline`, or never when there is none.
pub async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending::<()>().await,
    }
}
