//! Request deadlines and cooperative cancellation.
//!
//! The budget loop and the analyzer calls are the only places with
//! externally imposed wall-clock cost, so they call [`Deadline::check`]
//! before doing work.

use std::time::{Duration, Instant};

pub use tokio_util::sync::CancellationToken;

use crate::error::{OptimizerError, Result};

/// Optional expiry plus a [`CancellationToken`] the caller can trip from
/// another thread. The token needs no runtime; the engine only polls it.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
    token: CancellationToken,
}

impl Deadline {
    /// A deadline that never expires and is never cancelled.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + timeout),
            token: CancellationToken::new(),
        }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fails with `Cancelled` or `DeadlineExceeded` when the request must stop.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(OptimizerError::Cancelled);
        }
        match self.expires_at {
            Some(at) if Instant::now() >= at => Err(OptimizerError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
