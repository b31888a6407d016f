//! Wall-clock deadline for long-running evaluations.

use std::time::{Duration, Instant};

/// A deadline checked cooperatively inside iterative loops.
///
/// Created at the start of one evaluation and passed down by value; there
/// is no shared cancellation state between evaluations.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    deadline: Option<Instant>,
}

impl Budget {
    /// Starts a budget that runs out after `timeout`, or never if `None`.
    pub fn start(timeout: Option<Duration>) -> Self {
        Self {
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// A budget that never runs out.
    pub fn unlimited() -> Self {
        Self { deadline: None }
    }

    /// Returns `true` once the deadline has passed.
    pub fn exhausted(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_never_exhausts() {
        assert!(!Budget::unlimited().exhausted());
        assert!(!Budget::start(None).exhausted());
    }

    #[test]
    fn zero_timeout_is_exhausted() {
        assert!(Budget::start(Some(Duration::ZERO)).exhausted());
    }

    #[test]
    fn long_timeout_is_not_exhausted() {
        assert!(!Budget::start(Some(Duration::from_secs(3600))).exhausted());
    }
}
