use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::AgentError;

/// Reasoning steps left for one top-level conversation.
///
/// Clones share the same counter, so a sub-agent spends from its parent's
/// allowance and the limit bounds the whole nested call tree.
#[derive(Debug, Clone)]
pub struct StepBudget {
    remaining: Arc<AtomicU32>,
    limit: u32,
}

impl StepBudget {
    pub fn new(limit: u32) -> Self {
        Self { remaining: Arc::new(AtomicU32::new(limit)), limit }
    }

    /// Spend one step, failing once the allowance is used up.
    pub fn consume(&self) -> Result<(), AgentError> {
        match self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(before) => {
                debug!(remaining = before - 1, limit = self.limit, "step consumed");
                Ok(())
            }
            Err(_) => Err(AgentError::RecursionLimitExceeded { limit: self.limit }),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}
