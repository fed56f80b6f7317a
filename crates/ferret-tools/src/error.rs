use thiserror::Error;

/// Failures that abort a reasoning loop.  Everything recoverable is
/// reported to the model as tool output instead.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("recursion limit of {limit} steps exceeded")]
    RecursionLimitExceeded { limit: u32 },

    #[error("model error: {0:#}")]
    Model(#[from] anyhow::Error),

    #[error("sub-agent '{name}' failed: {source}")]
    SubAgent {
        name: String,
        #[source]
        source: Box<AgentError>,
    },
}

impl AgentError {
    pub fn is_recursion_limit(&self) -> bool {
        match self {
            AgentError::RecursionLimitExceeded { .. } => true,
            AgentError::SubAgent { source, .. } => source.is_recursion_limit(),
            AgentError::Model(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recursion_limit_is_detected_through_sub_agent_wrapping() {
        let inner = AgentError::RecursionLimitExceeded { limit: 5 };
        let outer = AgentError::SubAgent { name: "research-agent".into(), source: Box::new(inner) };
        assert!(outer.is_recursion_limit());
        assert_eq!(
            outer.to_string(),
            "sub-agent 'research-agent' failed: recursion limit of 5 steps exceeded"
        );
    }

    #[test]
    fn model_errors_are_not_recursion_errors() {
        let err = AgentError::from(anyhow::anyhow!("boom"));
        assert!(!err.is_recursion_limit());
        assert_eq!(err.to_string(), "model error: boom");
    }
}
