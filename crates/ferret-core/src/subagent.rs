use std::collections::HashSet;

use thiserror::Error;

use ferret_config::SubAgentConfig;
use ferret_tools::{ToolKind, UnknownToolKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("sub-agent '{agent}' lists {source}")]
    UnknownTool {
        agent: String,
        #[source]
        source: UnknownToolKind,
    },
    #[error("sub-agent '{agent}' lists tool '{tool}', which is not available for delegation")]
    UnavailableTool { agent: String, tool: ToolKind },
    #[error("sub-agent '{0}' is defined more than once")]
    Duplicate(String),
}

/// Static description of one delegation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAgentSpec {
    pub name: String,
    pub description: String,
    pub prompt: String,
    /// `None` grants every delegation tool.
    pub tools: Option<Vec<ToolKind>>,
}

impl SubAgentSpec {
    pub fn from_config(cfg: &SubAgentConfig) -> Result<Self, RegistryError> {
        let tools = cfg
            .tools
            .as_ref()
            .map(|names| {
                names
                    .iter()
                    .map(|n| {
                        n.parse::<ToolKind>().map_err(|source| RegistryError::UnknownTool {
                            agent: cfg.name.clone(),
                            source,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(Self {
            name: cfg.name.clone(),
            description: cfg.description.clone(),
            prompt: cfg.prompt.clone(),
            tools,
        })
    }
}

/// Sub-agent name → spec, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct SubAgentRegistry {
    agents: Vec<SubAgentSpec>,
}

impl SubAgentRegistry {
    pub fn new(agents: Vec<SubAgentSpec>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for a in &agents {
            if !seen.insert(a.name.as_str()) {
                return Err(RegistryError::Duplicate(a.name.clone()));
            }
        }
        Ok(Self { agents })
    }

    pub fn from_config(cfgs: &[SubAgentConfig]) -> Result<Self, RegistryError> {
        let specs = cfgs.iter().map(SubAgentSpec::from_config).collect::<Result<Vec<_>, _>>()?;
        Self::new(specs)
    }

    pub fn get(&self, name: &str) -> Option<&SubAgentSpec> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubAgentSpec> {
        self.agents.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// One `- name: description` line per sub-agent.
    pub fn describe(&self) -> String {
        self.agents
            .iter()
            .map(|a| format!("- {}: {}", a.name, a.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
