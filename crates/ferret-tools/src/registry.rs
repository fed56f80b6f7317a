// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;
use std::sync::Arc;

use ferret_model::ToolSchema;
use tracing::{debug, warn};

use crate::{AgentError, Tool, ToolCall, ToolContext, ToolKind, ToolOutput};

/// The tools one agent may call, keyed by kind.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolKind, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.kind(), tool);
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn Tool>> {
        self.tools.get(&kind).cloned()
    }

    pub fn contains(&self, kind: ToolKind) -> bool {
        self.tools.contains_key(&kind)
    }

    /// A registry holding only `kinds`; kinds not present here are skipped.
    pub fn subset(&self, kinds: &[ToolKind]) -> Self {
        let tools = kinds
            .iter()
            .filter_map(|k| self.tools.get(k).map(|t| (*k, t.clone())))
            .collect();
        Self { tools }
    }

    /// Schemas for every registered tool, ordered by kind.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .values()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    pub fn kinds(&self) -> Vec<ToolKind> {
        self.tools.keys().copied().collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().map(|k| k.as_str()).collect()
    }

    /// Dispatch a call by name.  Names that are not a known kind, or a kind
    /// not registered here, are reported back to the model.
    pub async fn execute(
        &self,
        call: &ToolCall,
        ctx: ToolContext<'_>,
    ) -> Result<ToolOutput, AgentError> {
        let tool = call.name.parse::<ToolKind>().ok().and_then(|k| self.tools.get(&k));
        match tool {
            Some(tool) => {
                debug!(tool = %call.name, call_id = %call.id, "executing tool");
                tool.execute(call, ctx).await
            }
            None => {
                warn!(tool = %call.name, "model requested unavailable tool");
                Ok(ToolOutput::err(&call.id, format!("unknown tool: {}", call.name)))
            }
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
