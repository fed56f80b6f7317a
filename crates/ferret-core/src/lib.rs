// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod agent;
mod builder;
pub mod prompts;
mod subagent;
mod task_tool;

pub use agent::Agent;
pub use builder::{build_main_agent, build_main_agent_with, delegation_tools};
pub use subagent::{RegistryError, SubAgentRegistry, SubAgentSpec};
pub use task_tool::{DelegationError, TaskTool};
