use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use ferret_config::Config;
use ferret_model::ModelProvider;
use ferret_tools::{
    LsTool, ReadFileTool, ReadTodosTool, ThinkTool, ToolRegistry, WebSearchTool, WriteFileTool,
    WriteTodosTool,
};

use crate::agent::Agent;
use crate::prompts;
use crate::subagent::SubAgentRegistry;
use crate::task_tool::TaskTool;

/// Tools a sub-agent may be given: web search and think.
pub fn delegation_tools(web_search: WebSearchTool) -> ToolRegistry {
    let mut reg = ToolRegistry::new();
    reg.register(web_search);
    reg.register(ThinkTool);
    reg
}

/// Main agent with the network-backed search tool.
pub fn build_main_agent(config: &Config, model: Arc<dyn ModelProvider>) -> anyhow::Result<Agent> {
    let web_search = WebSearchTool::from_config(&config.search, model.clone())?;
    build_main_agent_with(config, model, web_search)
}

/// Main agent around a caller-supplied search tool.
///
/// The main agent gets the file, TODO and search tools, think, and the
/// task tool over the configured sub-agents.
pub fn build_main_agent_with(
    config: &Config,
    model: Arc<dyn ModelProvider>,
    web_search: WebSearchTool,
) -> anyhow::Result<Agent> {
    let delegation = delegation_tools(web_search);

    let subagents =
        SubAgentRegistry::from_config(&config.subagents).context("invalid sub-agent configuration")?;
    let task = TaskTool::new(&subagents, model.clone(), &delegation)
        .context("invalid sub-agent configuration")?;

    let mut tools = delegation;
    tools.register(LsTool);
    tools.register(ReadFileTool);
    tools.register(WriteFileTool);
    tools.register(WriteTodosTool);
    tools.register(ReadTodosTool);
    tools.register(task);

    let prompt = config
        .agent
        .system_prompt
        .clone()
        .unwrap_or_else(|| prompts::main_instructions(&config.agent));

    info!(
        environment = %config.environment,
        model = model.model_name(),
        tools = ?tools.names(),
        subagents = ?subagents.names(),
        "main agent built"
    );
    Ok(Agent::new("main", model, tools, prompt))
}
