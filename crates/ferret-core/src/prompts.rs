//! Instruction text for the main agent and the delegation tool.

use ferret_config::AgentConfig;
use ferret_tools::search::today;

pub const TODO_USAGE_INSTRUCTIONS: &str = "\
Based on the user's request:
1. Use write_todos to create a TODO list at the start of any multi-step request.
2. After finishing a task, use read_todos to re-read the list and remind yourself of the plan.
3. Reflect on what you have done and what remains.
4. Mark the task completed and move to the next one.
5. Continue until every item is completed.

Batch research into a single TODO where possible to keep the number of items small.";

pub const FILE_USAGE_INSTRUCTIONS: &str = "\
You have access to a virtual file system that holds context between steps.

Workflow:
1. Orient: use ls to see which files exist before starting work.
2. Save: use write_file to store the user's request so you can refer back to it.
3. Research: delegate; search results are saved to files by the researcher.
4. Read: use read_file on saved results once research is done to answer the user.";

pub const SUBAGENT_USAGE_INSTRUCTIONS: &str = "\
You can delegate tasks to sub-agents with the task tool.

<Task>
Delegate research to specialized sub-agents. Gather enough information to \
answer the user's question, then answer.
</Task>

<Available Tools>
1. task(description, subagent_type): delegate a research task to a sub-agent.
   Give each sub-agent a single, self-contained topic; it sees nothing of this conversation.
2. think: reflect on results and plan next steps.
</Available Tools>

<Hard Limits>
- Use at most {max_concurrent_research_units} sub-agents per round.
- Stop after {max_researcher_iterations} rounds of delegation if you cannot find \
the right sources.
- Prefer a single sub-agent unless the request clearly splits into independent parts.
</Hard Limits>

<Scaling Rules>
- Simple fact-finding, lists and rankings: one sub-agent.
- Explicit comparisons: one sub-agent per element being compared.
</Scaling Rules>

For context, today's date is {date}.";

pub const TASK_DESCRIPTION_PREFIX: &str = "\
Delegate a task to a specialized sub-agent with isolated context. \
The sub-agent starts from your description alone, shares your files and \
returns only its final answer.

Available agents for delegation are:
{other_agents}";

const SEPARATOR_WIDTH: usize = 80;

/// Instructions for the main agent: TODO, file and delegation sections.
pub fn main_instructions(cfg: &AgentConfig) -> String {
    let subagent = SUBAGENT_USAGE_INSTRUCTIONS
        .replace("{max_concurrent_research_units}", &cfg.max_concurrent_research_units.to_string())
        .replace("{max_researcher_iterations}", &cfg.max_researcher_iterations.to_string())
        .replace("{date}", &today());
    let sep = "=".repeat(SEPARATOR_WIDTH);
    format!(
        "# TODO MANAGEMENT\n{TODO_USAGE_INSTRUCTIONS}\n\n{sep}\n\n\
         # FILE SYSTEM USAGE\n{FILE_USAGE_INSTRUCTIONS}\n\n{sep}\n\n\
         # SUB-AGENT DELEGATION\n{subagent}"
    )
}

/// The task tool's description with the sub-agent listing filled in.
pub fn task_description(other_agents: &str) -> String {
    TASK_DESCRIPTION_PREFIX.replace("{other_agents}", other_agents)
}

/// Substitute `{date}` in a sub-agent prompt.
pub fn render_subagent_prompt(prompt: &str) -> String {
    prompt.replace("{date}", &today())
}
