mod cli;
mod output;

use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*, reload, Registry};

use cli::{Cli, Commands, OutputFormatArg};
use ferret_config::Config;
use ferret_model::ModelProvider;
use ferret_tools::{AgentState, StepBudget};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_handle = init_logging(cli.verbose);
    let mut config = ferret_config::load(cli.config.as_deref())?;
    apply_configured_level(log_handle, &config.log.level);

    if let Some(Commands::ShowConfig) = &cli.command {
        println!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    if let Some(limit) = cli.recursion_limit {
        config.agent.recursion_limit = limit;
    }

    let prompt = read_prompt(cli.prompt.as_deref())?;
    run(&config, prompt, cli.output_format).await
}

/// Prompt from the argument, otherwise from piped stdin.
fn read_prompt(arg: Option<&str>) -> anyhow::Result<String> {
    let prompt = match arg {
        Some(p) => p.to_string(),
        None => {
            if io::stdin().is_terminal() {
                anyhow::bail!("no prompt given; pass PROMPT or pipe it on stdin");
            }
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading prompt from stdin")?;
            buf
        }
    };
    let prompt = prompt.trim();
    if prompt.is_empty() {
        anyhow::bail!("prompt is empty");
    }
    Ok(prompt.to_string())
}

async fn run(config: &Config, prompt: String, format: OutputFormatArg) -> anyhow::Result<()> {
    let model: Arc<dyn ModelProvider> = Arc::from(ferret_model::from_config(&config.model)?);
    let agent = ferret_core::build_main_agent(config, model)?;
    let budget = StepBudget::new(config.agent.recursion_limit);

    info!(environment = %config.environment, limit = budget.limit(), "starting conversation");
    let state = match agent.invoke(AgentState::from_prompt(prompt), &budget).await {
        Ok(state) => state,
        Err(e) if e.is_recursion_limit() => {
            error!(limit = budget.limit(), "conversation stopped");
            anyhow::bail!("{e}; raise agent.recursion_limit or --recursion-limit to allow more steps");
        }
        Err(e) => return Err(anyhow::Error::new(e).context("conversation failed")),
    };
    info!(
        messages = state.messages.len(),
        files = state.files.len(),
        steps_left = budget.remaining(),
        "conversation finished"
    );

    let text = match format {
        OutputFormatArg::Conversation => output::conversation(&state),
        OutputFormatArg::Compact => output::compact(&state),
        OutputFormatArg::Json => output::json(&state)?,
    };
    print!("{text}");
    Ok(())
}

type LogHandle = reload::Handle<EnvFilter, Registry>;

/// `RUST_LOG` wins, then `-v`/`-vv`.  Without either the filter starts at
/// `warn` and the returned handle swaps in the configured level once the
/// config is loaded.
fn init_logging(verbosity: u8) -> Option<LogHandle> {
    let (filter, from_config) = match EnvFilter::try_from_default_env() {
        Ok(f) => (f, false),
        Err(_) => match verbosity {
            0 => (EnvFilter::new("warn"), true),
            1 => (EnvFilter::new("debug"), false),
            _ => (EnvFilter::new("trace"), false),
        },
    };
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    from_config.then_some(handle)
}

fn apply_configured_level(handle: Option<LogHandle>, level: &str) {
    let Some(handle) = handle else { return };
    match EnvFilter::try_new(level) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                warn!(error = %e, "could not apply log.level");
            }
        }
        Err(e) => warn!(level, error = %e, "invalid log.level; keeping warn"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(handle: &LogHandle) -> String {
        handle.with_current(|f| f.to_string()).unwrap()
    }

    #[test]
    fn configured_level_replaces_startup_filter() {
        let (_layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("warn"));
        apply_configured_level(Some(handle.clone()), "debug");
        assert_eq!(current(&handle), "debug");
    }

    #[test]
    fn invalid_configured_level_keeps_startup_filter() {
        let (_layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("warn"));
        apply_configured_level(Some(handle.clone()), "ferret=verbose");
        assert_eq!(current(&handle), "warn");
    }
}
