// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// What to print once the conversation finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormatArg {
    /// Transcript (## User / ## Assistant / ## Tool / ## Tool Result),
    /// then the saved files and the todo list.
    #[default]
    Conversation,
    /// The final shared state (messages, todos, files) as JSON.
    Json,
    /// Only the final assistant message.
    Compact,
}

#[derive(Parser, Debug)]
#[command(
    name = "ferret",
    about = "A research agent that plans, takes notes and delegates to sub-agents",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// The request to work on.  Read from stdin when omitted.
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// Path to config file (merged on top of the discovered ones)
    #[arg(long, short = 'c', env = "FERRET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (conversation | json | compact)
    #[arg(long, value_enum, default_value = "conversation")]
    pub output_format: OutputFormatArg,

    /// Override agent.recursion_limit for this run
    #[arg(long, value_name = "STEPS")]
    pub recursion_limit: Option<u32>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the effective configuration and exit
    ShowConfig,
}
