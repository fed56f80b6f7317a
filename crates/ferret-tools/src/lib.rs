// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod budget;
mod error;
mod files;
mod registry;
mod state;
mod todos;
mod tool;
pub mod builtin;
pub mod search;

pub use budget::StepBudget;
pub use error::AgentError;
pub use files::{list_files, read_file, write_file, FileError, WriteOutcome, DEFAULT_READ_LIMIT, EMPTY_FILE_REMINDER, MAX_LINE_CHARS};
pub use registry::ToolRegistry;
pub use state::{merge_files, AgentState, Files, StateUpdate, Todo, TodoStatus};
pub use todos::{parse_todos, render_todos, TodoError};
pub use tool::{Tool, ToolCall, ToolContext, ToolKind, ToolOutput, UnknownToolKind};
pub use builtin::{
    ls::LsTool, read_file::ReadFileTool, read_todos::ReadTodosTool, think::ThinkTool,
    web_search::WebSearchTool, write_file::WriteFileTool, write_todos::WriteTodosTool,
};
