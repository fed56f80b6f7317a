use std::collections::BTreeMap;

use ferret_model::Message;
use serde::{Deserialize, Serialize};

/// Virtual file system: path → full text.  Keys are compared as exact
/// strings and iterate in sorted order.
pub type Files = BTreeMap<String, String>;

/// Lifecycle of a single TODO item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Completed => "completed",
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            TodoStatus::Pending => "⏳",
            TodoStatus::InProgress => "🔄",
            TodoStatus::Completed => "✅",
        }
    }
}

impl std::fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub content: String,
    pub status: TodoStatus,
}

impl Todo {
    pub fn new(content: impl Into<String>, status: TodoStatus) -> Self {
        Self { content: content.into(), status }
    }
}

/// Everything an agent reads and writes during one conversation.
///
/// A state is owned by exactly one reasoning loop at a time.  Sub-agents get
/// a derived copy and hand back a [`StateUpdate`]; nothing is shared by
/// reference across that boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub todos: Vec<Todo>,
    #[serde(default)]
    pub files: Files,
}

impl AgentState {
    /// Fresh conversation seeded with one user message.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self { messages: vec![Message::user(prompt)], ..Self::default() }
    }

    /// Fold a delta into this state: files merge key-by-key (incoming wins),
    /// todos are replaced wholesale, messages are appended.
    pub fn apply(&mut self, update: StateUpdate) {
        if update.files.is_some() {
            self.files =
                merge_files(Some(std::mem::take(&mut self.files)), update.files).unwrap_or_default();
        }
        if let Some(todos) = update.todos {
            self.todos = todos;
        }
        self.messages.extend(update.messages);
    }

    /// Text of the final message, used as a sub-agent's answer.
    pub fn last_message_text(&self) -> &str {
        self.messages.last().and_then(|m| m.text_content()).unwrap_or_default()
    }
}

/// A delta produced by a tool.  `None` means "leave this field alone".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub files: Option<Files>,
    pub todos: Option<Vec<Todo>>,
    pub messages: Vec<Message>,
}

impl StateUpdate {
    pub fn is_empty(&self) -> bool {
        self.files.is_none() && self.todos.is_none() && self.messages.is_empty()
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.get_or_insert_with(Files::new).insert(path.into(), content.into());
        self
    }

    pub fn with_files(mut self, files: Files) -> Self {
        self.files = merge_files(self.files.take(), Some(files));
        self
    }

    pub fn with_todos(mut self, todos: Vec<Todo>) -> Self {
        self.todos = Some(todos);
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

/// The files reducer.  Absent on either side yields the other side;
/// otherwise `base` is overwritten key-by-key by `incoming`.
pub fn merge_files(base: Option<Files>, incoming: Option<Files>) -> Option<Files> {
    match (base, incoming) {
        (None, incoming) => incoming,
        (base, None) => base,
        (Some(mut base), Some(incoming)) => {
            base.extend(incoming);
            Some(base)
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn files(pairs: &[(&str, &str)]) -> Files {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn merge_with_absent_side_returns_other() {
        let a = files(&[("a.md", "1")]);
        assert_eq!(merge_files(None, Some(a.clone())), Some(a.clone()));
        assert_eq!(merge_files(Some(a.clone()), None), Some(a));
        assert_eq!(merge_files(None, None), None);
    }

    #[test]
    fn merge_incoming_wins_on_conflict() {
        let base = files(&[("a.md", "old"), ("b.md", "keep")]);
        let incoming = files(&[("a.md", "new"), ("c.md", "added")]);
        let merged = merge_files(Some(base), Some(incoming)).unwrap();
        assert_eq!(merged, files(&[("a.md", "new"), ("b.md", "keep"), ("c.md", "added")]));
    }

    #[test]
    fn merge_is_idempotent() {
        let a = files(&[("x", "a"), ("y", "a"), ("only_a", "a")]);
        let b = files(&[("y", "b"), ("z", "b")]);
        let once = merge_files(Some(a.clone()), Some(b.clone()));
        let twice = merge_files(once.clone(), Some(b));
        assert_eq!(twice, once);
        assert_eq!(merge_files(Some(a.clone()), Some(a.clone())), Some(a));
    }

    #[test]
    fn sequential_merges_equal_later_wins_fold() {
        let a = files(&[("k", "a"), ("only_a", "a")]);
        let b = files(&[("k", "b"), ("only_b", "b")]);
        let c = files(&[("k", "c")]);

        let left = merge_files(merge_files(Some(a.clone()), Some(b.clone())), Some(c.clone()));
        let right = merge_files(Some(a), merge_files(Some(b), Some(c)));
        assert_eq!(left, right);
        assert_eq!(left.unwrap()["k"], "c");
    }

    #[test]
    fn apply_merges_files_replaces_todos_appends_messages() {
        let mut state = AgentState::from_prompt("hi");
        state.files = files(&[("a", "1")]);
        state.todos = vec![Todo::new("old", TodoStatus::Pending)];

        state.apply(
            StateUpdate::default()
                .with_file("b", "2")
                .with_todos(vec![Todo::new("new", TodoStatus::Completed)])
                .with_message(Message::assistant("ok")),
        );

        assert_eq!(state.files, files(&[("a", "1"), ("b", "2")]));
        assert_eq!(state.todos, vec![Todo::new("new", TodoStatus::Completed)]);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.last_message_text(), "ok");
    }

    #[test]
    fn apply_empty_update_changes_nothing() {
        let mut state = AgentState::from_prompt("hi");
        state.todos = vec![Todo::new("t", TodoStatus::InProgress)];
        let before = state.clone();
        let update = StateUpdate::default();
        assert!(update.is_empty());
        state.apply(update);
        assert_eq!(state, before);
    }

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&Todo::new("x", TodoStatus::InProgress)).unwrap();
        assert_eq!(json, r#"{"content":"x","status":"in_progress"}"#);
        let bad: Result<Todo, _> = serde_json::from_str(r#"{"content":"x","status":"blocked"}"#);
        assert!(bad.is_err());
    }
}
