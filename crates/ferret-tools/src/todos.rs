use serde_json::Value;
use thiserror::Error;

use crate::state::Todo;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Error: todo list must be an array, got {0}")]
    NotAnArray(&'static str),
    #[error("Error: invalid todo at position {position}: {source}")]
    InvalidItem {
        position: usize,
        #[source]
        source: serde_json::Error,
    },
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Validate a model-supplied todo list.  Any item with an unknown status or
/// missing field rejects the whole list.
pub fn parse_todos(value: &Value) -> Result<Vec<Todo>, TodoError> {
    let items = value.as_array().ok_or(TodoError::NotAnArray(kind_of(value)))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item.clone())
                .map_err(|source| TodoError::InvalidItem { position: i + 1, source })
        })
        .collect()
}

pub fn render_todos(todos: &[Todo]) -> String {
    if todos.is_empty() {
        return "No todos currently in the list.".to_string();
    }
    let mut out = String::from("Current TODO List:");
    for (i, t) in todos.iter().enumerate() {
        out.push_str(&format!("\n{}. {} {} ({})", i + 1, t.status.marker(), t.content, t.status));
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::TodoStatus;

    #[test]
    fn render_empty() {
        assert_eq!(render_todos(&[]), "No todos currently in the list.");
    }

    #[test]
    fn render_numbered_with_markers() {
        let todos = vec![
            Todo::new("a", TodoStatus::Pending),
            Todo::new("b", TodoStatus::InProgress),
            Todo::new("c", TodoStatus::Completed),
        ];
        assert_eq!(
            render_todos(&todos),
            "Current TODO List:\n1. ⏳ a (pending)\n2. 🔄 b (in_progress)\n3. ✅ c (completed)"
        );
    }

    #[test]
    fn parse_keeps_order_and_ignores_extra_fields() {
        let todos = parse_todos(&json!([
            {"content": "first", "status": "completed", "id": "1"},
            {"content": "second", "status": "pending"}
        ]))
        .unwrap();
        assert_eq!(todos[0], Todo::new("first", TodoStatus::Completed));
        assert_eq!(todos[1].status, TodoStatus::Pending);
    }

    #[test]
    fn parse_rejects_unknown_status() {
        let err = parse_todos(&json!([
            {"content": "ok", "status": "pending"},
            {"content": "bad", "status": "cancelled"}
        ]))
        .unwrap_err();
        assert!(matches!(err, TodoError::InvalidItem { position: 2, .. }));
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn parse_rejects_non_array() {
        let err = parse_todos(&json!({"content": "x"})).unwrap_err();
        assert_eq!(err.to_string(), "Error: todo list must be an array, got an object");
    }
}
