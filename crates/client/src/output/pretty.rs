//! Pretty output formatting.

use todosearch_core::search::{Priority, Todo};

use crate::client::health::{ClusterHealth, IndexStatus};

fn priority_label(priority: Option<Priority>) -> &'static str {
    match priority {
        Some(Priority::Low) => "low",
        Some(Priority::Medium) => "medium",
        Some(Priority::High) => "high",
        None => "-",
    }
}

/// Format a todo for display.
pub fn format_todo(todo: &Todo) -> String {
    let mark = if todo.done.unwrap_or(false) { "x" } else { " " };
    let mut output = format!(
        "[{}] {} ({})\n  ID: {}",
        mark,
        todo.content.as_deref().unwrap_or(""),
        priority_label(todo.priority),
        todo.id
    );
    if let Some(updated) = &todo.updated_at {
        output.push_str(&format!("\n  Updated: {}", updated));
    }
    output
}

/// Format todos for display.
pub fn format_todos(todos: &[Todo]) -> String {
    if todos.is_empty() {
        return "No todos found.".to_string();
    }
    let mut output = format!("TODOS ({})\n", todos.len());
    output.push_str(&"-".repeat(40));
    for todo in todos {
        output.push_str(&format!("\n{}", format_todo(todo)));
        output.push('\n');
    }
    output
}

/// Format cluster health for display.
pub fn format_cluster_health(health: &ClusterHealth) -> String {
    format!(
        "Cluster Health:\n  Name: {}\n  Status: {}\n  Nodes: {}\n  Active shards: {}",
        health.cluster_name, health.status, health.number_of_nodes, health.active_shards
    )
}

/// Format index status for display.
pub fn format_index_status(status: &IndexStatus) -> String {
    let state = if status.exists { "present" } else { "missing" };
    format!("Index {}: {}", status.index, state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: &str, done: Option<bool>, priority: Option<Priority>) -> Todo {
        Todo {
            id: id.to_string(),
            content: Some("buy milk".to_string()),
            done,
            priority,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_format_todo() {
        assert_eq!(
            format_todo(&todo("a", Some(true), Some(Priority::High))),
            "[x] buy milk (high)\n  ID: a"
        );
        assert_eq!(format_todo(&todo("b", None, None)), "[ ] buy milk (-)\n  ID: b");
    }

    #[test]
    fn test_format_empty_todos() {
        assert_eq!(format_todos(&[]), "No todos found.");
    }

    #[test]
    fn test_format_todos_header() {
        let output = format_todos(&[todo("a", None, None), todo("b", None, None)]);
        assert!(output.starts_with("TODOS (2)\n"));
        assert!(output.contains("ID: a"));
        assert!(output.contains("ID: b"));
    }

    #[test]
    fn test_format_index_status() {
        let status = IndexStatus {
            index: "todo".to_string(),
            exists: false,
        };
        assert_eq!(format_index_status(&status), "Index todo: missing");
    }
}
