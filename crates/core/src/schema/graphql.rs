//! GraphQL SDL rendering of the data API (Functional Core).

use std::fmt::Write;

use super::types::{ModelOperation, ModelType, OperationKind, Schema};

/// Renders the GraphQL schema of the data API.
///
/// Output is deterministic: models, enums and queries appear in declaration
/// order, so rendering the same schema twice yields identical text.
pub fn render_graphql_schema(schema: &Schema) -> String {
    let mut out = String::new();

    for model in &schema.models {
        render_model_type(&mut out, model);
    }

    for enum_type in &schema.enums {
        let _ = writeln!(out, "enum {} {{", enum_type.name);
        for value in &enum_type.values {
            let _ = writeln!(out, "  {}", value);
        }
        out.push_str("}\n\n");
    }

    for model in &schema.models {
        if model.allows(ModelOperation::Create) {
            render_input(&mut out, &format!("Create{}Input", model.name), model, false);
        }
        if model.allows(ModelOperation::Update) {
            render_input(&mut out, &format!("Update{}Input", model.name), model, true);
        }
        if model.allows(ModelOperation::Delete) {
            let _ = writeln!(out, "input Delete{}Input {{\n  id: ID!\n}}\n", model.name);
        }
        if model.allows(ModelOperation::Read) {
            let _ = writeln!(
                out,
                "type Model{name}Connection {{\n  items: [{name}]!\n  nextToken: String\n}}\n",
                name = model.name
            );
        }
    }

    let operations = schema.api_surface();

    out.push_str("type Query {\n");
    for op in operations.iter().filter(|op| op.kind == OperationKind::Query) {
        let line = if let Some(query) = schema.queries.iter().find(|q| q.name == op.name) {
            let args = query
                .arguments
                .iter()
                .map(|a| format!("{}: {}", a.name, a.field_type.graphql_name()))
                .collect::<Vec<_>>()
                .join(", ");
            let directives = query
                .authorization
                .iter()
                .map(|rule| rule.directive())
                .collect::<Vec<_>>()
                .join(" ");
            format!("{}({}): [{}] {}", query.name, args, query.returns, directives)
        } else if op.name.starts_with("list") {
            format!(
                "{}(limit: Int, nextToken: String): Model{}Connection",
                op.name, op.model
            )
        } else {
            format!("{}(id: ID!): {}", op.name, op.model)
        };
        let _ = writeln!(out, "  {}", line.trim_end());
    }
    out.push_str("}\n");

    let mutations: Vec<_> = operations
        .iter()
        .filter(|op| op.kind == OperationKind::Mutation)
        .collect();
    if !mutations.is_empty() {
        out.push_str("\ntype Mutation {\n");
        for op in mutations {
            let verb = op.name.strip_suffix(op.model.as_str()).unwrap_or(&op.name);
            let input = format!("{}{}Input", capitalize(verb), op.model);
            let _ = writeln!(out, "  {}(input: {}!): {}", op.name, input, op.model);
        }
        out.push_str("}\n");
    }

    out
}

fn render_model_type(out: &mut String, model: &ModelType) {
    let directives = model
        .authorization
        .iter()
        .map(|rule| rule.directive())
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "type {} {} {{", model.name, directives);
    out.push_str("  id: ID!\n");
    for field in &model.fields {
        let _ = writeln!(out, "  {}: {}", field.name, field.field_type.graphql_name());
    }
    out.push_str("  createdAt: AWSDateTime!\n  updatedAt: AWSDateTime!\n}\n\n");
}

fn render_input(out: &mut String, name: &str, model: &ModelType, id_required: bool) {
    let _ = writeln!(out, "input {} {{", name);
    if id_required {
        out.push_str("  id: ID!\n");
    } else {
        out.push_str("  id: ID\n");
    }
    for field in &model.fields {
        let _ = writeln!(out, "  {}: {}", field.name, field.field_type.graphql_name());
    }
    out.push_str("}\n\n");
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::todo_schema;

    #[test]
    fn test_renders_todo_type_with_implicit_fields() {
        let sdl = render_graphql_schema(&todo_schema());
        assert!(sdl.contains(
            "type Todo @aws_api_key {\n  id: ID!\n  content: String\n  done: Boolean\n  priority: Priority\n"
        ));
        assert!(sdl.contains("  createdAt: AWSDateTime!\n  updatedAt: AWSDateTime!\n}"));
    }

    #[test]
    fn test_renders_priority_enum() {
        let sdl = render_graphql_schema(&todo_schema());
        assert!(sdl.contains("enum Priority {\n  low\n  medium\n  high\n}"));
    }

    #[test]
    fn test_renders_queries() {
        let sdl = render_graphql_schema(&todo_schema());
        assert!(sdl.contains("  getTodo(id: ID!): Todo\n"));
        assert!(sdl.contains("  listTodos(limit: Int, nextToken: String): ModelTodoConnection\n"));
        assert!(sdl.contains("  searchTodos(content: String): [Todo] @aws_api_key\n"));
    }

    #[test]
    fn test_renders_mutations_with_inputs() {
        let sdl = render_graphql_schema(&todo_schema());
        assert!(sdl.contains("  createTodo(input: CreateTodoInput!): Todo\n"));
        assert!(sdl.contains("  updateTodo(input: UpdateTodoInput!): Todo\n"));
        assert!(sdl.contains("  deleteTodo(input: DeleteTodoInput!): Todo\n"));
        assert!(sdl.contains("input DeleteTodoInput {\n  id: ID!\n}"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let schema = todo_schema();
        assert_eq!(render_graphql_schema(&schema), render_graphql_schema(&schema));
    }
}
