use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::{Result, SchemaError};

/// Fields every model carries without declaring them.
pub const IMPLICIT_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// The type of a declared model field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Boolean,
    /// Reference to an [`EnumType`] by name.
    Enum(String),
}

impl FieldType {
    /// GraphQL scalar or enum name for this field.
    pub fn graphql_name(&self) -> &str {
        match self {
            FieldType::String => "String",
            FieldType::Boolean => "Boolean",
            FieldType::Enum(name) => name.as_str(),
        }
    }
}

/// A single model field. Declared fields are always optional in the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A closed set of string values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Model operations an authorization rule can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelOperation {
    Create,
    Read,
    Update,
    Delete,
}

impl ModelOperation {
    pub const ALL: [ModelOperation; 4] = [
        ModelOperation::Create,
        ModelOperation::Read,
        ModelOperation::Update,
        ModelOperation::Delete,
    ];
}

/// Declarative authorization rule attached to a model or query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthRule {
    /// Any caller presenting a valid API key.
    PublicApiKey { operations: Vec<ModelOperation> },
}

impl AuthRule {
    /// API key access to every model operation.
    pub fn public_api_key() -> Self {
        AuthRule::PublicApiKey {
            operations: ModelOperation::ALL.to_vec(),
        }
    }

    pub fn allows(&self, operation: ModelOperation) -> bool {
        match self {
            AuthRule::PublicApiKey { operations } => operations.contains(&operation),
        }
    }

    /// GraphQL directive for this rule.
    pub fn directive(&self) -> &'static str {
        match self {
            AuthRule::PublicApiKey { .. } => "@aws_api_key",
        }
    }
}

/// A record type backed by its own table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelType {
    pub name: String,
    pub fields: Vec<Field>,
    pub authorization: Vec<AuthRule>,
}

impl ModelType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            authorization: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &str, field_type: FieldType) -> Self {
        self.fields.push(Field::new(name, field_type));
        self
    }

    pub fn with_auth(mut self, rule: AuthRule) -> Self {
        self.authorization.push(rule);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if any rule grants `operation`.
    pub fn allows(&self, operation: ModelOperation) -> bool {
        self.authorization.iter().any(|rule| rule.allows(operation))
    }
}

/// Argument of a custom query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryArgument {
    pub name: String,
    pub field_type: FieldType,
}

/// Where a custom query is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryHandler {
    /// Name of the data source the resolver runs against.
    pub data_source: String,
    /// Resolver code entry point.
    pub entry: String,
}

/// A query backed by a custom resolver rather than a generated one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomQuery {
    pub name: String,
    pub arguments: Vec<QueryArgument>,
    /// Name of the model returned as a list.
    pub returns: String,
    pub authorization: Vec<AuthRule>,
    pub handler: QueryHandler,
}

/// Default and API-key authorization settings of the data API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationModes {
    pub default_mode: AuthorizationMode,
    pub api_key_expires_in_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationMode {
    ApiKey,
}

impl Default for AuthorizationModes {
    fn default() -> Self {
        Self {
            default_mode: AuthorizationMode::ApiKey,
            api_key_expires_in_days: 30,
        }
    }
}

/// A complete data API declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub models: Vec<ModelType>,
    pub enums: Vec<EnumType>,
    pub queries: Vec<CustomQuery>,
    pub authorization_modes: AuthorizationModes,
}

/// Kind of an API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// One operation of the generated API surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOperation {
    pub name: String,
    pub kind: OperationKind,
    /// Model this operation reads or writes.
    pub model: String,
    /// Name of the custom resolver's data source, if not generated.
    pub data_source: Option<String>,
}

impl Schema {
    pub fn model(&self, name: &str) -> Option<&ModelType> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Checks the declaration for mistakes that would otherwise surface at deploy time.
    pub fn validate(&self) -> Result<()> {
        if !(1..=365).contains(&self.authorization_modes.api_key_expires_in_days) {
            return Err(SchemaError::InvalidApiKeyExpiry(
                self.authorization_modes.api_key_expires_in_days,
            ));
        }

        let mut type_names = HashSet::new();
        let all_names = self
            .models
            .iter()
            .map(|m| &m.name)
            .chain(self.enums.iter().map(|e| &e.name))
            .chain(self.queries.iter().map(|q| &q.name));
        for name in all_names {
            validate_identifier(name)?;
            if !type_names.insert(name.as_str()) {
                return Err(SchemaError::DuplicateType(name.clone()));
            }
        }

        for enum_type in &self.enums {
            if enum_type.values.is_empty() {
                return Err(SchemaError::EmptyEnum(enum_type.name.clone()));
            }
            let mut seen = HashSet::new();
            for value in &enum_type.values {
                validate_identifier(value)?;
                if !seen.insert(value.as_str()) {
                    return Err(SchemaError::DuplicateEnumValue {
                        enum_name: enum_type.name.clone(),
                        value: value.clone(),
                    });
                }
            }
        }

        for model in &self.models {
            self.validate_model(model)?;
        }

        for query in &self.queries {
            if self.model(&query.returns).is_none() {
                return Err(SchemaError::UnknownModel {
                    query: query.name.clone(),
                    model: query.returns.clone(),
                });
            }
            if query.authorization.is_empty() {
                return Err(SchemaError::MissingAuthorization(query.name.clone()));
            }
            for argument in &query.arguments {
                validate_identifier(&argument.name)?;
                self.check_field_type(&query.name, &argument.field_type)?;
            }
        }

        Ok(())
    }

    fn validate_model(&self, model: &ModelType) -> Result<()> {
        if model.authorization.is_empty() {
            return Err(SchemaError::MissingAuthorization(model.name.clone()));
        }

        let mut seen = HashSet::new();
        for field in &model.fields {
            validate_identifier(&field.name)?;
            if IMPLICIT_FIELDS.contains(&field.name.as_str()) {
                return Err(SchemaError::ReservedField {
                    model: model.name.clone(),
                    field: field.name.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    model: model.name.clone(),
                    field: field.name.clone(),
                });
            }
            self.check_field_type(&model.name, &field.field_type)?;
        }
        Ok(())
    }

    fn check_field_type(&self, owner: &str, field_type: &FieldType) -> Result<()> {
        if let FieldType::Enum(enum_name) = field_type {
            if self.enum_type(enum_name).is_none() {
                return Err(SchemaError::UnknownEnum {
                    model: owner.to_string(),
                    enum_name: enum_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// The operations exposed by the data API: generated CRUD per model plus
    /// every custom query.
    pub fn api_surface(&self) -> Vec<ApiOperation> {
        let mut operations = Vec::new();

        for model in &self.models {
            let generated = [
                (format!("get{}", model.name), OperationKind::Query, ModelOperation::Read),
                (format!("list{}s", model.name), OperationKind::Query, ModelOperation::Read),
                (format!("create{}", model.name), OperationKind::Mutation, ModelOperation::Create),
                (format!("update{}", model.name), OperationKind::Mutation, ModelOperation::Update),
                (format!("delete{}", model.name), OperationKind::Mutation, ModelOperation::Delete),
            ];
            for (name, kind, required) in generated {
                if model.allows(required) {
                    operations.push(ApiOperation {
                        name,
                        kind,
                        model: model.name.clone(),
                        data_source: None,
                    });
                }
            }
        }

        for query in &self.queries {
            operations.push(ApiOperation {
                name: query.name.clone(),
                kind: OperationKind::Query,
                model: query.returns.clone(),
                data_source: Some(query.handler.data_source.clone()),
            });
        }

        operations
    }
}

fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_string()))
    }
}

/// Name of the search data source the custom query resolves against.
pub const SEARCH_DATA_SOURCE: &str = "osDataSource";

/// The Todo model: content, done flag and a bounded priority.
pub fn todo_model() -> ModelType {
    ModelType::new("Todo")
        .with_field("content", FieldType::String)
        .with_field("done", FieldType::Boolean)
        .with_field("priority", FieldType::Enum("Priority".to_string()))
        .with_auth(AuthRule::public_api_key())
}

/// Returns the canonical schema: the Todo model plus its full-text search query.
/// This is a pure function - no I/O.
pub fn todo_schema() -> Schema {
    Schema {
        models: vec![todo_model()],
        enums: vec![EnumType::new("Priority", &["low", "medium", "high"])],
        queries: vec![CustomQuery {
            name: "searchTodos".to_string(),
            arguments: vec![QueryArgument {
                name: "content".to_string(),
                field_type: FieldType::String,
            }],
            returns: "Todo".to_string(),
            authorization: vec![AuthRule::public_api_key()],
            handler: QueryHandler {
                data_source: SEARCH_DATA_SOURCE.to_string(),
                entry: "./searchTodosResolver.js".to_string(),
            },
        }],
        authorization_modes: AuthorizationModes::default(),
    }
}
