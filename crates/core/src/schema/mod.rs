//! Data API schema and backing table declaration.

mod error;
mod graphql;
mod planning;
mod table;
mod types;

pub use error::{Result, SchemaError, TableError};
pub use graphql::render_graphql_schema;
pub use planning::{
    calculate_deploy_plan, format_deploy_plan, DeployPlan, StreamChange, TableState, TableStatus,
};
pub use table::{AttributeType, BillingMode, KeyAttribute, StreamViewType, TableConfig};
pub use types::{
    todo_model, todo_schema, ApiOperation, AuthRule, AuthorizationMode, AuthorizationModes,
    CustomQuery, EnumType, Field, FieldType, ModelOperation, ModelType, OperationKind,
    QueryArgument, QueryHandler, Schema, IMPLICIT_FIELDS, SEARCH_DATA_SOURCE,
};
