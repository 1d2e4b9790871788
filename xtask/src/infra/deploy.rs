//! Table deployment operations (Imperative Shell).

use super::client;
use super::error::{InfraError, Result};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType,
    PointInTimeRecoverySpecification, ScalarAttributeType, StreamSpecification,
};
use aws_sdk_dynamodb::Client;
use std::time::Duration;
use todosearch_core::schema::{
    AttributeType, DeployPlan, StreamChange, StreamViewType, TableConfig, TableStatus,
};
use tracing::info;

/// Execute a deploy plan.
pub async fn execute_deploy_plan(client: &Client, plan: &DeployPlan) -> Result<()> {
    match plan {
        DeployPlan::CreateTable { config } => {
            create_table(client, config).await?;
            wait_for_table_active(client, &config.table_name).await?;
            if config.point_in_time_recovery {
                enable_point_in_time_recovery(client, &config.table_name).await?;
            }
        }
        DeployPlan::UpdateTable {
            table_name,
            enable_point_in_time_recovery: enable_pitr,
            set_stream,
        } => {
            if *enable_pitr {
                enable_point_in_time_recovery(client, table_name).await?;
            }
            match set_stream {
                Some(StreamChange::Enable(view)) => {
                    set_stream_view(client, table_name, Some(*view)).await?;
                    wait_for_table_active(client, table_name).await?;
                }
                Some(StreamChange::Replace { to, .. }) => {
                    // The view of an enabled stream can't be changed in place.
                    set_stream_view(client, table_name, None).await?;
                    wait_for_table_active(client, table_name).await?;
                    set_stream_view(client, table_name, Some(*to)).await?;
                    wait_for_table_active(client, table_name).await?;
                }
                None => {}
            }
        }
        DeployPlan::NoChanges { .. } => {
            // Nothing to do
        }
    }
    Ok(())
}

async fn create_table(client: &Client, config: &TableConfig) -> Result<()> {
    let key_schema = KeySchemaElement::builder()
        .attribute_name(&config.partition_key.name)
        .key_type(KeyType::Hash)
        .build()
        .map_err(|e| InfraError::AwsSdk(e.to_string()))?;

    let attribute_definition = AttributeDefinition::builder()
        .attribute_name(&config.partition_key.name)
        .attribute_type(to_scalar_type(&config.partition_key.attribute_type))
        .build()
        .map_err(|e| InfraError::AwsSdk(e.to_string()))?;

    let mut request = client
        .create_table()
        .table_name(&config.table_name)
        .key_schema(key_schema)
        .attribute_definitions(attribute_definition)
        .billing_mode(BillingMode::PayPerRequest);

    if let Some(view) = config.stream {
        request = request.stream_specification(stream_specification(Some(view))?);
    }

    info!(table = %config.table_name, "Creating table");
    request
        .send()
        .await
        .map_err(|e| InfraError::AwsSdk(e.to_string()))?;
    Ok(())
}

async fn enable_point_in_time_recovery(client: &Client, table_name: &str) -> Result<()> {
    let specification = PointInTimeRecoverySpecification::builder()
        .point_in_time_recovery_enabled(true)
        .build()
        .map_err(|e| InfraError::AwsSdk(e.to_string()))?;

    info!(table = table_name, "Enabling point-in-time recovery");
    client
        .update_continuous_backups()
        .table_name(table_name)
        .point_in_time_recovery_specification(specification)
        .send()
        .await
        .map_err(|e| InfraError::AwsSdk(e.to_string()))?;
    Ok(())
}

async fn set_stream_view(
    client: &Client,
    table_name: &str,
    view: Option<StreamViewType>,
) -> Result<()> {
    info!(
        table = table_name,
        view = view.map(|v| v.as_str()).unwrap_or("disabled"),
        "Updating stream"
    );
    client
        .update_table()
        .table_name(table_name)
        .stream_specification(stream_specification(view)?)
        .send()
        .await
        .map_err(|e| InfraError::AwsSdk(e.to_string()))?;
    Ok(())
}

fn stream_specification(view: Option<StreamViewType>) -> Result<StreamSpecification> {
    StreamSpecification::builder()
        .stream_enabled(view.is_some())
        .set_stream_view_type(view.map(client::to_sdk_view))
        .build()
        .map_err(|e| InfraError::AwsSdk(e.to_string()))
}

async fn wait_for_table_active(client: &Client, table_name: &str) -> Result<()> {
    let max_attempts = 60;
    let delay = Duration::from_secs(2);

    for _ in 0..max_attempts {
        if let Some(state) = client::get_table_state(client, table_name).await? {
            if state.status == TableStatus::Active {
                return Ok(());
            }
        }
        tokio::time::sleep(delay).await;
    }

    Err(InfraError::TableActivationTimeout)
}

fn to_scalar_type(attr_type: &AttributeType) -> ScalarAttributeType {
    match attr_type {
        AttributeType::String => ScalarAttributeType::S,
    }
}
