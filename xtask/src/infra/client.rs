//! AWS SDK client setup (Imperative Shell).

use super::error::{InfraError, Result};
use aws_sdk_dynamodb::types::{PointInTimeRecoveryStatus, StreamViewType as SdkStreamViewType};
use aws_sdk_dynamodb::Client;
use todosearch_core::schema::{StreamViewType, TableState, TableStatus};
use tracing::debug;

/// AWS client configuration.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok(),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        }
    }
}

impl AwsConfig {
    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Creates a DynamoDB client with the given configuration.
pub async fn create_client(config: &AwsConfig) -> Result<Client> {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Ok(Client::new(&sdk_config))
}

/// Fetches current table state, returns None if table doesn't exist.
pub async fn get_table_state(client: &Client, table_name: &str) -> Result<Option<TableState>> {
    let response = match client.describe_table().table_name(table_name).send().await {
        Ok(response) => response,
        Err(err) => {
            let err_str = err.to_string();
            if err_str.contains("ResourceNotFoundException") || err_str.contains("not found") {
                return Ok(None);
            }
            return Err(InfraError::AwsSdk(err_str));
        }
    };

    let table = response.table().ok_or_else(|| InfraError::TableNotFound {
        table_name: table_name.to_string(),
    })?;

    let status = match table.table_status() {
        Some(aws_sdk_dynamodb::types::TableStatus::Active) => TableStatus::Active,
        Some(aws_sdk_dynamodb::types::TableStatus::Creating) => TableStatus::Creating,
        Some(aws_sdk_dynamodb::types::TableStatus::Updating) => TableStatus::Updating,
        Some(aws_sdk_dynamodb::types::TableStatus::Deleting) => TableStatus::Deleting,
        _ => TableStatus::Active,
    };

    let stream = table
        .stream_specification()
        .filter(|spec| spec.stream_enabled())
        .and_then(|spec| spec.stream_view_type())
        .and_then(from_sdk_view);

    let point_in_time_recovery = get_point_in_time_recovery(client, table_name).await?;

    debug!(
        table = table_name,
        ?status,
        point_in_time_recovery,
        ?stream,
        "Observed table state"
    );

    Ok(Some(TableState {
        status,
        point_in_time_recovery,
        stream,
    }))
}

async fn get_point_in_time_recovery(client: &Client, table_name: &str) -> Result<bool> {
    let response = client
        .describe_continuous_backups()
        .table_name(table_name)
        .send()
        .await
        .map_err(|e| InfraError::AwsSdk(e.to_string()))?;

    Ok(response
        .continuous_backups_description()
        .and_then(|d| d.point_in_time_recovery_description())
        .and_then(|d| d.point_in_time_recovery_status())
        .is_some_and(|s| *s == PointInTimeRecoveryStatus::Enabled))
}

fn from_sdk_view(view: &SdkStreamViewType) -> Option<StreamViewType> {
    match view {
        SdkStreamViewType::KeysOnly => Some(StreamViewType::KeysOnly),
        SdkStreamViewType::NewImage => Some(StreamViewType::NewImage),
        SdkStreamViewType::OldImage => Some(StreamViewType::OldImage),
        SdkStreamViewType::NewAndOldImages => Some(StreamViewType::NewAndOldImages),
        _ => None,
    }
}

pub(super) fn to_sdk_view(view: StreamViewType) -> SdkStreamViewType {
    match view {
        StreamViewType::KeysOnly => SdkStreamViewType::KeysOnly,
        StreamViewType::NewImage => SdkStreamViewType::NewImage,
        StreamViewType::OldImage => SdkStreamViewType::OldImage,
        StreamViewType::NewAndOldImages => SdkStreamViewType::NewAndOldImages,
    }
}
