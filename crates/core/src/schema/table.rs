//! Backing table configuration types (Functional Core - pure data).

use serde::{Deserialize, Serialize};

use super::error::TableError;
use super::types::ModelType;

/// Backing table configuration for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub billing_mode: BillingMode,
    pub point_in_time_recovery: bool,
    /// `None` disables the change stream.
    pub stream: Option<StreamViewType>,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

/// DynamoDB attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    String,
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingMode {
    PayPerRequest,
}

/// What each change-stream record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamViewType {
    KeysOnly,
    NewImage,
    OldImage,
    NewAndOldImages,
}

impl StreamViewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamViewType::KeysOnly => "KEYS_ONLY",
            StreamViewType::NewImage => "NEW_IMAGE",
            StreamViewType::OldImage => "OLD_IMAGE",
            StreamViewType::NewAndOldImages => "NEW_AND_OLD_IMAGES",
        }
    }
}

impl TableConfig {
    /// Backing table for `model`: keyed by `id`, on-demand, with point-in-time
    /// recovery and a post-image change stream.
    pub fn for_model(model: &ModelType) -> Self {
        Self {
            table_name: model.name.clone(),
            partition_key: KeyAttribute {
                name: "id".to_string(),
                attribute_type: AttributeType::String,
            },
            billing_mode: BillingMode::PayPerRequest,
            point_in_time_recovery: true,
            stream: Some(StreamViewType::NewImage),
        }
    }

    /// Sets the table name.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    /// Checks the table can feed a change pipeline: the snapshot export needs
    /// point-in-time recovery and the stream must carry full post-images.
    pub fn validate_for_export(&self) -> Result<(), TableError> {
        if !self.point_in_time_recovery {
            return Err(TableError::PointInTimeRecoveryDisabled(
                self.table_name.clone(),
            ));
        }
        match self.stream {
            None => Err(TableError::StreamDisabled(self.table_name.clone())),
            Some(StreamViewType::NewImage) => Ok(()),
            Some(other) => Err(TableError::WrongStreamView {
                table_name: self.table_name.clone(),
                actual: other.as_str(),
            }),
        }
    }

    /// Object-store prefix snapshot exports of this table are written under.
    pub fn export_prefix(&self) -> String {
        format!("{}/", self.table_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::todo_model;

    #[test]
    fn test_table_for_model_enables_recovery_and_stream() {
        let table = TableConfig::for_model(&todo_model());
        assert_eq!(table.table_name, "Todo");
        assert_eq!(table.partition_key.name, "id");
        assert!(table.point_in_time_recovery);
        assert_eq!(table.stream, Some(StreamViewType::NewImage));
        assert_eq!(table.validate_for_export(), Ok(()));
    }

    #[test]
    fn test_recovery_disabled_fails_eagerly() {
        let mut table = TableConfig::for_model(&todo_model());
        table.point_in_time_recovery = false;
        assert_eq!(
            table.validate_for_export(),
            Err(TableError::PointInTimeRecoveryDisabled("Todo".to_string()))
        );
    }

    #[test]
    fn test_missing_stream_fails() {
        let mut table = TableConfig::for_model(&todo_model());
        table.stream = None;
        assert_eq!(
            table.validate_for_export(),
            Err(TableError::StreamDisabled("Todo".to_string()))
        );
    }

    #[test]
    fn test_keys_only_stream_fails() {
        let mut table = TableConfig::for_model(&todo_model());
        table.stream = Some(StreamViewType::KeysOnly);
        assert_eq!(
            table.validate_for_export(),
            Err(TableError::WrongStreamView {
                table_name: "Todo".to_string(),
                actual: "KEYS_ONLY"
            })
        );
    }

    #[test]
    fn test_export_prefix_is_table_name() {
        let table = TableConfig::for_model(&todo_model()).with_table_name("Todo-dev");
        assert_eq!(table.export_prefix(), "Todo-dev/");
    }
}
