//! Pure functions for calculating table deployment plans (Functional Core).

use super::table::{StreamViewType, TableConfig};

/// Represents the observed state of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub status: TableStatus,
    pub point_in_time_recovery: bool,
    pub stream: Option<StreamViewType>,
}

/// Table status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
}

/// Planned changes for deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployPlan {
    /// Table doesn't exist, needs to be created.
    CreateTable { config: TableConfig },
    /// Table exists but is missing recovery or the change stream.
    UpdateTable {
        table_name: String,
        enable_point_in_time_recovery: bool,
        /// Stream view to switch on. DynamoDB can't change the view of an
        /// enabled stream in place, so a wrong view is replaced.
        set_stream: Option<StreamChange>,
    },
    /// Table is up to date, no changes needed.
    NoChanges { table_name: String },
}

/// How the change stream must change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamChange {
    Enable(StreamViewType),
    Replace {
        from: StreamViewType,
        to: StreamViewType,
    },
}

/// Pure function: Calculate what changes are needed to reach desired state.
///
/// Applying the plan and recalculating against the new state yields
/// [`DeployPlan::NoChanges`].
pub fn calculate_deploy_plan(current: Option<&TableState>, desired: &TableConfig) -> DeployPlan {
    let Some(state) = current else {
        return DeployPlan::CreateTable {
            config: desired.clone(),
        };
    };

    let enable_point_in_time_recovery =
        desired.point_in_time_recovery && !state.point_in_time_recovery;

    let set_stream = match (state.stream, desired.stream) {
        (None, Some(to)) => Some(StreamChange::Enable(to)),
        (Some(from), Some(to)) if from != to => Some(StreamChange::Replace { from, to }),
        _ => None,
    };

    if !enable_point_in_time_recovery && set_stream.is_none() {
        DeployPlan::NoChanges {
            table_name: desired.table_name.clone(),
        }
    } else {
        DeployPlan::UpdateTable {
            table_name: desired.table_name.clone(),
            enable_point_in_time_recovery,
            set_stream,
        }
    }
}

/// Pure function: Format a deploy plan for display.
pub fn format_deploy_plan(plan: &DeployPlan) -> Vec<String> {
    match plan {
        DeployPlan::CreateTable { config } => {
            let mut lines = vec![
                format!("+ Create table: {}", config.table_name),
                format!("  Partition key: {} (S)", config.partition_key.name),
                "  Billing: PAY_PER_REQUEST".to_string(),
            ];
            if config.point_in_time_recovery {
                lines.push("  + Point-in-time recovery".to_string());
            }
            if let Some(view) = config.stream {
                lines.push(format!("  + Stream: {}", view.as_str()));
            }
            lines
        }
        DeployPlan::UpdateTable {
            table_name,
            enable_point_in_time_recovery,
            set_stream,
        } => {
            let mut lines = vec![format!("~ Update table: {}", table_name)];
            if *enable_point_in_time_recovery {
                lines.push("  + Enable point-in-time recovery".to_string());
            }
            match set_stream {
                Some(StreamChange::Enable(view)) => {
                    lines.push(format!("  + Enable stream: {}", view.as_str()))
                }
                Some(StreamChange::Replace { from, to }) => lines.push(format!(
                    "  ~ Replace stream: {} -> {}",
                    from.as_str(),
                    to.as_str()
                )),
                None => {}
            }
            lines
        }
        DeployPlan::NoChanges { table_name } => {
            vec![format!("= Table '{}' is up to date", table_name)]
        }
    }
}
