//! Assumable identity for the ingestion runtime.

use serde::Serialize;
use serde_json::json;

use super::error::{PolicyError, Result};
use super::policy::{PolicyDocument, POLICY_VERSION};
use crate::arn::Arn;

/// Service principal of the managed ingestion runtime.
pub const PIPELINE_SERVICE_PRINCIPAL: &str = "osis-pipelines.amazonaws.com";

/// Name of the inline policy carrying the grant set.
pub const INLINE_POLICY_NAME: &str = "open-search-integration-policy";

/// A role the ingestion runtime assumes, carrying exactly one inline policy.
///
/// No managed policies are attached: the grant set is the whole permission
/// surface of the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRole {
    pub name: String,
    pub description: String,
    pub trusted_service: String,
    pub inline_policy_name: String,
    pub policy: PolicyDocument,
}

impl PipelineRole {
    pub fn new(name: &str, policy: PolicyDocument) -> Result<Self> {
        validate_role_name(name)?;
        Ok(Self {
            name: name.to_string(),
            description: "Role for the table-to-search ingestion pipeline".to_string(),
            trusted_service: PIPELINE_SERVICE_PRINCIPAL.to_string(),
            inline_policy_name: INLINE_POLICY_NAME.to_string(),
            policy,
        })
    }

    pub fn arn(&self, account: &str) -> Arn {
        Arn::iam_role(account, &self.name)
    }

    /// Trust policy allowing the ingestion service to assume this role.
    pub fn assume_role_policy(&self) -> serde_json::Value {
        json!({
            "Version": POLICY_VERSION,
            "Statement": [{
                "Effect": "Allow",
                "Principal": { "Service": self.trusted_service },
                "Action": "sts:AssumeRole"
            }]
        })
    }
}

/// IAM role names: 1..=64 chars of alphanumerics and `+=,.@_-`.
fn validate_role_name(name: &str) -> Result<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "+=,.@_-".contains(c));
    if name.is_empty() || name.len() > 64 || !valid_chars {
        return Err(PolicyError::InvalidRoleName(name.to_string()));
    }
    Ok(())
}
