//! IAM policy documents (Functional Core - pure data).

use serde::{Deserialize, Serialize};

use super::error::{PolicyError, Result};

/// IAM policy language version every document is written in.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Whether a statement grants or denies its actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One grant: a set of actions on a set of resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    #[serde(rename = "Action")]
    pub actions: Vec<String>,
    #[serde(rename = "Resource")]
    pub resources: Vec<String>,
}

impl PolicyStatement {
    /// An `Allow` statement with the given Sid.
    pub fn allow(sid: &str) -> Self {
        Self {
            sid: Some(sid.to_string()),
            effect: Effect::Allow,
            actions: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: &[&str]) -> Self {
        self.actions
            .extend(actions.iter().map(|action| action.to_string()));
        self
    }

    pub fn with_resource(mut self, resource: impl ToString) -> Self {
        self.resources.push(resource.to_string());
        self
    }

    fn label(&self) -> String {
        self.sid.clone().unwrap_or_else(|| "<unnamed>".to_string())
    }
}

/// A named collection of statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    #[serde(rename = "Statement")]
    pub statements: Vec<PolicyStatement>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statements: Vec::new(),
        }
    }
}

impl PolicyDocument {
    /// Builds a document, rejecting statements with no actions or resources.
    pub fn new(statements: Vec<PolicyStatement>) -> Result<Self> {
        for statement in &statements {
            if statement.actions.is_empty() {
                return Err(PolicyError::NoActions(statement.label()));
            }
            if statement.resources.is_empty() {
                return Err(PolicyError::NoResources(statement.label()));
            }
        }
        Ok(Self {
            version: POLICY_VERSION.to_string(),
            statements,
        })
    }

    /// Adds a statement unless an identical one is already present, so
    /// re-applying the same grant never duplicates it.
    pub fn merge_statement(&mut self, statement: PolicyStatement) -> bool {
        if self.statements.contains(&statement) {
            return false;
        }
        self.statements.push(statement);
        true
    }

    pub fn statement(&self, sid: &str) -> Option<&PolicyStatement> {
        self.statements
            .iter()
            .find(|s| s.sid.as_deref() == Some(sid))
    }

    /// Pretty IAM JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement() -> PolicyStatement {
        PolicyStatement::allow("allowRead")
            .with_actions(&["s3:GetObject"])
            .with_resource("arn:aws:s3:::bucket/prefix/*")
    }

    #[test]
    fn test_serializes_iam_json_shape() {
        let doc = PolicyDocument::new(vec![statement()]).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Sid": "allowRead",
                    "Effect": "Allow",
                    "Action": ["s3:GetObject"],
                    "Resource": ["arn:aws:s3:::bucket/prefix/*"]
                }]
            })
        );
    }

    #[test]
    fn test_statement_without_sid_omits_field() {
        let mut s = statement();
        s.sid = None;
        let value = serde_json::to_value(&s).unwrap();
        assert!(value.get("Sid").is_none());
    }

    #[test]
    fn test_deserializes_iam_json() {
        let json = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Deny","Action":["es:*"],"Resource":["*"]}]}"#;
        let doc: PolicyDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.statements[0].effect, Effect::Deny);
        assert_eq!(doc.statements[0].sid, None);
    }

    #[test]
    fn test_rejects_empty_actions_and_resources() {
        let no_actions = PolicyStatement::allow("a").with_resource("arn:aws:s3:::b");
        assert_eq!(
            PolicyDocument::new(vec![no_actions]),
            Err(PolicyError::NoActions("a".to_string()))
        );
        let no_resources = PolicyStatement::allow("b").with_actions(&["s3:GetObject"]);
        assert_eq!(
            PolicyDocument::new(vec![no_resources]),
            Err(PolicyError::NoResources("b".to_string()))
        );
    }

    #[test]
    fn test_merge_statement_is_idempotent() {
        let mut doc = PolicyDocument::default();
        assert!(doc.merge_statement(statement()));
        assert!(!doc.merge_statement(statement()));
        assert_eq!(doc.statements.len(), 1);
    }
}
