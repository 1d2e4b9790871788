//! Policy auditing: flags over-broad or duplicated grants.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::policy::{Effect, PolicyDocument};

/// A defect found in a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PolicyFinding {
    /// A statement grants on every resource (`*`).
    BareWildcardResource { statement: usize },
    /// A resource wildcard covers a whole service or account (e.g. `arn:aws:s3:::*`).
    AccountWideResource { statement: usize, resource: String },
    /// An action wildcard covers a whole service or action family (e.g. `es:ESHttp*`).
    WildcardAction { statement: usize, action: String },
    /// The same statement appears more than once.
    DuplicateStatement { statement: usize, first: usize },
    /// Two statements share a Sid.
    DuplicateSid { sid: String },
}

impl fmt::Display for PolicyFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyFinding::BareWildcardResource { statement } => {
                write!(f, "statement #{} grants on every resource (\"*\")", statement)
            }
            PolicyFinding::AccountWideResource {
                statement,
                resource,
            } => write!(
                f,
                "statement #{} grants on account-wide resource {}",
                statement, resource
            ),
            PolicyFinding::WildcardAction { statement, action } => write!(
                f,
                "statement #{} uses wildcard action {}",
                statement, action
            ),
            PolicyFinding::DuplicateStatement { statement, first } => write!(
                f,
                "statement #{} duplicates statement #{}",
                statement, first
            ),
            PolicyFinding::DuplicateSid { sid } => write!(f, "Sid '{}' is used twice", sid),
        }
    }
}

/// Audits the Allow statements of a policy. Deny statements may be as broad
/// as they like and are only checked for duplication.
pub fn audit_policy(policy: &PolicyDocument) -> Vec<PolicyFinding> {
    let mut findings = Vec::new();
    let mut seen_sids = HashSet::new();

    for (index, statement) in policy.statements.iter().enumerate() {
        if let Some(first) = policy.statements[..index]
            .iter()
            .position(|earlier| earlier == statement)
        {
            findings.push(PolicyFinding::DuplicateStatement {
                statement: index,
                first,
            });
            continue;
        }

        if let Some(sid) = &statement.sid {
            if !seen_sids.insert(sid.as_str()) {
                findings.push(PolicyFinding::DuplicateSid { sid: sid.clone() });
            }
        }

        if statement.effect == Effect::Deny {
            continue;
        }

        for action in &statement.actions {
            if is_wildcard_action(action) {
                findings.push(PolicyFinding::WildcardAction {
                    statement: index,
                    action: action.clone(),
                });
            }
        }

        for resource in &statement.resources {
            if resource.trim() == "*" {
                findings.push(PolicyFinding::BareWildcardResource { statement: index });
            } else if is_account_wide(resource) {
                findings.push(PolicyFinding::AccountWideResource {
                    statement: index,
                    resource: resource.clone(),
                });
            }
        }
    }

    findings
}

fn is_wildcard_action(action: &str) -> bool {
    action.contains('*') || action.contains('?')
}

/// A resource is account-wide when its resource part is nothing but
/// wildcards, or when any ARN component before it is a wildcard.
fn is_account_wide(resource: &str) -> bool {
    let parts: Vec<&str> = resource.splitn(6, ':').collect();
    if parts.len() != 6 {
        return resource.contains('*');
    }
    let wildcard_component = parts[1..5].iter().any(|p| p.contains('*'));
    let resource_part = parts[5];
    let leading = resource_part
        .split('/')
        .next()
        .unwrap_or(resource_part);
    let bare_resource = resource_part.chars().all(|c| c == '*' || c == '/')
        || leading.contains('*');
    wildcard_component || bare_resource
}
