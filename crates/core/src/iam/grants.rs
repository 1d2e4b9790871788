//! Pure functions composing the pipeline's permission set (Functional Core).

use serde::Serialize;

use super::error::{PolicyError, Result};
use super::matching::{action_matches, resource_matches};
use super::policy::{Effect, PolicyDocument, PolicyStatement};
use crate::arn::Arn;

pub const SID_RUN_EXPORT: &str = "allowRunExportJob";
pub const SID_CHECK_EXPORT: &str = "allowCheckExportjob";
pub const SID_READ_STREAM: &str = "allowReadFromStream";
pub const SID_EXPORT_OBJECTS: &str = "allowReadAndWriteToS3ForExport";
pub const SID_SEARCH_ACCESS: &str = "allowOpenSearchAccess";

const RUN_EXPORT_ACTIONS: [&str; 3] = [
    "dynamodb:DescribeTable",
    "dynamodb:DescribeContinuousBackups",
    "dynamodb:ExportTableToPointInTime",
];
const CHECK_EXPORT_ACTIONS: [&str; 1] = ["dynamodb:DescribeExport"];
const READ_STREAM_ACTIONS: [&str; 3] = [
    "dynamodb:DescribeStream",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
];
const EXPORT_OBJECT_ACTIONS: [&str; 4] = [
    "s3:GetObject",
    "s3:AbortMultipartUpload",
    "s3:PutObject",
    "s3:PutObjectAcl",
];
const SEARCH_ACTIONS: [&str; 5] = [
    "es:ESHttpGet",
    "es:ESHttpPut",
    "es:ESHttpPost",
    "es:ESHttpDelete",
    "es:DescribeDomain",
];

/// Normalizes an export prefix to `a/b` form and rejects anything that would
/// widen the object grant.
pub fn normalize_export_prefix(prefix: &str) -> Result<String> {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(PolicyError::EmptyExportPrefix);
    }
    if trimmed.contains('*') || trimmed.contains('?') {
        return Err(PolicyError::WildcardExportPrefix(prefix.to_string()));
    }
    Ok(trimmed.to_string())
}

fn run_export_statement(table_arn: &Arn) -> PolicyStatement {
    PolicyStatement::allow(SID_RUN_EXPORT)
        .with_actions(&RUN_EXPORT_ACTIONS)
        .with_resource(table_arn)
}

fn check_export_statement(table_arn: &Arn) -> PolicyStatement {
    PolicyStatement::allow(SID_CHECK_EXPORT)
        .with_actions(&CHECK_EXPORT_ACTIONS)
        .with_resource(table_arn.child("export/*"))
}

fn export_objects_statement(bucket_arn: &Arn, prefix: &str) -> PolicyStatement {
    PolicyStatement::allow(SID_EXPORT_OBJECTS)
        .with_actions(&EXPORT_OBJECT_ACTIONS)
        .with_resource(bucket_arn.child(&format!("{}/*", prefix)))
}

/// Builds the five scoped statements the ingestion pipeline needs:
/// export, export status, stream read, export object read/write and search HTTP.
///
/// Each statement is scoped to the narrowest resource its actions need.
pub fn build_grant_set(
    table_arn: &Arn,
    bucket_arn: &Arn,
    search_resource_arn: &Arn,
    export_path_prefix: &str,
) -> Result<PolicyDocument> {
    table_arn.expect_service("dynamodb")?;
    bucket_arn.expect_service("s3")?;
    search_resource_arn.expect_service("es")?;
    let prefix = normalize_export_prefix(export_path_prefix)?;

    PolicyDocument::new(vec![
        run_export_statement(table_arn),
        check_export_statement(table_arn),
        PolicyStatement::allow(SID_READ_STREAM)
            .with_actions(&READ_STREAM_ACTIONS)
            .with_resource(table_arn.child("stream/*")),
        export_objects_statement(bucket_arn, &prefix),
        PolicyStatement::allow(SID_SEARCH_ACCESS)
            .with_actions(&SEARCH_ACTIONS)
            .with_resource(search_resource_arn)
            .with_resource(search_resource_arn.child("*")),
    ])
}

/// The export-only subset of [`build_grant_set`], for identities that only
/// run snapshot exports.
pub fn build_export_policy(
    table_arn: &Arn,
    bucket_arn: &Arn,
    export_path_prefix: &str,
) -> Result<PolicyDocument> {
    table_arn.expect_service("dynamodb")?;
    bucket_arn.expect_service("s3")?;
    let prefix = normalize_export_prefix(export_path_prefix)?;

    PolicyDocument::new(vec![
        run_export_statement(table_arn),
        check_export_statement(table_arn),
        export_objects_statement(bucket_arn, &prefix),
    ])
}

/// One action the ingestion runtime performs against one concrete resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredGrant {
    pub responsibility: &'static str,
    pub action: String,
    pub resource: String,
}

/// Why a required grant is not usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MissingReason {
    /// No Allow statement covers the action on the resource.
    NotAllowed,
    /// An Allow exists but a Deny statement overrides it.
    ExplicitlyDenied,
}

/// A required grant the policy fails to provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingGrant {
    pub grant: RequiredGrant,
    pub reason: MissingReason,
}

/// Enumerates the (action, resource) pairs the ingestion runtime exercises.
///
/// Sub-resources use representative concrete names (an export id, a stream
/// label, an object key, an index path) so wildcard scopes are actually tested.
pub fn required_grants(
    table_arn: &Arn,
    bucket_arn: &Arn,
    search_resource_arn: &Arn,
    export_path_prefix: &str,
) -> Result<Vec<RequiredGrant>> {
    let prefix = normalize_export_prefix(export_path_prefix)?;

    let export_resource = table_arn.child("export/01700000000000-abcdef12").to_string();
    let stream_resource = table_arn.child("stream/2024-01-01T00:00:00.000").to_string();
    let object_resource = bucket_arn
        .child(&format!("{}/AWSDynamoDB/data/part-00000.json.gz", prefix))
        .to_string();
    let index_resource = search_resource_arn.child("todo/_bulk").to_string();

    let mut grants = Vec::new();
    let mut push = |responsibility: &'static str, actions: &[&str], resource: &str| {
        for action in actions {
            grants.push(RequiredGrant {
                responsibility,
                action: action.to_string(),
                resource: resource.to_string(),
            });
        }
    };

    push("export", &RUN_EXPORT_ACTIONS, &table_arn.to_string());
    push("export-status", &CHECK_EXPORT_ACTIONS, &export_resource);
    push("stream-read", &READ_STREAM_ACTIONS, &stream_resource);
    push("export-objects", &EXPORT_OBJECT_ACTIONS, &object_resource);
    push("search-http", &SEARCH_ACTIONS[..4], &index_resource);
    push("search-domain", &SEARCH_ACTIONS[4..], &search_resource_arn.to_string());

    Ok(grants)
}

/// Compares a policy against the grants the runtime needs and returns every
/// grant the policy does not provide, in the order given.
pub fn diagnose_permissions(
    policy: &PolicyDocument,
    required: &[RequiredGrant],
) -> Vec<MissingGrant> {
    let covers = |statement: &PolicyStatement, grant: &RequiredGrant| {
        statement
            .actions
            .iter()
            .any(|pattern| action_matches(pattern, &grant.action))
            && statement
                .resources
                .iter()
                .any(|pattern| resource_matches(pattern, &grant.resource))
    };

    required
        .iter()
        .filter_map(|grant| {
            let denied = policy
                .statements
                .iter()
                .any(|s| s.effect == Effect::Deny && covers(s, grant));
            let allowed = policy
                .statements
                .iter()
                .any(|s| s.effect == Effect::Allow && covers(s, grant));

            let reason = if denied && allowed {
                MissingReason::ExplicitlyDenied
            } else if !allowed {
                MissingReason::NotAllowed
            } else {
                return None;
            };
            Some(MissingGrant {
                grant: grant.clone(),
                reason,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Arn {
        Arn::dynamodb_table("us-east-1", "123456789012", "Todo")
    }

    fn bucket() -> Arn {
        Arn::s3_bucket("todo-exports")
    }

    fn domain() -> Arn {
        Arn::es_domain("us-east-1", "123456789012", "todo-search")
    }

    fn grant_set() -> PolicyDocument {
        build_grant_set(&table(), &bucket(), &domain(), "exported-data").unwrap()
    }

    #[test]
    fn test_grant_set_has_exactly_five_statements() {
        let doc = grant_set();
        let sids: Vec<_> = doc
            .statements
            .iter()
            .map(|s| s.sid.clone().unwrap())
            .collect();
        assert_eq!(
            sids,
            vec![
                SID_RUN_EXPORT,
                SID_CHECK_EXPORT,
                SID_READ_STREAM,
                SID_EXPORT_OBJECTS,
                SID_SEARCH_ACCESS
            ]
        );
    }

    #[test]
    fn test_no_statement_has_bare_wildcard_resource() {
        for statement in grant_set().statements {
            assert!(!statement.resources.is_empty());
            assert!(statement.resources.iter().all(|r| r != "*"));
            assert_eq!(statement.effect, Effect::Allow);
        }
    }

    #[test]
    fn test_statement_scopes() {
        let doc = grant_set();
        assert_eq!(
            doc.statement(SID_RUN_EXPORT).unwrap().resources,
            vec!["arn:aws:dynamodb:us-east-1:123456789012:table/Todo"]
        );
        assert_eq!(
            doc.statement(SID_CHECK_EXPORT).unwrap().resources,
            vec!["arn:aws:dynamodb:us-east-1:123456789012:table/Todo/export/*"]
        );
        assert_eq!(
            doc.statement(SID_READ_STREAM).unwrap().resources,
            vec!["arn:aws:dynamodb:us-east-1:123456789012:table/Todo/stream/*"]
        );
        assert_eq!(
            doc.statement(SID_EXPORT_OBJECTS).unwrap().resources,
            vec!["arn:aws:s3:::todo-exports/exported-data/*"]
        );
        assert_eq!(
            doc.statement(SID_SEARCH_ACCESS).unwrap().resources,
            vec![
                "arn:aws:es:us-east-1:123456789012:domain/todo-search",
                "arn:aws:es:us-east-1:123456789012:domain/todo-search/*"
            ]
        );
    }

    #[test]
    fn test_statement_actions() {
        let doc = grant_set();
        assert_eq!(
            doc.statement(SID_EXPORT_OBJECTS).unwrap().actions,
            vec![
                "s3:GetObject",
                "s3:AbortMultipartUpload",
                "s3:PutObject",
                "s3:PutObjectAcl"
            ]
        );
        assert_eq!(doc.statement(SID_SEARCH_ACCESS).unwrap().actions.len(), 5);
    }

    #[test]
    fn test_grant_set_is_deterministic() {
        assert_eq!(
            grant_set().to_json().unwrap(),
            grant_set().to_json().unwrap()
        );
    }

    #[test]
    fn test_wrong_service_arns_are_rejected() {
        let err = build_grant_set(&bucket(), &bucket(), &domain(), "x").unwrap_err();
        assert!(matches!(err, PolicyError::Arn(_)));
        let err = build_grant_set(&table(), &bucket(), &table(), "x").unwrap_err();
        assert!(matches!(err, PolicyError::Arn(_)));
    }

    #[test]
    fn test_export_prefix_normalization() {
        assert_eq!(normalize_export_prefix("/Todo/").unwrap(), "Todo");
        assert_eq!(
            normalize_export_prefix(" / "),
            Err(PolicyError::EmptyExportPrefix)
        );
        assert_eq!(
            normalize_export_prefix("*"),
            Err(PolicyError::WildcardExportPrefix("*".to_string()))
        );
    }

    #[test]
    fn test_export_policy_subset() {
        let doc = build_export_policy(&table(), &bucket(), "exported-data").unwrap();
        let sids: Vec<_> = doc.statements.iter().map(|s| s.sid.clone().unwrap()).collect();
        assert_eq!(sids, vec![SID_RUN_EXPORT, SID_CHECK_EXPORT, SID_EXPORT_OBJECTS]);
    }

    #[test]
    fn test_grant_set_covers_every_required_grant() {
        let required = required_grants(&table(), &bucket(), &domain(), "exported-data").unwrap();
        assert_eq!(required.len(), 16);
        assert!(diagnose_permissions(&grant_set(), &required).is_empty());
    }

    #[test]
    fn test_diagnose_reports_missing_stream_grant() {
        let mut doc = grant_set();
        doc.statements.retain(|s| s.sid.as_deref() != Some(SID_READ_STREAM));
        let required = required_grants(&table(), &bucket(), &domain(), "exported-data").unwrap();
        let missing = diagnose_permissions(&doc, &required);
        assert_eq!(missing.len(), 3);
        assert!(missing.iter().all(|m| m.grant.responsibility == "stream-read"
            && m.reason == MissingReason::NotAllowed));
    }

    #[test]
    fn test_diagnose_reports_prefix_mismatch() {
        let doc = build_grant_set(&table(), &bucket(), &domain(), "other-prefix").unwrap();
        let required = required_grants(&table(), &bucket(), &domain(), "exported-data").unwrap();
        let missing = diagnose_permissions(&doc, &required);
        assert_eq!(missing.len(), 4);
        assert!(missing
            .iter()
            .all(|m| m.grant.responsibility == "export-objects"));
    }

    #[test]
    fn test_diagnose_reports_explicit_deny() {
        let mut doc = grant_set();
        doc.statements.push(PolicyStatement {
            sid: None,
            effect: Effect::Deny,
            actions: vec!["es:ESHttpDelete".to_string()],
            resources: vec!["*".to_string()],
        });
        let required = required_grants(&table(), &bucket(), &domain(), "exported-data").unwrap();
        let missing = diagnose_permissions(&doc, &required);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].grant.action, "es:ESHttpDelete");
        assert_eq!(missing[0].reason, MissingReason::ExplicitlyDenied);
    }
}
