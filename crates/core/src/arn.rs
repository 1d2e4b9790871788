//! Amazon Resource Names (Functional Core - pure data).
//!
//! Grants and pipeline references point at resources through typed ARNs,
//! so an unresolved resource fails at configuration time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing or building an ARN.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArnError {
    #[error("ARN is empty")]
    Empty,
    #[error("Malformed ARN '{0}': expected arn:partition:service:region:account:resource")]
    Malformed(String),
    #[error("ARN '{arn}' has an empty {component}")]
    EmptyComponent {
        arn: String,
        component: &'static str,
    },
    #[error("Expected a {expected} ARN, got service '{actual}' in '{arn}'")]
    WrongService {
        arn: String,
        expected: &'static str,
        actual: String,
    },
}

/// A parsed Amazon Resource Name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account: String,
    pub resource: String,
}

impl Arn {
    /// ARN of a DynamoDB table.
    pub fn dynamodb_table(region: &str, account: &str, table_name: &str) -> Self {
        Self {
            partition: "aws".to_string(),
            service: "dynamodb".to_string(),
            region: region.to_string(),
            account: account.to_string(),
            resource: format!("table/{}", table_name),
        }
    }

    /// ARN of an S3 bucket. Buckets are global, so region and account are empty.
    pub fn s3_bucket(bucket_name: &str) -> Self {
        Self {
            partition: "aws".to_string(),
            service: "s3".to_string(),
            region: String::new(),
            account: String::new(),
            resource: bucket_name.to_string(),
        }
    }

    /// ARN of an OpenSearch Service domain.
    pub fn es_domain(region: &str, account: &str, domain_name: &str) -> Self {
        Self {
            partition: "aws".to_string(),
            service: "es".to_string(),
            region: region.to_string(),
            account: account.to_string(),
            resource: format!("domain/{}", domain_name),
        }
    }

    /// ARN of an IAM role. IAM is global, so region is empty.
    pub fn iam_role(account: &str, role_name: &str) -> Self {
        Self {
            partition: "aws".to_string(),
            service: "iam".to_string(),
            region: String::new(),
            account: account.to_string(),
            resource: format!("role/{}", role_name),
        }
    }

    /// Returns a sub-resource ARN, e.g. `table/Todo` + `stream/*`.
    pub fn child(&self, suffix: &str) -> Self {
        let mut child = self.clone();
        child.resource = format!(
            "{}/{}",
            self.resource.trim_end_matches('/'),
            suffix.trim_start_matches('/')
        );
        child
    }

    /// Fails unless this ARN belongs to `service`.
    pub fn expect_service(&self, service: &'static str) -> Result<&Self, ArnError> {
        if self.service == service {
            Ok(self)
        } else {
            Err(ArnError::WrongService {
                arn: self.to_string(),
                expected: service,
                actual: self.service.clone(),
            })
        }
    }

    /// The last path segment of the resource (table name, bucket name, ...).
    pub fn resource_name(&self) -> &str {
        self.resource
            .rsplit('/')
            .next()
            .unwrap_or(self.resource.as_str())
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ArnError::Empty);
        }

        // The resource part may itself contain ':' (e.g. log groups), so split at most 6 times.
        let parts: Vec<&str> = s.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" {
            return Err(ArnError::Malformed(s.to_string()));
        }

        let non_empty = |value: &str, component: &'static str| {
            if value.is_empty() {
                Err(ArnError::EmptyComponent {
                    arn: s.to_string(),
                    component,
                })
            } else {
                Ok(value.to_string())
            }
        };

        Ok(Self {
            partition: non_empty(parts[1], "partition")?,
            service: non_empty(parts[2], "service")?,
            region: parts[3].to_string(),
            account: parts[4].to_string(),
            resource: non_empty(parts[5], "resource")?,
        })
    }
}

impl Serialize for Arn {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Arn {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dynamodb_table_arn() {
        let arn: Arn = "arn:aws:dynamodb:us-east-1:123456789012:table/Todo"
            .parse()
            .unwrap();
        assert_eq!(arn.partition, "aws");
        assert_eq!(arn.service, "dynamodb");
        assert_eq!(arn.region, "us-east-1");
        assert_eq!(arn.account, "123456789012");
        assert_eq!(arn.resource, "table/Todo");
        assert_eq!(arn.resource_name(), "Todo");
    }

    #[test]
    fn test_parse_s3_bucket_arn_has_empty_region_and_account() {
        let arn: Arn = "arn:aws:s3:::todo-exports".parse().unwrap();
        assert_eq!(arn, Arn::s3_bucket("todo-exports"));
        assert_eq!(arn.to_string(), "arn:aws:s3:::todo-exports");
    }

    #[test]
    fn test_resource_with_colons_is_kept_whole() {
        let arn: Arn = "arn:aws:logs:us-east-1:123456789012:log-group:/aws/x:*"
            .parse()
            .unwrap();
        assert_eq!(arn.resource, "log-group:/aws/x:*");
    }

    #[test]
    fn test_display_roundtrip() {
        let raw = "arn:aws:es:eu-west-1:123456789012:domain/todo-search";
        let arn: Arn = raw.parse().unwrap();
        assert_eq!(arn.to_string(), raw);
    }

    #[test]
    fn test_child_builds_sub_resource() {
        let table = Arn::dynamodb_table("us-east-1", "123456789012", "Todo");
        assert_eq!(
            table.child("stream/*").to_string(),
            "arn:aws:dynamodb:us-east-1:123456789012:table/Todo/stream/*"
        );
        assert_eq!(
            table.child("/export/*").to_string(),
            "arn:aws:dynamodb:us-east-1:123456789012:table/Todo/export/*"
        );
    }

    #[test]
    fn test_empty_arn_is_rejected() {
        assert_eq!("  ".parse::<Arn>().unwrap_err(), ArnError::Empty);
    }

    #[test]
    fn test_malformed_arn_is_rejected() {
        assert!(matches!(
            "not-an-arn".parse::<Arn>().unwrap_err(),
            ArnError::Malformed(_)
        ));
        assert!(matches!(
            "arn:aws:s3".parse::<Arn>().unwrap_err(),
            ArnError::Malformed(_)
        ));
    }

    #[test]
    fn test_empty_resource_is_rejected() {
        let err = "arn:aws:s3:::".parse::<Arn>().unwrap_err();
        assert!(matches!(
            err,
            ArnError::EmptyComponent {
                component: "resource",
                ..
            }
        ));
    }

    #[test]
    fn test_expect_service() {
        let bucket = Arn::s3_bucket("b");
        assert!(bucket.expect_service("s3").is_ok());
        let err = bucket.expect_service("dynamodb").unwrap_err();
        assert!(matches!(err, ArnError::WrongService { expected: "dynamodb", .. }));
    }

    #[test]
    fn test_serde_as_string() {
        let arn = Arn::iam_role("123456789012", "PipelineRole");
        let json = serde_json::to_string(&arn).unwrap();
        assert_eq!(json, "\"arn:aws:iam::123456789012:role/PipelineRole\"");
        let back: Arn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, arn);
    }
}
