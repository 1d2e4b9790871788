//! Stack composition (Functional Core).
//!
//! [`build_stack`] reads one [`StackInputs`], validates every cross-resource
//! constraint and produces the complete resource set. Nothing here performs
//! I/O, so the same inputs always yield the same stack.

use serde_json::json;
use tracing::debug;

use super::error::{Result, StackError};
use super::inputs::{EbsVolumeType, RemovalPolicy, StackInputs};
use super::resources::{Resource, ResourceSet};
use crate::arn::Arn;
use crate::iam::{
    audit_policy, build_grant_set, diagnose_permissions, normalize_export_prefix,
    required_grants, PipelineRole,
};
use crate::pipeline::{
    render_pipeline_config, IndexTemplate, PipelineConfig, SinkConfig, SourceConfig,
};
use crate::schema::{render_graphql_schema, ModelType, TableConfig, SEARCH_DATA_SOURCE};

pub const BUCKET_ID: &str = "ExportBucket";
pub const DOMAIN_ID: &str = "SearchDomain";
pub const ROLE_ID: &str = "PipelineRole";
pub const LOG_GROUP_ID: &str = "PipelineLogGroup";
pub const PIPELINE_ID: &str = "IngestionPipeline";
pub const DATA_SOURCE_ID: &str = "SearchDataSource";
pub const API_ID: &str = "DataApi";

/// Logical id of the backing table of `model`.
pub fn table_id(model: &str) -> String {
    format!("{}Table", model)
}

/// A fully composed and validated stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    /// Backing table of every declared model, in declaration order.
    pub tables: Vec<TableConfig>,
    /// The table the pipeline replicates.
    pub table: TableConfig,
    pub table_arn: Arn,
    pub bucket_arn: Arn,
    pub domain_arn: Arn,
    pub domain_endpoint: String,
    pub role: PipelineRole,
    pub role_arn: Arn,
    pub pipeline: PipelineConfig,
    /// Rendered pipeline document.
    pub pipeline_body: String,
    /// Rendered data API schema.
    pub graphql_schema: String,
    pub resources: ResourceSet,
}

impl Stack {
    /// Deterministic JSON template of every declared resource.
    pub fn to_template(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.resources.to_template())
            .map_err(|e| StackError::Serialization(e.to_string()))
    }
}

/// Composes the whole stack from `inputs`.
pub fn build_stack(inputs: &StackInputs) -> Result<Stack> {
    inputs.schema.validate()?;
    let model = inputs
        .schema
        .model(&inputs.model)
        .ok_or_else(|| StackError::UnknownModel(inputs.model.clone()))?;
    for query in &inputs.schema.queries {
        if query.handler.data_source != SEARCH_DATA_SOURCE {
            return Err(StackError::UnknownDataSource {
                query: query.name.clone(),
                data_source: query.handler.data_source.clone(),
            });
        }
    }
    inputs.domain.validate()?;
    inputs.pipeline.validate()?;

    let mut tables = Vec::with_capacity(inputs.schema.models.len());
    for declared in &inputs.schema.models {
        let table = model_table(declared, &inputs.app_name);
        table.validate_for_export()?;
        tables.push(table);
    }
    let table = model_table(model, &inputs.app_name);

    let table_arn = Arn::dynamodb_table(&inputs.region, &inputs.account, &table.table_name);
    let bucket_arn = Arn::s3_bucket(&inputs.bucket_name);
    let domain_arn = Arn::es_domain(&inputs.region, &inputs.account, &inputs.domain.name);
    let domain_endpoint = inputs.domain.endpoint_url(&inputs.region);

    // The grant and the export must agree on the prefix.
    let default_prefix = table.export_prefix();
    let export_prefix = normalize_export_prefix(
        inputs
            .export_prefix
            .as_deref()
            .unwrap_or(default_prefix.as_str()),
    )?;

    let policy = build_grant_set(&table_arn, &bucket_arn, &domain_arn, &export_prefix)?;
    let findings = audit_policy(&policy);
    if !findings.is_empty() {
        return Err(StackError::PolicyDefects(
            findings.iter().map(ToString::to_string).collect(),
        ));
    }
    let required = required_grants(&table_arn, &bucket_arn, &domain_arn, &export_prefix)?;
    let missing = diagnose_permissions(&policy, &required);
    if !missing.is_empty() {
        return Err(StackError::MissingPermissions(
            missing
                .iter()
                .map(|m| format!("{} on {}", m.grant.action, m.grant.resource))
                .collect(),
        ));
    }

    let role = PipelineRole::new(&inputs.role_name(), policy)?;
    let role_arn = role.arn(&inputs.account);

    let template = IndexTemplate::for_model(model);
    template.check_against(model)?;

    let pipeline = PipelineConfig {
        name: inputs.pipeline.name.clone(),
        source: SourceConfig::new(
            table_arn.clone(),
            role_arn.clone(),
            &inputs.region,
            &inputs.bucket_name,
        )
        .with_export_prefix(&format!("{}/", export_prefix)),
        sinks: vec![SinkConfig::new(
            &domain_endpoint,
            &inputs.pipeline.index,
            template,
            role_arn.clone(),
            &inputs.region,
        )
        .with_bulk_size(inputs.pipeline.bulk_size)],
    };
    check_role_consistency(&pipeline, &role_arn)?;
    let pipeline_body = render_pipeline_config(&pipeline)?;
    let graphql_schema = render_graphql_schema(&inputs.schema);

    let mut resources = ResourceSet::new();
    for (declared, backing) in inputs.schema.models.iter().zip(&tables) {
        resources.insert(table_resource(&table_id(&declared.name), backing))?;
    }
    resources.insert(Resource::new(
        BUCKET_ID,
        "AWS::S3::Bucket",
        json!({ "BucketName": inputs.bucket_name }),
    ))?;
    resources.insert(domain_resource(inputs))?;
    resources.insert(Resource::new(
        ROLE_ID,
        "AWS::IAM::Role",
        json!({
            "RoleName": role.name,
            "Description": role.description,
            "AssumeRolePolicyDocument": role.assume_role_policy(),
            "ManagedPolicyArns": [],
            "Policies": [{
                "PolicyName": role.inline_policy_name,
                "PolicyDocument": role.policy,
            }],
        }),
    ))?;
    resources.insert(Resource::new(
        LOG_GROUP_ID,
        "AWS::Logs::LogGroup",
        json!({
            "LogGroupName": inputs.pipeline.log_group_name(),
            "DeletionPolicy": removal_str(RemovalPolicy::Destroy),
        }),
    ))?;
    resources.insert(Resource::new(
        PIPELINE_ID,
        "AWS::OSIS::Pipeline",
        json!({
            "PipelineName": pipeline.name,
            "MinUnits": inputs.pipeline.min_units,
            "MaxUnits": inputs.pipeline.max_units,
            "PipelineConfigurationBody": pipeline_body,
            "LogPublishingOptions": {
                "IsLoggingEnabled": inputs.pipeline.logging_enabled,
                "CloudWatchLogDestination": {
                    "LogGroup": inputs.pipeline.log_group_name(),
                },
            },
        }),
    ))?;
    resources.insert(Resource::new(
        DATA_SOURCE_ID,
        "AWS::AppSync::DataSource",
        json!({
            "Name": SEARCH_DATA_SOURCE,
            "Type": "AMAZON_OPENSEARCH_SERVICE",
            "OpenSearchServiceConfig": {
                "Endpoint": domain_endpoint,
                "AwsRegion": inputs.region,
            },
        }),
    ))?;
    resources.insert(Resource::new(
        API_ID,
        "AWS::AppSync::GraphQLApi",
        json!({
            "Name": inputs.app_name,
            "AuthenticationType": "API_KEY",
            "ApiKeyExpiresInDays": inputs.schema.authorization_modes.api_key_expires_in_days,
            "Definition": graphql_schema,
        }),
    ))?;

    debug!(
        resources = resources.len(),
        tables = tables.len(),
        table = %table.table_name,
        pipeline = %pipeline.name,
        "Composed stack"
    );

    Ok(Stack {
        tables,
        table,
        table_arn,
        bucket_arn,
        domain_arn,
        domain_endpoint,
        role,
        role_arn,
        pipeline,
        pipeline_body,
        graphql_schema,
        resources,
    })
}

/// Every source and sink of `pipeline` must assume `role_arn`.
pub fn check_role_consistency(pipeline: &PipelineConfig, role_arn: &Arn) -> Result<()> {
    let mismatch = |context: String, actual: &Arn| StackError::RoleMismatch {
        context,
        expected: role_arn.to_string(),
        actual: actual.to_string(),
    };

    if pipeline.source.role_arn != *role_arn {
        return Err(mismatch("Source".to_string(), &pipeline.source.role_arn));
    }
    for (index, sink) in pipeline.sinks.iter().enumerate() {
        if sink.role_arn != *role_arn {
            return Err(mismatch(format!("Sink #{}", index), &sink.role_arn));
        }
    }
    Ok(())
}

fn model_table(model: &ModelType, app_name: &str) -> TableConfig {
    TableConfig::for_model(model).with_table_name(&format!("{}-{}", model.name, app_name))
}

fn table_resource(logical_id: &str, table: &TableConfig) -> Resource {
    let mut properties = json!({
        "TableName": table.table_name,
        "BillingMode": "PAY_PER_REQUEST",
        "AttributeDefinitions": [{
            "AttributeName": table.partition_key.name,
            "AttributeType": "S",
        }],
        "KeySchema": [{ "AttributeName": table.partition_key.name, "KeyType": "HASH" }],
        "PointInTimeRecoverySpecification": {
            "PointInTimeRecoveryEnabled": table.point_in_time_recovery,
        },
    });
    if let Some(view) = table.stream {
        properties["StreamSpecification"] = json!({ "StreamViewType": view.as_str() });
    }
    Resource::new(logical_id, "AWS::DynamoDB::Table", properties)
}

fn domain_resource(inputs: &StackInputs) -> Resource {
    let domain = &inputs.domain;
    Resource::new(
        DOMAIN_ID,
        "AWS::OpenSearchService::Domain",
        json!({
            "DomainName": domain.name,
            "EngineVersion": domain.engine_version,
            "NodeToNodeEncryptionOptions": { "Enabled": domain.node_to_node_encryption },
            "EncryptionAtRestOptions": { "Enabled": domain.encryption_at_rest },
            "ClusterConfig": {
                "InstanceCount": domain.data_nodes,
                "InstanceType": domain.data_node_instance_type,
                "DedicatedMasterEnabled": domain.master_nodes > 0,
                "DedicatedMasterCount": domain.master_nodes,
            },
            "EBSOptions": {
                "EBSEnabled": true,
                "VolumeSize": domain.ebs.volume_size_gib,
                "VolumeType": match domain.ebs.volume_type {
                    EbsVolumeType::Gp2 => "gp2",
                    EbsVolumeType::Gp3 => "gp3",
                },
            },
            "DeletionPolicy": removal_str(domain.removal_policy),
        }),
    )
}

fn removal_str(policy: RemovalPolicy) -> &'static str {
    match policy {
        RemovalPolicy::Destroy => "Delete",
        RemovalPolicy::Retain => "Retain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract_template_blocks;
    use crate::schema::{AuthRule, FieldType, QueryHandler};

    fn inputs() -> StackInputs {
        StackInputs::todo("todoapp", "us-east-1", "123456789012", "todoapp-exports")
    }

    #[test]
    fn test_build_is_deterministic() {
        let first = build_stack(&inputs()).unwrap();
        let second = build_stack(&inputs()).unwrap();
        assert_eq!(first.to_template().unwrap(), second.to_template().unwrap());
        assert_eq!(first.pipeline_body, second.pipeline_body);
    }

    #[test]
    fn test_declares_every_resource_once() {
        let stack = build_stack(&inputs()).unwrap();
        assert_eq!(
            stack.resources.logical_ids(),
            vec![
                "TodoTable",
                BUCKET_ID,
                DOMAIN_ID,
                ROLE_ID,
                LOG_GROUP_ID,
                PIPELINE_ID,
                DATA_SOURCE_ID,
                API_ID
            ]
        );
    }

    #[test]
    fn test_source_and_sink_share_pipeline_role() {
        let stack = build_stack(&inputs()).unwrap();
        assert_eq!(
            stack.role_arn.to_string(),
            "arn:aws:iam::123456789012:role/TodoappPipelineRole"
        );
        assert_eq!(stack.pipeline.source.role_arn, stack.role_arn);
        assert!(stack.pipeline.sinks.iter().all(|s| s.role_arn == stack.role_arn));
    }

    #[test]
    fn test_export_prefix_matches_grant() {
        let stack = build_stack(&inputs()).unwrap();
        assert_eq!(stack.pipeline.source.export_prefix, "Todo-todoapp/");
        let statement = stack
            .role
            .policy
            .statement("allowReadAndWriteToS3ForExport")
            .unwrap();
        assert_eq!(
            statement.resources,
            vec!["arn:aws:s3:::todoapp-exports/Todo-todoapp/*".to_string()]
        );
    }

    #[test]
    fn test_custom_export_prefix() {
        let stack = build_stack(&inputs().with_export_prefix("/exported-data/")).unwrap();
        assert_eq!(stack.pipeline.source.export_prefix, "exported-data/");
        assert!(stack.pipeline_body.contains("s3_prefix: \"exported-data/\""));
    }

    #[test]
    fn test_role_has_no_managed_policies() {
        let stack = build_stack(&inputs()).unwrap();
        let role = stack.resources.get(ROLE_ID).unwrap();
        assert_eq!(role.properties["ManagedPolicyArns"], json!([]));
        assert_eq!(
            role.properties["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]["Service"],
            "osis-pipelines.amazonaws.com"
        );
        let statements = role.properties["Policies"][0]["PolicyDocument"]["Statement"]
            .as_array()
            .unwrap();
        assert_eq!(statements.len(), 5);
    }

    #[test]
    fn test_embedded_template_matches_model() {
        let stack = build_stack(&inputs()).unwrap();
        let blocks = extract_template_blocks(&stack.pipeline_body);
        assert_eq!(blocks.len(), 1);
        let template: IndexTemplate = serde_json::from_str(&blocks[0]).unwrap();
        assert_eq!(template, IndexTemplate::for_model(&crate::schema::todo_model()));
    }

    #[test]
    fn test_pipeline_resource_carries_capacity_and_logging() {
        let stack = build_stack(&inputs()).unwrap();
        let pipeline = stack.resources.get(PIPELINE_ID).unwrap();
        assert_eq!(pipeline.properties["MinUnits"], 1);
        assert_eq!(pipeline.properties["MaxUnits"], 4);
        assert_eq!(
            pipeline.properties["LogPublishingOptions"]["CloudWatchLogDestination"]["LogGroup"],
            "/aws/vendedlogs/OpenSearchService/pipelines/todoapp-todo-pipeline"
        );
        assert_eq!(pipeline.properties["PipelineConfigurationBody"], stack.pipeline_body);
    }

    #[test]
    fn test_table_resource_enables_export_prerequisites() {
        let stack = build_stack(&inputs()).unwrap();
        let table = stack.resources.get(&table_id("Todo")).unwrap();
        assert_eq!(
            table.properties["PointInTimeRecoverySpecification"]["PointInTimeRecoveryEnabled"],
            true
        );
        assert_eq!(table.properties["StreamSpecification"]["StreamViewType"], "NEW_IMAGE");
    }

    #[test]
    fn test_every_model_gets_a_backing_table() {
        let mut inputs = inputs();
        inputs.schema.models.push(
            ModelType::new("Todo1")
                .with_field("content", FieldType::String)
                .with_auth(AuthRule::public_api_key()),
        );
        let stack = build_stack(&inputs).unwrap();

        let names: Vec<_> = stack.tables.iter().map(|t| t.table_name.as_str()).collect();
        assert_eq!(names, vec!["Todo-todoapp", "Todo1-todoapp"]);
        assert_eq!(stack.table.table_name, "Todo-todoapp");
        assert!(stack.tables.iter().all(|t| t.validate_for_export().is_ok()));

        for (id, name) in [("TodoTable", "Todo-todoapp"), ("Todo1Table", "Todo1-todoapp")] {
            let table = stack.resources.get(id).unwrap();
            assert_eq!(table.properties["TableName"], name);
            assert_eq!(
                table.properties["PointInTimeRecoverySpecification"]["PointInTimeRecoveryEnabled"],
                true
            );
            assert_eq!(table.properties["StreamSpecification"]["StreamViewType"], "NEW_IMAGE");
        }
        assert_eq!(&stack.resources.logical_ids()[..3], ["TodoTable", "Todo1Table", BUCKET_ID]);
    }

    #[test]
    fn test_pipeline_replicates_selected_model() {
        let mut inputs = inputs();
        inputs.schema.models.push(
            ModelType::new("Todo1")
                .with_field("content", FieldType::String)
                .with_auth(AuthRule::public_api_key()),
        );
        inputs.model = "Todo1".to_string();
        let stack = build_stack(&inputs).unwrap();
        assert_eq!(stack.table.table_name, "Todo1-todoapp");
        assert_eq!(stack.pipeline.source.export_prefix, "Todo1-todoapp/");
        assert_eq!(stack.tables.len(), 2);
    }

    #[test]
    fn test_unknown_model_fails() {
        let mut inputs = inputs();
        inputs.model = "Note".to_string();
        assert_eq!(
            build_stack(&inputs),
            Err(StackError::UnknownModel("Note".to_string()))
        );
    }

    #[test]
    fn test_unknown_data_source_fails() {
        let mut inputs = inputs();
        inputs.schema.queries[0].handler = QueryHandler {
            data_source: "lambdaDataSource".to_string(),
            entry: "./handler.js".to_string(),
        };
        assert!(matches!(
            build_stack(&inputs),
            Err(StackError::UnknownDataSource { .. })
        ));
    }

    #[test]
    fn test_invalid_capacity_fails_before_composition() {
        let mut inputs = inputs();
        inputs.pipeline.min_units = 8;
        assert_eq!(
            build_stack(&inputs),
            Err(StackError::InvalidCapacity { min: 8, max: 4 })
        );
    }

    #[test]
    fn test_wildcard_export_prefix_fails() {
        assert!(matches!(
            build_stack(&inputs().with_export_prefix("*")),
            Err(StackError::Policy(_))
        ));
    }

    #[test]
    fn test_invalid_pipeline_name_fails() {
        let mut inputs = inputs();
        inputs.pipeline.name = "Todo_Pipeline".to_string();
        assert!(matches!(build_stack(&inputs), Err(StackError::Pipeline(_))));
    }

    #[test]
    fn test_schema_errors_propagate() {
        let mut inputs = inputs();
        inputs.schema.models.push(ModelType::new("Todo"));
        assert!(matches!(build_stack(&inputs), Err(StackError::Schema(_))));
    }

    #[test]
    fn test_role_mismatch_is_detected() {
        let stack = build_stack(&inputs()).unwrap();
        let mut pipeline = stack.pipeline.clone();
        pipeline.sinks[0].role_arn = Arn::iam_role("123456789012", "OtherRole");
        assert_eq!(
            check_role_consistency(&pipeline, &stack.role_arn),
            Err(StackError::RoleMismatch {
                context: "Sink #0".to_string(),
                expected: stack.role_arn.to_string(),
                actual: "arn:aws:iam::123456789012:role/OtherRole".to_string(),
            })
        );
    }
}
