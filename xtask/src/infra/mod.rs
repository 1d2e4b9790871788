//! Search backend infrastructure commands.

mod artifacts;
mod client;
mod deploy;
mod error;
mod settings;

pub use error::{InfraError, Result};

use std::path::PathBuf;

use crate::prelude::*;
use dialoguer::Confirm;
use todosearch_core::iam::{audit_policy, diagnose_permissions, required_grants};
use todosearch_core::schema::{
    calculate_deploy_plan, format_deploy_plan, DeployPlan, OperationKind,
};
use todosearch_core::stack::{build_stack, Stack};
use tracing::info;

use settings::InfraSettings;

/// Search backend infrastructure commands.
#[derive(Debug, clap::Parser)]
pub struct InfraCommand {
    #[command(flatten)]
    pub settings: InfraSettings,

    #[command(subcommand)]
    pub action: InfraAction,
}

/// Available infra actions.
#[derive(Debug, clap::Subcommand)]
pub enum InfraAction {
    /// Write every generated artifact to a directory.
    Synth(SynthCommand),

    /// Print the pipeline role's inline policy.
    Policy,

    /// Print the rendered pipeline document.
    Pipeline,

    /// Print the data API schema and its operations.
    Schema,

    /// Audit the pipeline role policy and check it covers every runtime grant.
    Audit,

    /// Show the table deploy plans without applying them.
    Plan,

    /// Create or update the backing tables.
    Deploy(DeployCommand),
}

/// Write generated artifacts.
#[derive(Debug, clap::Parser)]
pub struct SynthCommand {
    /// Output directory.
    #[arg(long, default_value = "target/todosearch")]
    pub out_dir: PathBuf,
}

/// Deploy the backing tables.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Create or update the backing table of every declared model.

Each table is keyed by `id`, billed on demand, and has point-in-time recovery
and a NEW_IMAGE change stream enabled, which the ingestion pipeline requires.

The command shows a plan of changes before applying and asks for confirmation.

Environment variables:
  AWS_ENDPOINT_URL    - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION          - AWS region (defaults to us-east-1)
  AWS_PROFILE         - AWS profile to use for credentials")]
pub struct DeployCommand {
    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,
}

/// Main entry point for infra command.
pub async fn run(command: InfraCommand, global: crate::Global) -> Result<()> {
    let aws_config = client::AwsConfig::default();
    let inputs = command.settings.to_inputs(&aws_config.region)?;
    let stack = build_stack(&inputs)?;
    info!(resources = stack.resources.len(), "Stack composed");

    match command.action {
        InfraAction::Synth(cmd) => run_synth(&stack, cmd, &global),
        InfraAction::Policy => {
            aprintln!("{}", stack.role.policy.to_json()?);
            Ok(())
        }
        InfraAction::Pipeline => {
            aprint!("{}", stack.pipeline_body);
            Ok(())
        }
        InfraAction::Schema => {
            run_schema(&stack, &inputs.schema, &global);
            Ok(())
        }
        InfraAction::Audit => run_audit(&stack, &global),
        InfraAction::Plan => run_plan(&stack, &aws_config, &global, false, true).await,
        InfraAction::Deploy(cmd) => run_plan(&stack, &aws_config, &global, true, cmd.force).await,
    }
}

fn run_synth(stack: &Stack, cmd: SynthCommand, global: &crate::Global) -> Result<()> {
    std::fs::create_dir_all(&cmd.out_dir)?;
    for artifact in artifacts::synth_artifacts(stack)? {
        let path = cmd.out_dir.join(artifact.file_name);
        std::fs::write(&path, artifact.contents)?;
        if !global.is_silent() {
            aprintln!("{} {}", p_g("wrote"), path.display());
        }
    }
    Ok(())
}

fn run_schema(stack: &Stack, schema: &todosearch_core::schema::Schema, global: &crate::Global) {
    aprint!("{}", stack.graphql_schema);
    if global.is_silent() {
        return;
    }
    aprintln!();
    aprintln!("{}", p_c("Operations:"));
    for op in schema.api_surface() {
        let kind = match op.kind {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        };
        match op.data_source {
            Some(source) => aprintln!("  {} {} -> {}", kind, op.name, p_m(&source)),
            None => aprintln!("  {} {}", kind, op.name),
        }
    }
}

fn run_audit(stack: &Stack, global: &crate::Global) -> Result<()> {
    let findings = audit_policy(&stack.role.policy);
    let required = required_grants(
        &stack.table_arn,
        &stack.bucket_arn,
        &stack.domain_arn,
        stack.pipeline.source.export_prefix.trim_end_matches('/'),
    )
    .map_err(todosearch_core::stack::StackError::from)?;
    let missing = diagnose_permissions(&stack.role.policy, &required);

    if !global.is_silent() {
        for finding in &findings {
            aprintln!("  {} {}", p_r("!"), finding);
        }
        for gap in &missing {
            aprintln!(
                "  {} {} on {} ({:?})",
                p_r("-"),
                gap.grant.action,
                gap.grant.resource,
                gap.reason
            );
        }
        if global.is_verbose() {
            for grant in &required {
                aprintln!("  {} {} {}", p_g("ok"), grant.action, grant.resource);
            }
        }
    }

    let problems = findings.len() + missing.len();
    if problems > 0 {
        return Err(InfraError::AuditFailed(problems));
    }
    if !global.is_silent() {
        aprintln!(
            "{} {} grants covered, no findings.",
            p_g("Audit passed:"),
            required.len()
        );
    }
    Ok(())
}

async fn run_plan(
    stack: &Stack,
    aws_config: &client::AwsConfig,
    global: &crate::Global,
    apply: bool,
    force: bool,
) -> Result<()> {
    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), aws_config.target_display());
        aprintln!();
    }

    let dynamo_client = client::create_client(aws_config).await?;
    let mut plans = Vec::with_capacity(stack.tables.len());
    for table in &stack.tables {
        let current_state = client::get_table_state(&dynamo_client, &table.table_name).await?;
        plans.push(calculate_deploy_plan(current_state.as_ref(), table));
    }

    if !global.is_silent() {
        aprintln!("{}", p_c("Deploy Plan:"));
        for line in plans.iter().flat_map(format_deploy_plan) {
            aprintln!("  {}", p_plan(&line));
        }
        aprintln!();
    }

    if plans
        .iter()
        .all(|plan| matches!(plan, DeployPlan::NoChanges { .. }))
    {
        if !global.is_silent() {
            aprintln!("{}", p_g("Infrastructure is up to date."));
        }
        return Ok(());
    }

    if !apply {
        return Ok(());
    }

    if !force {
        let confirmed = Confirm::new()
            .with_prompt("Apply these changes?")
            .default(true)
            .interact()
            .map_err(|e| InfraError::Prompt(e.to_string()))?;

        if !confirmed {
            return Err(InfraError::UserCancelled);
        }
    }

    if !global.is_silent() {
        aprintln!("{}", p_b("Applying changes..."));
    }

    for plan in &plans {
        deploy::execute_deploy_plan(&dynamo_client, plan).await?;
    }

    if !global.is_silent() {
        aprintln!("{}", p_g("Infrastructure deployed successfully."));
    }

    Ok(())
}
