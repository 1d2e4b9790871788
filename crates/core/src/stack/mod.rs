//! Stack composition: one immutable set of inputs in, every resource of the
//! search backend out.

mod build;
mod error;
mod inputs;
mod resources;

pub use build::{
    build_stack, check_role_consistency, table_id, Stack, API_ID, BUCKET_ID, DATA_SOURCE_ID,
    DOMAIN_ID, LOG_GROUP_ID, PIPELINE_ID, ROLE_ID,
};
pub use error::{Result, StackError};
pub use inputs::{
    DomainConfig, EbsOptions, EbsVolumeType, PipelineSettings, RemovalPolicy, StackInputs,
};
pub use resources::{Resource, ResourceSet};
