//! Permission set for the ingestion pipeline's assumable identity.

mod audit;
mod error;
mod grants;
mod matching;
mod policy;
mod role;

pub use audit::{audit_policy, PolicyFinding};
pub use error::{PolicyError, Result};
pub use grants::{
    build_export_policy, build_grant_set, diagnose_permissions, normalize_export_prefix,
    required_grants, MissingGrant, MissingReason, RequiredGrant, SID_CHECK_EXPORT,
    SID_EXPORT_OBJECTS, SID_READ_STREAM, SID_RUN_EXPORT, SID_SEARCH_ACCESS,
};
pub use matching::{action_matches, resource_matches};
pub use policy::{Effect, PolicyDocument, PolicyStatement, POLICY_VERSION};
pub use role::{PipelineRole, INLINE_POLICY_NAME, PIPELINE_SERVICE_PRINCIPAL};
