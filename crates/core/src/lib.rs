//! Pure core of the todo search backend: schema, table, permissions,
//! pipeline rendering, search resolution and stack composition.
//!
//! Nothing in this crate performs I/O. The `xtask` shell and the client
//! crate apply its output.

pub mod arn;
pub mod iam;
pub mod pipeline;
pub mod schema;
pub mod search;
pub mod stack;
