//! Search CLI command.

use clap::Parser;
use todosearch_core::search::{SearchQuery, DEFAULT_PAGE_SIZE};

/// Full-text search over todo content.
#[derive(Debug, Parser)]
pub struct SearchCommand {
    /// Text to match against todo content.
    pub term: String,

    /// Offset of the first hit.
    #[arg(long, default_value_t = 0)]
    pub from: u32,

    /// Number of hits to return.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub size: u32,
}

impl SearchCommand {
    pub fn query(&self) -> SearchQuery {
        SearchQuery::new(self.term.clone()).with_page(self.from, self.size)
    }
}
