//! docrank-query
//!
//! The query pipeline: a snapshot-swapping search service over the lexical
//! and semantic indexes, CSV batch runs, and the transport-free search API.

pub mod api;
pub mod batch;
pub mod service;

pub use api::{handle_search, health, HealthReport, SearchRequest, SearchResponse};
pub use batch::{read_queries, run_batch, write_results, QueryRecord, ResultRecord};
pub use service::{IndexSnapshot, SearchResults, SearchService};
