//! Implementations of the ports.
//!
//! - `InMemoryJobStore`: dev/test store with the same merge semantics
//! - `RestJobStore`: PostgREST-style row API (production datastore)
//! - `HttpAnalysisProvider`: text-analysis service client

pub mod http_provider;
pub mod memory_store;
pub mod rest_store;

pub use http_provider::HttpAnalysisProvider;
pub use memory_store::InMemoryJobStore;
pub use rest_store::RestJobStore;
