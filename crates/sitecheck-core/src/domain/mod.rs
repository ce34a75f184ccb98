//! Domain model (IDs, job record, punctuality policy, quality report, errors).

pub mod errors;
pub mod ids;
pub mod job;
pub mod punctuality;
pub mod quality;

pub use errors::{JobError, ProviderError, StoreError};
pub use ids::{JobId, LocationId};
pub use job::{JobRecord, JobStatus};
pub use punctuality::{Punctuality, evaluate};
pub use quality::QualityReport;
