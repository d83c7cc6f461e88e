//! Translation from upstream handles to API records.

pub mod accessor;
pub mod backend;
pub mod job;
pub mod mask;
pub mod metrics;
pub mod status;

pub use accessor::{safe_call, safe_call_opt};
pub use backend::backends_to_records;
pub use job::job_to_record;
pub use mask::mask_user_id;
pub use metrics::fleet_metrics;
pub use status::normalize_status;
