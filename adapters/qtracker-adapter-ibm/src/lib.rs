//! IBM Quantum Platform adapter for the Quantum Tracker.
//!
//! Implements [`qtracker_hal::QuantumService`] on top of the IBM Quantum
//! REST API.
//!
//! # Channels
//!
//! | Channel | Token | Instance |
//! |---------|-------|----------|
//! | `ibm_cloud` | IBM Cloud API key (exchanged at IAM) | Service CRN |
//! | `ibm_quantum` | Legacy bearer token | Optional hub/group/project |
//!
//! # Example
//!
//! ```ignore
//! use qtracker_adapter_ibm::{IbmChannel, IbmService};
//! use qtracker_hal::{JobQuery, QuantumService};
//!
//! let service = IbmService::connect(IbmChannel::Cloud, &api_key, &service_crn).await?;
//! let jobs = service.jobs(JobQuery::default()).await?;
//! ```

pub mod api;
mod counts;
pub mod error;
mod service;

pub use api::IbmClient;
pub use counts::results_to_counts;
pub use error::{IbmError, IbmResult};
pub use service::{IbmChannel, IbmService};
