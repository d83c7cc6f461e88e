//! Quantum Tracker Hardware Abstraction Layer
//!
//! This crate describes the upstream quantum service the tracker reads from,
//! independent of any particular provider SDK or REST API.
//!
//! # Overview
//!
//! - [`QuantumService`]: a connected service able to list jobs and backends
//! - [`JobHandle`]: one upstream job, every field optional and fallible
//! - [`BackendHandle`]: one compute backend with a fallible live status
//! - [`ResultHandle`]: a finished job's result, from which [`Counts`] are
//!   extracted
//!
//! # Supported Providers
//!
//! | Provider | Crate | Channel |
//! |----------|-------|---------|
//! | IBM Quantum Platform (Cloud) | `qtracker-adapter-ibm` | `ibm_cloud` |
//! | IBM Quantum (legacy) | `qtracker-adapter-ibm` | `ibm_quantum` |
//! | In-memory demo fleet | `qtracker-adapter-demo` | `demo` |
//!
//! # Implementing a Provider
//!
//! ```ignore
//! use qtracker_hal::{BackendFilter, BackendHandle, HalResult, JobHandle, JobQuery, QuantumService};
//! use async_trait::async_trait;
//!
//! struct MyService;
//!
//! #[async_trait]
//! impl QuantumService for MyService {
//!     fn channel(&self) -> &str { "my_cloud" }
//!
//!     async fn jobs(&self, query: JobQuery) -> HalResult<Vec<Box<dyn JobHandle>>> {
//!         todo!()
//!     }
//!
//!     async fn backends(&self, filter: BackendFilter) -> HalResult<Vec<Box<dyn BackendHandle>>> {
//!         todo!()
//!     }
//! }
//! ```

pub mod backend;
pub mod error;
pub mod job;
pub mod service;

pub use backend::{BackendHandle, BackendStatus};
pub use error::{HalError, HalResult};
pub use job::{Counts, JobHandle, JobUsage, ResultHandle, StatusValue, StepTimestamps};
pub use service::{BackendFilter, JobQuery, QuantumService};
