//! Quantum Tracker demo fleet
//!
//! An in-memory [`QuantumService`] with a fixed set of IBM-like backends and
//! jobs. It needs no credentials and is fully deterministic for a given
//! reference time, which makes it useful for local development of the
//! dashboard front end and for tests.
//!
//! # Fleet
//!
//! | Backend | Qubits | Status |
//! |---------|--------|--------|
//! | `ibm_brisbane` | 127 | active |
//! | `ibm_kyoto` | 127 | active |
//! | `ibm_osaka` | 127 | active |
//! | `ibmq_kolkata` | 27 | maintenance (inactive) |
//! | `ibmq_mumbai` | 27 | active |
//! | `ibmq_auckland` | 27 | active |
//! | `ibmq_qasm_simulator` | 32 | simulator |
//!
//! # Example
//!
//! ```ignore
//! use qtracker_adapter_demo::DemoService;
//! use qtracker_hal::{JobQuery, QuantumService};
//!
//! let service = DemoService::new(chrono::Utc::now());
//! let jobs = service.jobs(JobQuery::default()).await?;
//! ```

mod fleet;

pub use fleet::{DemoBackend, DemoJob, DemoService};
