//! Backend record assembly.

use qtracker_hal::BackendHandle;

use crate::dto::{BackendRecord, BackendState};

/// Error rate reported for devices that publish none.
pub const DEFAULT_ERROR_RATE: f64 = 0.01;

/// Build records for every physical device in `backends`.
///
/// Simulators are skipped. A device whose status cannot be read is logged
/// and left out; the rest of the listing is unaffected.
pub async fn backends_to_records(backends: &[Box<dyn BackendHandle>]) -> Vec<BackendRecord> {
    let mut records = Vec::with_capacity(backends.len());

    for backend in backends.iter().filter(|b| !b.is_simulator()) {
        match backend.status().await {
            Ok(status) => records.push(BackendRecord {
                name: backend.name().to_string(),
                status: BackendState::from(status.operational),
                qubit_count: backend.num_qubits(),
                queue_depth: status.pending_jobs,
                error_rate: backend.error_rate().unwrap_or(DEFAULT_ERROR_RATE),
            }),
            Err(e) => {
                tracing::warn!(backend = backend.name(), error = %e, "Could not process backend");
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtracker_adapter_demo::DemoBackend;

    fn boxed(backends: Vec<DemoBackend>) -> Vec<Box<dyn BackendHandle>> {
        backends
            .into_iter()
            .map(|b| Box::new(b) as Box<dyn BackendHandle>)
            .collect()
    }

    #[tokio::test]
    async fn test_maps_devices_and_skips_simulators() {
        let backends = boxed(vec![
            DemoBackend::new("ibm_kyoto", 127).with_queue(4),
            DemoBackend::new("ibmq_kolkata", 27)
                .offline("maintenance")
                .with_error_rate(0.025),
            DemoBackend::new("ibmq_qasm_simulator", 32).simulator(),
        ]);

        let records = backends_to_records(&backends).await;
        assert_eq!(
            records,
            vec![
                BackendRecord {
                    name: "ibm_kyoto".into(),
                    status: BackendState::Active,
                    qubit_count: 127,
                    queue_depth: 4,
                    error_rate: DEFAULT_ERROR_RATE,
                },
                BackendRecord {
                    name: "ibmq_kolkata".into(),
                    status: BackendState::Inactive,
                    qubit_count: 27,
                    queue_depth: 0,
                    error_rate: 0.025,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_status_is_skipped() {
        let backends = boxed(vec![
            DemoBackend::new("ibm_osaka", 127),
            DemoBackend::new("ibm_fez", 156).unreachable("timeout"),
            DemoBackend::new("ibm_torino", 133),
        ]);

        let names: Vec<String> = backends_to_records(&backends)
            .await
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["ibm_osaka", "ibm_torino"]);
    }
}
