//! Decoding sampler results into measurement counts.

use std::collections::HashMap;

use qtracker_hal::Counts;

use crate::api::JobResultResponse;
use crate::error::{IbmError, IbmResult};

/// Convert the first PUB of a sampler result to counts.
///
/// V2 results carry raw hex samples per classical register; V1 results carry
/// pre-aggregated counts or quasi-distributions. A payload with none of these
/// is an error rather than an empty histogram.
pub fn results_to_counts(results: &JobResultResponse) -> IbmResult<Counts> {
    let result = results
        .results
        .first()
        .ok_or_else(|| IbmError::ResultDecode("result has no entries".to_string()))?;

    // V2 Sampler: raw samples in `data.<register>.samples`
    if let Some(data) = result.data.as_ref().filter(|d| !d.is_empty()) {
        let mut counts = Counts::new();
        for register_data in data.values() {
            let bit_width = register_data
                .num_bits
                .unwrap_or_else(|| infer_bit_width(&register_data.samples));

            let mut sample_counts: HashMap<String, u64> = HashMap::new();
            for sample in &register_data.samples {
                let binary = hex_to_binary(sample, bit_width);
                *sample_counts.entry(binary).or_insert(0) += 1;
            }

            for (bitstring, count) in sample_counts {
                counts.insert(bitstring, count);
            }
        }
        return Ok(counts);
    }

    // V1: pre-aggregated counts first (more accurate)
    if let Some(raw_counts) = &result.counts {
        return Ok(raw_counts
            .iter()
            .map(|(bitstring, &count)| (hex_to_binary(bitstring, 0), count))
            .collect());
    }

    // V1: fall back to quasi-distributions
    if let Some(dist) = result.quasi_dists.as_ref().and_then(|d| d.first()) {
        let effective_shots = result
            .metadata
            .as_ref()
            .and_then(|m| m.get("shots"))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(1024) as f64;

        let mut counts = Counts::new();
        for (bitstring, &prob) in dist {
            let count = (prob * effective_shots).max(0.0).round() as u64;
            if count > 0 {
                counts.insert(hex_to_binary(bitstring, 0), count);
            }
        }
        return Ok(counts);
    }

    Err(IbmError::ResultDecode(
        "result carries neither samples nor counts".to_string(),
    ))
}

/// Infer the classical register bit width from V2 hex samples.
///
/// Uses the bit length of the largest sample; 1 if all samples are zero.
fn infer_bit_width(samples: &[String]) -> usize {
    let max_val = samples
        .iter()
        .filter_map(|s| {
            let hex = s.strip_prefix("0x").unwrap_or(s);
            u64::from_str_radix(hex, 16).ok()
        })
        .max()
        .unwrap_or(0);

    if max_val == 0 {
        1
    } else {
        64 - max_val.leading_zeros() as usize
    }
}

/// Convert a hex string to a binary string padded to `width` bits.
///
/// With `width == 0` the width falls back to 4 bits per hex digit. Strings
/// that are not hex are assumed to be bitstrings already.
fn hex_to_binary(hex: &str, width: usize) -> String {
    let Some(digits) = hex.strip_prefix("0x") else {
        return hex.to_string();
    };

    match u64::from_str_radix(digits, 16) {
        Ok(value) => {
            let width = if width > 0 { width } else { digits.len() * 4 };
            format!("{value:0>width$b}")
        }
        Err(_) => hex.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> JobResultResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_v2_samples_bell_state() {
        let results = parse(
            r#"{"results": [{"data": {"c": {"samples": ["0x0", "0x3", "0x3", "0x0", "0x3"]}}}]}"#,
        );
        let counts = results_to_counts(&results).unwrap();
        assert_eq!(counts.get("00"), Some(2));
        assert_eq!(counts.get("11"), Some(3));
        assert_eq!(counts.total_shots(), 5);
    }

    #[test]
    fn test_v2_samples_respect_reported_width() {
        let results = parse(
            r#"{"results": [{"data": {"meas": {"samples": ["0x1", "0x1"], "num_bits": 3}}}]}"#,
        );
        let counts = results_to_counts(&results).unwrap();
        assert_eq!(counts.get("001"), Some(2));
    }

    #[test]
    fn test_v1_counts_passthrough_binary_keys() {
        let results = parse(r#"{"results": [{"counts": {"000": 512, "111": 488}}]}"#);
        let counts = results_to_counts(&results).unwrap();
        assert_eq!(counts.get("000"), Some(512));
        assert_eq!(counts.get("111"), Some(488));
    }

    #[test]
    fn test_v1_quasi_dists_scaled_by_shots() {
        let results = parse(
            r#"{"results": [{"quasi_dists": [{"0x0": 0.25, "0x1": 0.75}], "metadata": {"shots": 400}}]}"#,
        );
        let counts = results_to_counts(&results).unwrap();
        assert_eq!(counts.get("0000"), Some(100));
        assert_eq!(counts.get("0001"), Some(300));
    }

    #[test]
    fn test_empty_results_is_error() {
        let results = parse(r#"{"results": []}"#);
        assert!(matches!(
            results_to_counts(&results),
            Err(IbmError::ResultDecode(_))
        ));
    }

    #[test]
    fn test_result_without_counts_is_error() {
        let results = parse(r#"{"results": [{"metadata": {"shots": 10}}]}"#);
        assert!(results_to_counts(&results).is_err());
    }

    #[test]
    fn test_infer_bit_width() {
        assert_eq!(infer_bit_width(&["0x0".into()]), 1);
        assert_eq!(infer_bit_width(&["0x3".into(), "0x1".into()]), 2);
        assert_eq!(infer_bit_width(&["0x8".into()]), 4);
    }
}
