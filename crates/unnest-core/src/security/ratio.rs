//! Expansion-ratio guard against zipbombs.

use crate::ExtractionConfig;
use crate::ExtractionError;
use crate::Result;

/// Checks declared archive contents against the configured expansion
/// ceiling and returns the computed ratio.
///
/// The ratio is the sum of declared uncompressed member sizes over the
/// on-disk archive size, for every format. An archive declaring zero
/// bytes has ratio 0 and always passes; empty archive files are rejected
/// by validation before this check runs.
///
/// # Errors
///
/// Returns [`ExtractionError::Zipbomb`] with the computed ratio when the
/// ceiling is exceeded.
pub fn check_extraction_ratio(
    archive_size: u64,
    total_uncompressed: u64,
    config: &ExtractionConfig,
) -> Result<f64> {
    if archive_size == 0 {
        return Ok(0.0);
    }

    let ratio = total_uncompressed as f64 / archive_size as f64;
    if ratio > config.max_extraction_ratio {
        return Err(ExtractionError::Zipbomb {
            archive_size,
            uncompressed: total_uncompressed,
            ratio,
            limit: config.max_extraction_ratio,
        });
    }

    Ok(ratio)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_ratio_passes() {
        let config = ExtractionConfig::default();
        let ratio = check_extraction_ratio(1000, 5000, &config).unwrap();
        assert!((ratio - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_at_limit_passes() {
        let config = ExtractionConfig::default();
        assert!(check_extraction_ratio(1000, 100_000, &config).is_ok());
    }

    #[test]
    fn test_ratio_above_limit_rejected() {
        let config = ExtractionConfig::default();
        let err = check_extraction_ratio(1000, 100_001, &config).unwrap_err();
        assert!(matches!(err, ExtractionError::Zipbomb { .. }));
        assert!(err.to_string().contains("zipbomb"));
    }

    #[test]
    fn test_extreme_ratio_reported() {
        let config = ExtractionConfig::default();
        let err = check_extraction_ratio(100_000, 500_000_000, &config).unwrap_err();
        match err {
            ExtractionError::Zipbomb { ratio, limit, .. } => {
                assert!((ratio - 5000.0).abs() < f64::EPSILON);
                assert!((limit - 100.0).abs() < f64::EPSILON);
            }
            other => panic!("expected zipbomb, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_declared_bytes_pass() {
        let config = ExtractionConfig::default();
        let ratio = check_extraction_ratio(1000, 0, &config).unwrap();
        assert!(ratio.abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_archive_size_passes_without_division() {
        let config = ExtractionConfig::default();
        let ratio = check_extraction_ratio(0, 1000, &config).unwrap();
        assert!(ratio.abs() < f64::EPSILON);
    }
}
