//! Prometheus metrics for conversions.
//!
//! Metrics are defined as process-wide statics and are not registered
//! anywhere by default; embedding applications register [`all_metrics`]
//! in their own registry.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};
use std::time::Duration;

use crate::converter::{ConversionReport, ConverterError};

/// Conversions total by result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("babelpipe_conversions_total", "Total gpsbabel conversions"),
        // "success", "launch_failed", "conversion_failed", "stream_error",
        // "timeout", "cancelled", "io_error"
        &["result"],
    )
    .unwrap()
});

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "babelpipe_conversion_duration_seconds",
            "Duration of gpsbabel conversions",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 120.0]),
        &["result"],
    )
    .unwrap()
});

/// Bytes moved through gpsbabel.
pub static CONVERSION_BYTES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "babelpipe_conversion_bytes_total",
            "Bytes fed to and produced by gpsbabel",
        ),
        &["direction"], // "in", "out"
    )
    .unwrap()
});

/// Records the outcome of one conversion.
pub fn record_conversion(result: &Result<ConversionReport, ConverterError>, elapsed: Duration) {
    let label = match result {
        Ok(report) => {
            CONVERSION_BYTES
                .with_label_values(&["in"])
                .inc_by(report.bytes_in);
            CONVERSION_BYTES
                .with_label_values(&["out"])
                .inc_by(report.bytes_out);
            "success"
        }
        Err(e) => e.label(),
    };

    CONVERSIONS_TOTAL.with_label_values(&[label]).inc();
    CONVERSION_DURATION
        .with_label_values(&[label])
        .observe(elapsed.as_secs_f64());
}

/// Get all metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(CONVERSION_BYTES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::FormatPair;

    #[test]
    fn test_record_failure_by_label() {
        let before = CONVERSIONS_TOTAL.with_label_values(&["cancelled"]).get();

        record_conversion(&Err(ConverterError::Cancelled), Duration::from_millis(5));

        let after = CONVERSIONS_TOTAL.with_label_values(&["cancelled"]).get();
        assert!(after > before);
    }

    #[test]
    fn test_record_success_counts_bytes() {
        let before = CONVERSION_BYTES.with_label_values(&["out"]).get();
        let report = ConversionReport {
            formats: FormatPair::to_gpx("v900"),
            bytes_in: 10,
            bytes_out: 42,
            duration_ms: 3,
            warnings: None,
        };

        record_conversion(&Ok(report), Duration::from_millis(3));

        let after = CONVERSION_BYTES.with_label_values(&["out"]).get();
        assert!(after >= before + 42);
    }

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        CONVERSIONS_TOTAL.with_label_values(&["success"]).inc_by(0);
        assert!(!registry.gather().is_empty());
    }
}
