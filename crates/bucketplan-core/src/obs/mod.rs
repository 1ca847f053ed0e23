//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Descriptor and placement code never touch counters directly; they emit
//! [`MetricsEvent`]s through the sink boundary.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
