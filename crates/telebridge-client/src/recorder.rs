//! SDK-side request metrics, exported as Prometheus text on demand.
//!
//! Counters and latency histograms are kept per `(bucket, node)` pair.
//! Every line carries an `agent` label identifying the SDK build; the
//! gateway strips it again when the report is scraped. `export` resets all
//! state, so each report only covers the time since the previous one.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Service an operation was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Kv,
    Query,
    Search,
    Analytics,
}

impl Service {
    pub const ALL: [Service; 4] = [Service::Kv, Service::Query, Service::Search, Service::Analytics];

    pub fn as_str(self) -> &'static str {
        match self {
            Service::Kv => "kv",
            Service::Query => "query",
            Service::Search => "search",
            Service::Analytics => "analytics",
        }
    }
}

/// How an operation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
    AmbiguousTimeout,
    UnambiguousTimeout,
    Cancelled,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Success,
        Outcome::Error,
        Outcome::AmbiguousTimeout,
        Outcome::UnambiguousTimeout,
        Outcome::Cancelled,
    ];

    /// Counter suffix bumped in addition to `r_total`, if any.
    fn counter_suffix(self) -> Option<&'static str> {
        match self {
            Outcome::AmbiguousTimeout => Some("atimedout"),
            Outcome::UnambiguousTimeout => Some("utimedout"),
            Outcome::Cancelled => Some("canceled"),
            Outcome::Success | Outcome::Error => None,
        }
    }
}

/// Latency histogram families, each with fixed upper bounds in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DurationMetric {
    KvRetrieval,
    KvMutationNondurable,
    KvMutationDurable,
    Query,
    Search,
    Analytics,
}

const KV_BOUNDS: &[f64] = &[0.001, 0.01, 0.1, 0.5, 1.0, 2.5];
const KV_DURABLE_BOUNDS: &[f64] = &[0.01, 0.1, 1.0, 2.0, 5.0, 10.0];
const HTTP_SERVICE_BOUNDS: &[f64] = &[0.1, 1.0, 10.0, 30.0, 75.0];

impl DurationMetric {
    pub const ALL: [DurationMetric; 6] = [
        DurationMetric::KvRetrieval,
        DurationMetric::KvMutationNondurable,
        DurationMetric::KvMutationDurable,
        DurationMetric::Query,
        DurationMetric::Search,
        DurationMetric::Analytics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DurationMetric::KvRetrieval => "sdk_kv_retrieval_duration_seconds",
            DurationMetric::KvMutationNondurable => "sdk_kv_mutation_nondurable_duration_seconds",
            DurationMetric::KvMutationDurable => "sdk_kv_mutation_durable_duration_seconds",
            DurationMetric::Query => "sdk_query_duration_seconds",
            DurationMetric::Search => "sdk_search_duration_seconds",
            DurationMetric::Analytics => "sdk_analytics_duration_seconds",
        }
    }

    /// Finite bucket bounds; `+Inf` is implied.
    pub fn bounds(self) -> &'static [f64] {
        match self {
            DurationMetric::KvRetrieval | DurationMetric::KvMutationNondurable => KV_BOUNDS,
            DurationMetric::KvMutationDurable => KV_DURABLE_BOUNDS,
            DurationMetric::Query | DurationMetric::Search | DurationMetric::Analytics => {
                HTTP_SERVICE_BOUNDS
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Histogram {
    bounds: &'static [f64],
    buckets: Vec<u64>,
    sum: f64,
    count: u64,
}

impl Histogram {
    fn new(bounds: &'static [f64]) -> Self {
        Self {
            bounds,
            buckets: vec![0; bounds.len()],
            sum: 0.0,
            count: 0,
        }
    }

    // cumulative: every bucket whose bound is >= the value
    fn observe(&mut self, secs: f64) {
        for (i, &le) in self.bounds.iter().enumerate() {
            if secs <= le {
                self.buckets[i] += 1;
            }
        }
        self.count += 1;
        self.sum += secs;
    }
}

/// `(bucket, node)`
type Endpoint = (String, String);

#[derive(Debug, Default)]
struct Snapshot {
    counters: BTreeMap<Endpoint, BTreeMap<String, u64>>,
    histograms: BTreeMap<Endpoint, BTreeMap<DurationMetric, Histogram>>,
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Thread-safe metric recorder shared by the workload and the reporter.
#[derive(Debug)]
pub struct SdkMetrics {
    agent: String,
    state: Mutex<Snapshot>,
}

impl SdkMetrics {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            state: Mutex::new(Snapshot::default()),
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    fn state(&self) -> MutexGuard<'_, Snapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one finished request: always `r_total`, plus the outcome counter.
    pub fn record_outcome(&self, service: Service, bucket: &str, node: &str, outcome: Outcome) {
        let mut state = self.state();
        let counters = state
            .counters
            .entry((bucket.to_string(), node.to_string()))
            .or_default();

        *counters.entry(format!("sdk_{}_r_total", service.as_str())).or_default() += 1;
        if let Some(suffix) = outcome.counter_suffix() {
            *counters
                .entry(format!("sdk_{}_r_{suffix}", service.as_str()))
                .or_default() += 1;
        }
    }

    /// Observe a latency. The first observation for an endpoint creates every
    /// histogram family for it, so reports always carry the full set.
    pub fn record_latency(&self, metric: DurationMetric, bucket: &str, node: &str, secs: f64) {
        let mut state = self.state();
        let families = state
            .histograms
            .entry((bucket.to_string(), node.to_string()))
            .or_insert_with(|| {
                DurationMetric::ALL
                    .iter()
                    .map(|m| (*m, Histogram::new(m.bounds())))
                    .collect()
            });

        if let Some(h) = families.get_mut(&metric) {
            h.observe(secs);
        }
    }

    /// Render everything recorded so far and reset.
    ///
    /// Counter and bucket lines carry `timestamp_ms`; `_sum` and `_count`
    /// lines do not. Values are rounded to integers.
    pub fn export(&self, timestamp_ms: u64) -> String {
        let snapshot = std::mem::take(&mut *self.state());
        let agent = escape_label(&self.agent);
        let mut lines = Vec::new();

        for ((bucket, node), counters) in &snapshot.counters {
            let labels = format!(
                "agent=\"{agent}\",bucket=\"{}\",node=\"{}\"",
                escape_label(bucket),
                escape_label(node)
            );
            for (metric, value) in counters {
                lines.push(format!("{metric}{{{labels}}} {value} {timestamp_ms}"));
            }
        }

        for ((bucket, node), families) in &snapshot.histograms {
            let labels = format!(
                "agent=\"{agent}\",bucket=\"{}\",node=\"{}\"",
                escape_label(bucket),
                escape_label(node)
            );
            for (metric, h) in families {
                let name = metric.name();
                for (le, count) in h.bounds.iter().zip(&h.buckets) {
                    lines.push(format!(
                        "{name}_bucket{{le=\"{le}\",{labels}}} {count} {timestamp_ms}"
                    ));
                }
                lines.push(format!(
                    "{name}_bucket{{le=\"+Inf\",{labels}}} {} {timestamp_ms}",
                    h.count
                ));
                lines.push(format!("{name}_sum{{{labels}}} {}", h.sum.round() as u64));
                lines.push(format!("{name}_count{{{labels}}} {}", h.count));
            }
        }

        lines.join("\n")
    }

    /// [`export`](Self::export) stamped with the current wall clock.
    pub fn export_now(&self) -> String {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        self.export(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_render_with_labels_and_timestamp() {
        let m = SdkMetrics::new("rust/0.1.0");
        m.record_outcome(Service::Kv, "default", "example.com", Outcome::Success);
        m.record_outcome(Service::Kv, "default", "example.com", Outcome::AmbiguousTimeout);
        m.record_outcome(Service::Query, "foo", "example.org", Outcome::Cancelled);

        let report = m.export(1_700_000_000_000);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"sdk_kv_r_atimedout{agent="rust/0.1.0",bucket="default",node="example.com"} 1 1700000000000"#,
                r#"sdk_kv_r_total{agent="rust/0.1.0",bucket="default",node="example.com"} 2 1700000000000"#,
                r#"sdk_query_r_canceled{agent="rust/0.1.0",bucket="foo",node="example.org"} 1 1700000000000"#,
                r#"sdk_query_r_total{agent="rust/0.1.0",bucket="foo",node="example.org"} 1 1700000000000"#,
            ]
        );
    }

    #[test]
    fn errors_only_bump_total() {
        let m = SdkMetrics::new("a");
        m.record_outcome(Service::Search, "b", "n", Outcome::Error);
        assert_eq!(m.export(5), r#"sdk_search_r_total{agent="a",bucket="b",node="n"} 1 5"#);
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let m = SdkMetrics::new("a");
        m.record_latency(DurationMetric::Query, "b", "n", 0.5);
        m.record_latency(DurationMetric::Query, "b", "n", 12.0);

        let report = m.export(9);
        let query: Vec<&str> = report
            .lines()
            .filter(|l| l.starts_with("sdk_query_duration_seconds"))
            .collect();
        assert_eq!(
            query,
            vec![
                r#"sdk_query_duration_seconds_bucket{le="0.1",agent="a",bucket="b",node="n"} 0 9"#,
                r#"sdk_query_duration_seconds_bucket{le="1",agent="a",bucket="b",node="n"} 1 9"#,
                r#"sdk_query_duration_seconds_bucket{le="10",agent="a",bucket="b",node="n"} 1 9"#,
                r#"sdk_query_duration_seconds_bucket{le="30",agent="a",bucket="b",node="n"} 2 9"#,
                r#"sdk_query_duration_seconds_bucket{le="75",agent="a",bucket="b",node="n"} 2 9"#,
                r#"sdk_query_duration_seconds_bucket{le="+Inf",agent="a",bucket="b",node="n"} 2 9"#,
                r#"sdk_query_duration_seconds_sum{agent="a",bucket="b",node="n"} 13"#,
                r#"sdk_query_duration_seconds_count{agent="a",bucket="b",node="n"} 2"#,
            ]
        );
        // the other five families exist for the endpoint, all empty
        assert!(report.contains(r#"sdk_kv_retrieval_duration_seconds_count{agent="a",bucket="b",node="n"} 0"#));
        assert!(report.contains(r#"sdk_kv_mutation_durable_duration_seconds_bucket{le="0.01","#));
    }

    #[test]
    fn export_resets_state() {
        let m = SdkMetrics::new("a");
        m.record_outcome(Service::Kv, "b", "n", Outcome::Success);
        assert!(!m.export(1).is_empty());
        assert_eq!(m.export(2), "");
    }

    #[test]
    fn label_values_are_escaped() {
        let m = SdkMetrics::new(r#"rust "edge""#);
        m.record_outcome(Service::Kv, "b", "n", Outcome::Success);
        assert!(m.export(1).starts_with(r#"sdk_kv_r_total{agent="rust \"edge\"",bucket="b""#));
    }
}
