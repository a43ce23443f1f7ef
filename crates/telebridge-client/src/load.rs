//! Synthetic SDK workload that feeds the recorder.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::recorder::{DurationMetric, Outcome, SdkMetrics, Service};

const KV_LATENCY_METRICS: [DurationMetric; 3] = [
    DurationMetric::KvRetrieval,
    DurationMetric::KvMutationDurable,
    DurationMetric::KvMutationNondurable,
];

/// Buckets and nodes the simulated operations are spread over.
#[derive(Debug, Clone)]
pub struct Workload {
    pub buckets: Vec<String>,
    pub nodes: Vec<String>,
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            buckets: ["default", "foo", "bar", "travel-sample"].map(String::from).to_vec(),
            nodes: ["example.com", "example.org", "example.net"].map(String::from).to_vec(),
        }
    }
}

impl Workload {
    /// Record one random operation. Successful operations also record a
    /// latency between 10 ms and 3 s.
    pub fn simulate_operation<R: Rng>(&self, rng: &mut R, metrics: &SdkMetrics) {
        let (Some(bucket), Some(node)) = (self.buckets.choose(rng), self.nodes.choose(rng)) else {
            return;
        };
        let service = Service::ALL[rng.gen_range(0..Service::ALL.len())];
        let outcome = Outcome::ALL[rng.gen_range(0..Outcome::ALL.len())];

        metrics.record_outcome(service, bucket, node, outcome);
        if outcome == Outcome::Success {
            let metric = latency_metric(service, rng);
            metrics.record_latency(metric, bucket, node, rng.gen_range(0.01..3.0));
        }
    }
}

fn latency_metric<R: Rng>(service: Service, rng: &mut R) -> DurationMetric {
    match service {
        Service::Kv => KV_LATENCY_METRICS[rng.gen_range(0..KV_LATENCY_METRICS.len())],
        Service::Query => DurationMetric::Query,
        Service::Search => DurationMetric::Search,
        Service::Analytics => DurationMetric::Analytics,
    }
}
