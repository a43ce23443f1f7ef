//! Label stripping applied to telemetry reports at drain time.
//!
//! Clients tag their series with an `agent="..."` label (the SDK user agent).
//! Reports gathered over the duplex connection and reports gathered by a
//! direct scrape describe the same measurements, so the label is removed to
//! keep them on one series key. Merging counters/histograms that become
//! duplicates after stripping is not done here.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// `agent="<anything but a quote>"` plus an optional trailing comma.
#[allow(clippy::expect_used)]
static AGENT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"agent="[^"]*",?"#).expect("invalid agent label pattern"));

/// Remove every `agent` label from `report`, leaving everything else as is.
///
/// Borrows when there is nothing to strip. Idempotent.
pub fn strip_agent_label(report: &str) -> Cow<'_, str> {
    AGENT_LABEL.replace_all(report, "")
}
