//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webhook_events_total` (counter): accepted webhooks by `event`, where
//!   names outside [`KNOWN_EVENTS`] are counted as `other`
//! - `webhook_rejected_total` (counter): rejected webhooks by `reason`
//! - `http_requests_total` (counter): requests by `path`, `status`
//! - `http_active_connections` (gauge): open client connections
//!
//! Without an installed exporter every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()
}

/// Confluence event names that get their own label value.
pub const KNOWN_EVENTS: &[&str] = &[
    "page_created",
    "page_updated",
    "page_removed",
    "page_trashed",
    "page_restored",
    "page_moved",
    "page_children_reordered",
    "blog_created",
    "blog_updated",
    "blog_removed",
    "blog_trashed",
    "blog_restored",
    "comment_created",
    "comment_updated",
    "comment_removed",
    "attachment_created",
    "attachment_updated",
    "attachment_removed",
    "attachment_trashed",
    "attachment_restored",
    "label_added",
    "label_removed",
    "label_created",
    "label_deleted",
    "space_created",
    "space_updated",
    "space_removed",
    "user_created",
    "user_removed",
    "user_deactivated",
    "user_reactivated",
    "group_created",
    "group_removed",
];

/// Bounded label value for a client-supplied event name.
pub fn event_label(event: &str) -> &'static str {
    KNOWN_EVENTS
        .iter()
        .copied()
        .find(|known| *known == event)
        .unwrap_or("other")
}

pub fn record_webhook_event(event: &str) {
    metrics::counter!("webhook_events_total", "event" => event_label(event)).increment(1);
}

pub fn record_webhook_rejected(reason: &'static str) {
    metrics::counter!("webhook_rejected_total", "reason" => reason).increment(1);
}

/// `path` must already be bounded by the caller.
pub fn record_request(path: &'static str, status: u16) {
    metrics::counter!(
        "http_requests_total",
        "path" => path,
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_active_connections(count: u64) {
    metrics::gauge!("http_active_connections").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_events_keep_their_label() {
        assert_eq!(event_label("page_created"), "page_created");
        assert_eq!(event_label("attachment_trashed"), "attachment_trashed");
    }

    #[test]
    fn client_chosen_names_collapse_to_other() {
        assert_eq!(event_label(""), "other");
        assert_eq!(event_label("Page_Created"), "other");
        assert_eq!(event_label("page_created\nforged"), "other");
        assert_eq!(event_label(&"x".repeat(4096)), "other");
    }
}
