//! Metrics Collection
//!
//! Collects and exposes metrics for monitoring the responder.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::wire::ResponseCode;

/// Metrics collector for the DNS responder
#[derive(Default)]
pub struct Metrics {
    /// Start time for uptime calculation
    start_time: Option<Instant>,

    /// Datagrams read from the socket
    pub datagrams_received: AtomicU64,

    /// Responses written back
    pub responses_sent: AtomicU64,

    /// Responses that could not be sent
    pub send_failures: AtomicU64,

    /// Datagrams that failed to decode
    pub decode_errors: AtomicU64,

    /// Responses by result code
    pub rcode_noerror: AtomicU64,
    pub rcode_formerr: AtomicU64,
    pub rcode_servfail: AtomicU64,
    pub rcode_nxdomain: AtomicU64,
    pub rcode_notimp: AtomicU64,
    pub rcode_other: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub datagrams_received: u64,
    pub responses_sent: u64,
    pub send_failures: u64,
    pub decode_errors: u64,
    pub noerror: u64,
    pub formerr: u64,
    pub servfail: u64,
    pub nxdomain: u64,
    pub notimp: u64,
    pub other: u64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    pub fn inc_datagrams_received(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_responses_sent(&self) {
        self.responses_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_decode_errors(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one response with the given result code
    pub fn record_rcode(&self, rcode: ResponseCode) {
        let counter = match rcode {
            ResponseCode::NoError => &self.rcode_noerror,
            ResponseCode::FormErr => &self.rcode_formerr,
            ResponseCode::ServFail => &self.rcode_servfail,
            ResponseCode::NXDomain => &self.rcode_nxdomain,
            ResponseCode::NotImp => &self.rcode_notimp,
            ResponseCode::Refused | ResponseCode::Unknown(_) => &self.rcode_other,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.uptime_secs(),
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            responses_sent: self.responses_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            noerror: self.rcode_noerror.load(Ordering::Relaxed),
            formerr: self.rcode_formerr.load(Ordering::Relaxed),
            servfail: self.rcode_servfail.load(Ordering::Relaxed),
            nxdomain: self.rcode_nxdomain.load(Ordering::Relaxed),
            notimp: self.rcode_notimp.load(Ordering::Relaxed),
            other: self.rcode_other.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format
    pub fn to_prometheus(&self) -> String {
        let s = self.snapshot();
        let mut output = String::new();

        output.push_str(&format!(
            "# HELP dns_responder_uptime_seconds Responder uptime in seconds\n\
             # TYPE dns_responder_uptime_seconds gauge\n\
             dns_responder_uptime_seconds {}\n\n",
            s.uptime_secs
        ));

        output.push_str(&format!(
            "# HELP dns_responder_datagrams_received_total Datagrams received\n\
             # TYPE dns_responder_datagrams_received_total counter\n\
             dns_responder_datagrams_received_total {}\n\n",
            s.datagrams_received
        ));

        output.push_str(&format!(
            "# HELP dns_responder_responses_sent_total Responses sent\n\
             # TYPE dns_responder_responses_sent_total counter\n\
             dns_responder_responses_sent_total {}\n\n",
            s.responses_sent
        ));

        output.push_str(&format!(
            "# HELP dns_responder_send_failures_total Responses that failed to send\n\
             # TYPE dns_responder_send_failures_total counter\n\
             dns_responder_send_failures_total {}\n\n",
            s.send_failures
        ));

        output.push_str(&format!(
            "# HELP dns_responder_decode_errors_total Undecodable datagrams\n\
             # TYPE dns_responder_decode_errors_total counter\n\
             dns_responder_decode_errors_total {}\n\n",
            s.decode_errors
        ));

        // Result codes
        output.push_str(
            "# HELP dns_responder_responses_by_rcode_total Responses by result code\n\
             # TYPE dns_responder_responses_by_rcode_total counter\n",
        );
        for (rcode, value) in [
            ("NOERROR", s.noerror),
            ("FORMERR", s.formerr),
            ("SERVFAIL", s.servfail),
            ("NXDOMAIN", s.nxdomain),
            ("NOTIMP", s.notimp),
            ("OTHER", s.other),
        ] {
            output.push_str(&format!(
                "dns_responder_responses_by_rcode_total{{rcode=\"{}\"}} {}\n",
                rcode, value
            ));
        }

        output
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        let s = self.snapshot();
        serde_json::json!({
            "uptime_secs": s.uptime_secs,
            "datagrams": {
                "received": s.datagrams_received,
                "responses_sent": s.responses_sent,
                "send_failures": s.send_failures,
                "decode_errors": s.decode_errors,
            },
            "rcodes": {
                "noerror": s.noerror,
                "formerr": s.formerr,
                "servfail": s.servfail,
                "nxdomain": s.nxdomain,
                "notimp": s.notimp,
                "other": s.other,
            },
        })
    }
}
