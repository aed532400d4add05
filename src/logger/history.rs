//! Recent request history
//!
//! Backs the `/logs` diagnostic endpoint. Keeps the last `capacity` requests,
//! a running total and the set of distinct client addresses.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::net::IpAddr;
use std::sync::Mutex;

/// One recorded request
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RequestRecord {
    pub timestamp: String,
    pub method: String,
    pub url: String,
    pub client_ip: IpAddr,
    pub user_agent: Option<String>,
}

impl RequestRecord {
    pub fn now(method: &str, url: &str, client_ip: IpAddr, user_agent: Option<&str>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            method: method.to_string(),
            url: url.to_string(),
            client_ip,
            user_agent: user_agent.map(ToString::to_string),
        }
    }
}

/// Summary returned by `/logs`
#[derive(Debug, Serialize)]
pub struct HistorySnapshot {
    pub total_requests: u64,
    pub last_requests: Vec<RequestRecord>,
    pub unique_ips: usize,
}

#[derive(Default)]
struct Inner {
    recent: VecDeque<RequestRecord>,
    total: u64,
    clients: HashSet<IpAddr>,
}

/// Bounded, thread-safe request history
pub struct RequestHistory {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl RequestHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn record(&self, record: RequestRecord) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.total += 1;
        inner.clients.insert(record.client_ip);
        if self.capacity == 0 {
            return;
        }
        if inner.recent.len() == self.capacity {
            inner.recent.pop_front();
        }
        inner.recent.push_back(record);
    }

    /// Snapshot with at most `last` of the most recent requests, oldest first
    pub fn snapshot(&self, last: usize) -> HistorySnapshot {
        let Ok(inner) = self.inner.lock() else {
            return HistorySnapshot {
                total_requests: 0,
                last_requests: Vec::new(),
                unique_ips: 0,
            };
        };
        let skip = inner.recent.len().saturating_sub(last);
        HistorySnapshot {
            total_requests: inner.total,
            last_requests: inner.recent.iter().skip(skip).cloned().collect(),
            unique_ips: inner.clients.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, ip: &str) -> RequestRecord {
        RequestRecord::now("GET", url, ip.parse().unwrap(), Some("curl/8.0"))
    }

    #[test]
    fn test_snapshot_returns_most_recent_in_order() {
        let history = RequestHistory::new(100);
        for i in 0..15 {
            history.record(record(&format!("/page/{i}"), "10.0.0.1"));
        }

        let snap = history.snapshot(10);
        assert_eq!(snap.total_requests, 15);
        assert_eq!(snap.last_requests.len(), 10);
        assert_eq!(snap.last_requests[0].url, "/page/5");
        assert_eq!(snap.last_requests[9].url, "/page/14");
    }

    #[test]
    fn test_capacity_bounds_recent_but_not_totals() {
        let history = RequestHistory::new(3);
        history.record(record("/", "10.0.0.1"));
        history.record(record("/", "10.0.0.2"));
        history.record(record("/", "10.0.0.1"));
        history.record(record("/assets/app.js", "10.0.0.3"));

        let snap = history.snapshot(10);
        assert_eq!(snap.total_requests, 4);
        assert_eq!(snap.last_requests.len(), 3);
        assert_eq!(snap.unique_ips, 3);
        assert_eq!(snap.last_requests[2].url, "/assets/app.js");
    }
}
