use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use super::PollError;
use crate::metrics::NodeStatusRecorder;
use crate::models::NodeStatus;

/// Grid endpoint reporting secure node counts.
pub const NODES_URL: &str = "https://securenodes2.eu.zensystem.io/api/grid/nodes";

/// Fetches the node status on a fixed interval and hands every snapshot to a recorder.
pub struct Poller<R: NodeStatusRecorder> {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    recorder: R,
}

impl<R: NodeStatusRecorder> Poller<R> {
    pub fn new(url: impl Into<String>, interval: Duration, recorder: R) -> Self {
        let url = url.into();
        info!(
            "Creating node status poller for '{}' every {}s",
            url,
            interval.as_secs_f64()
        );
        Self {
            client: reqwest::Client::new(),
            url,
            interval,
            recorder,
        }
    }

    /// Performs one fetch, decode and record cycle.
    ///
    /// The HTTP status is not inspected: whatever body comes back must decode,
    /// otherwise the result is a [`PollError::Decode`].
    pub async fn poll_once(&self) -> Result<NodeStatus, PollError> {
        debug!("Sending node status request to: {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(PollError::Transport)?;
        debug!(status = %response.status(), "Received node status response");

        let body = response.bytes().await.map_err(PollError::Body)?;
        let status = NodeStatus::from_slice(&body)?;
        self.recorder.record_node_status(&status);

        let counts = status.counts();
        info!(
            event_name = "poller.node_status.updated",
            event_domain = "poller",
            up = counts.up,
            down = counts.down,
            inactive = counts.inactive,
            "{}",
            status
        );
        info!("Nodes status updated.");
        Ok(status)
    }

    /// Polls until the first failure.
    ///
    /// The first poll happens one full interval after the call. A transport or
    /// body error is logged and ends the loop with `Ok(())`, leaving the recorded
    /// values as they were. A decode error ends the loop with `Err`, as does an
    /// interval too large to schedule.
    pub async fn run(self) -> Result<(), PollError> {
        let start = Instant::now()
            .checked_add(self.interval)
            .ok_or(PollError::Interval(self.interval))?;
        let mut ticker = time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!(
                        event_name = "poller.stopped",
                        event_domain = "poller",
                        url = self.url.as_str(),
                        error = %e,
                        "node status polling stopped"
                    );
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use crate::models::NodeCounts;
    use mockito::Server;

    const PATH: &str = "/api/grid/nodes";

    fn poller(url: String, metrics: &Metrics) -> Poller<Metrics> {
        Poller::new(url, Duration::from_secs(1), metrics.clone())
    }

    /// An address nothing listens on: bind an ephemeral port and release it.
    fn closed_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}{}", addr, PATH)
    }

    #[tokio::test]
    async fn test_poll_once_updates_gauges() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"userdata":{"up":5,"down":1,"inactive":2}}"#)
            .create_async()
            .await;

        let metrics = Metrics::new();
        let status = poller(format!("{}{}", server.url(), PATH), &metrics)
            .poll_once()
            .await
            .unwrap();
        m.assert_async().await;

        let expected = NodeCounts {
            up: 5.0,
            down: 1.0,
            inactive: 2.0,
        };
        assert_eq!(status.counts(), expected);
        assert_eq!(metrics.node_counts(), expected);
    }

    #[tokio::test]
    async fn test_poll_once_ignores_http_status() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", PATH)
            .with_status(503)
            .with_body(r#"{"userdata":{"up":3}}"#)
            .create_async()
            .await;

        let metrics = Metrics::new();
        let status = poller(format!("{}{}", server.url(), PATH), &metrics)
            .poll_once()
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(status.userdata.up, 3.0);
        assert_eq!(metrics.node_counts().up, 3.0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_fatal() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let metrics = Metrics::new();
        let err = poller(format!("{}{}", server.url(), PATH), &metrics)
            .poll_once()
            .await
            .unwrap_err();
        m.assert_async().await;
        assert!(matches!(err, PollError::Decode(_)));
        assert_eq!(metrics.node_counts(), NodeCounts::default());
    }

    #[tokio::test]
    async fn test_run_returns_err_on_malformed_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body("{\"userdata\":")
            .create_async()
            .await;

        let metrics = Metrics::new();
        let result = time::timeout(
            Duration::from_secs(5),
            poller(format!("{}{}", server.url(), PATH), &metrics).run(),
        )
        .await
        .expect("poller should stop on decode error");
        assert!(matches!(result, Err(PollError::Decode(_))));
    }

    #[tokio::test]
    async fn test_transport_error_is_not_fatal() {
        let metrics = Metrics::new();
        let err = poller(closed_url(), &metrics).poll_once().await.unwrap_err();
        assert!(matches!(err, PollError::Transport(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_run_stops_quietly_on_transport_error() {
        let metrics = Metrics::new();
        metrics.record_node_status(&NodeStatus {
            userdata: NodeCounts {
                up: 8.0,
                down: 2.0,
                inactive: 1.0,
            },
        });

        let result = time::timeout(Duration::from_secs(5), poller(closed_url(), &metrics).run())
            .await
            .expect("poller should stop on transport error");
        assert!(result.is_ok());
        assert_eq!(metrics.node_counts().up, 8.0);
        assert_eq!(metrics.node_counts().down, 2.0);
        assert_eq!(metrics.node_counts().inactive, 1.0);
    }

    #[tokio::test]
    async fn test_run_polls_on_interval() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body(r#"{"userdata":{"up":5,"down":1,"inactive":2}}"#)
            .expect_at_least(2)
            .create_async()
            .await;

        let metrics = Metrics::new();
        let outcome = time::timeout(
            Duration::from_millis(2500),
            poller(format!("{}{}", server.url(), PATH), &metrics).run(),
        )
        .await;
        assert!(outcome.is_err(), "poller should still be running");
        m.assert_async().await;
        assert_eq!(metrics.node_counts().up, 5.0);
    }

    #[tokio::test]
    async fn test_run_rejects_unschedulable_interval() {
        let metrics = Metrics::new();
        let poller = Poller::new(closed_url(), Duration::from_secs(u64::MAX), metrics);
        let result = time::timeout(Duration::from_secs(5), poller.run())
            .await
            .expect("poller should return immediately");
        let err = result.unwrap_err();
        assert!(matches!(err, PollError::Interval(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_run_waits_one_interval_before_first_poll() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body(r#"{"userdata":{"up":5,"down":1,"inactive":2}}"#)
            .expect(0)
            .create_async()
            .await;

        let metrics = Metrics::new();
        let _ = time::timeout(
            Duration::from_millis(500),
            poller(format!("{}{}", server.url(), PATH), &metrics).run(),
        )
        .await;
        m.assert_async().await;
        assert_eq!(metrics.node_counts(), NodeCounts::default());
    }
}
