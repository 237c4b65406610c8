//! Asynchronous server-side operations
//!
//! Some requests (remote upload, for example) are answered with a link to a
//! status document instead of a result. An [`OperationHandler`] follows that
//! link until the operation reaches a terminal status.

use std::fmt;
use std::time::Duration;

use jiff::Timestamp;

use crate::client::DiskClient;
use crate::error::Result;
use crate::transport::{HttpRequest, HttpTransport, Method};
use crate::types::{Link, OperationInfo, from_payload};

/// Source of the current time for polling decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Status of an asynchronous operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OperationStatus {
    /// Not checked yet
    #[default]
    Undefined,
    InProgress,
    Success,
    Failed,
    /// A status string this client does not know
    Other(String),
}

impl OperationStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "in-progress" => OperationStatus::InProgress,
            "success" => OperationStatus::Success,
            "failed" => OperationStatus::Failed,
            other => OperationStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OperationStatus::Undefined => "undefined",
            OperationStatus::InProgress => "in-progress",
            OperationStatus::Success => "success",
            OperationStatus::Failed => "failed",
            OperationStatus::Other(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Success | OperationStatus::Failed)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookkeeping for one polling session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollState {
    last_check: Option<Timestamp>,
    check_count: u32,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the last status request actually sent
    pub fn last_check(&self) -> Option<Timestamp> {
        self.last_check
    }

    /// Number of status requests actually sent
    pub fn check_count(&self) -> u32 {
        self.check_count
    }

    /// Whether a check at `now` would come too soon after the previous one
    pub fn is_throttled(&self, now: Timestamp, min_interval: Duration) -> bool {
        match self.last_check {
            Some(last) if self.check_count > 0 => elapsed(last, now) < min_interval,
            _ => false,
        }
    }

    fn record_check(&mut self, now: Timestamp) {
        self.last_check = Some(now);
        self.check_count += 1;
    }
}

/// Time from `since` to `now`, zero if the clock went backwards
pub(crate) fn elapsed(since: Timestamp, now: Timestamp) -> Duration {
    Duration::try_from(now.duration_since(since)).unwrap_or(Duration::ZERO)
}

/// Handle to one asynchronous operation
///
/// The status only moves toward `Success` or `Failed`; once terminal no
/// further requests are made.
pub struct OperationHandler<'a, T> {
    client: &'a DiskClient<T>,
    name: String,
    status_url: String,
    status: OperationStatus,
}

impl<'a, T: HttpTransport> OperationHandler<'a, T> {
    pub fn new(client: &'a DiskClient<T>, name: impl Into<String>, link: Link) -> Self {
        Self {
            client,
            name: name.into(),
            status_url: link.href,
            status: OperationStatus::Undefined,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    /// Status seen by the last check
    pub fn status(&self) -> &OperationStatus {
        &self.status
    }

    /// Refresh the status from the server
    ///
    /// Skips the request when the operation is already terminal or when the
    /// previous check in `state` was less than the configured minimum
    /// interval ago; the last known status is returned in both cases.
    pub async fn check_status(&mut self, state: &mut PollState) -> Result<OperationStatus> {
        if self.status.is_terminal() {
            return Ok(self.status.clone());
        }

        let now = self.client.clock().now();
        let min_interval = self.client.config().poll.min_check_interval();
        if state.is_throttled(now, min_interval) {
            return Ok(self.status.clone());
        }

        state.record_check(now);
        tracing::debug!(
            operation = %self.name,
            check = state.check_count(),
            "checking operation status"
        );

        let payload = self
            .client
            .execute(HttpRequest::new(Method::Get, &self.status_url))
            .await?;
        let info: OperationInfo = from_payload(payload)?;
        self.status = OperationStatus::parse(&info.status);

        tracing::debug!(operation = %self.name, status = %self.status, "operation status");
        Ok(self.status.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::error::Error;
    use crate::testing::{ManualClock, respond};
    use crate::transport::{HttpResponse, MockHttpTransport};

    const STATUS_URL: &str = "https://api.example/v1/disk/operations/42";

    fn link() -> Link {
        Link {
            href: STATUS_URL.into(),
            method: Some("GET".into()),
            templated: false,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(OperationStatus::parse("success"), OperationStatus::Success);
        assert_eq!(OperationStatus::parse("failed"), OperationStatus::Failed);
        assert_eq!(
            OperationStatus::parse("in-progress"),
            OperationStatus::InProgress
        );
        assert_eq!(
            OperationStatus::parse("queued"),
            OperationStatus::Other("queued".into())
        );
        assert_eq!(OperationStatus::Other("queued".into()).to_string(), "queued");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OperationStatus::Success.is_terminal());
        assert!(OperationStatus::Failed.is_terminal());
        assert!(!OperationStatus::InProgress.is_terminal());
        assert!(!OperationStatus::Undefined.is_terminal());
        assert!(!OperationStatus::Other("queued".into()).is_terminal());
    }

    #[test]
    fn test_poll_state_throttle() {
        let start = Timestamp::from_second(1_700_000_000).unwrap();
        let mut state = PollState::new();
        let min = Duration::from_secs(3);

        assert!(!state.is_throttled(start, min));
        state.record_check(start);
        assert_eq!(state.check_count(), 1);
        assert_eq!(state.last_check(), Some(start));

        let later = start.checked_add(Duration::from_secs(2)).unwrap();
        assert!(state.is_throttled(later, min));
        let later = start.checked_add(Duration::from_secs(3)).unwrap();
        assert!(!state.is_throttled(later, min));
    }

    #[test]
    fn test_elapsed_never_negative() {
        let start = Timestamp::from_second(1_700_000_000).unwrap();
        let earlier = Timestamp::from_second(1_699_999_990).unwrap();
        assert_eq!(elapsed(start, earlier), Duration::ZERO);
        assert_eq!(elapsed(earlier, start), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_check_status_sends_authorized_request() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Get
                    && req.url == STATUS_URL
                    && req.header_value("Authorization") == Some("OAuth token")
            })
            .times(1)
            .returning(respond(200, r#"{"status":"in-progress"}"#));

        let client = DiskClient::new("token", transport);
        let mut op = OperationHandler::new(&client, "upload", link());
        let mut state = PollState::new();

        assert_eq!(op.status(), &OperationStatus::Undefined);
        let status = op.check_status(&mut state).await.unwrap();
        assert_eq!(status, OperationStatus::InProgress);
        assert_eq!(state.check_count(), 1);
    }

    #[tokio::test]
    async fn test_check_status_throttled_within_min_interval() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(2)
            .returning(respond(200, r#"{"status":"in-progress"}"#));

        let clock = Arc::new(ManualClock::new());
        let client = DiskClient::new("token", transport).with_clock(clock.clone());
        let mut op = OperationHandler::new(&client, "upload", link());
        let mut state = PollState::new();

        op.check_status(&mut state).await.unwrap();
        clock.advance(Duration::from_secs(1));
        op.check_status(&mut state).await.unwrap();
        clock.advance(Duration::from_millis(1999));
        op.check_status(&mut state).await.unwrap();
        assert_eq!(state.check_count(), 1);

        clock.advance(Duration::from_millis(1));
        op.check_status(&mut state).await.unwrap();
        assert_eq!(state.check_count(), 2);
    }

    #[tokio::test]
    async fn test_terminal_status_is_sticky() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(respond(200, r#"{"status":"success"}"#));

        let clock = Arc::new(ManualClock::new());
        let client = DiskClient::new("token", transport).with_clock(clock.clone());
        let mut op = OperationHandler::new(&client, "upload", link());
        let mut state = PollState::new();

        assert_eq!(
            op.check_status(&mut state).await.unwrap(),
            OperationStatus::Success
        );
        clock.advance(Duration::from_secs(60));
        assert_eq!(
            op.check_status(&mut state).await.unwrap(),
            OperationStatus::Success
        );
        assert_eq!(state.check_count(), 1);
    }

    #[tokio::test]
    async fn test_check_status_propagates_unauthorized() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::new(401, "")));

        let client = DiskClient::new("expired", transport);
        let mut op = OperationHandler::new(&client, "upload", link());
        let err = op.check_status(&mut PollState::new()).await.unwrap_err();

        assert!(matches!(err, Error::Unauthorized { ref token } if token == "expired"));
        assert_eq!(op.status(), &OperationStatus::Undefined);
    }

    #[tokio::test]
    async fn test_status_document_without_status_is_error() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(respond(200, r#"{"state":"done"}"#));

        let client = DiskClient::new("token", transport);
        let mut op = OperationHandler::new(&client, "upload", link());

        assert!(matches!(
            op.check_status(&mut PollState::new()).await,
            Err(Error::Json(_))
        ));
    }
}
