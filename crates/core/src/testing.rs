//! Shared helpers for unit tests

use std::sync::Mutex;
use std::time::Duration;

use jiff::Timestamp;

use crate::error::Result;
use crate::operation::Clock;
use crate::transport::{HttpRequest, HttpResponse};

/// Clock that only moves when told to, or by `step` on every read
pub(crate) struct ManualClock {
    now: Mutex<Timestamp>,
    step: Duration,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self::stepping(Duration::ZERO)
    }

    pub(crate) fn stepping(step: Duration) -> Self {
        Self {
            now: Mutex::new(Timestamp::from_second(1_700_000_000).unwrap()),
            step,
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = now.checked_add(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let mut now = self.now.lock().unwrap();
        let current = *now;
        *now = current.checked_add(self.step).unwrap();
        current
    }
}

/// Mock responder returning the same status and body every time
pub(crate) fn respond(
    status: u16,
    body: &'static str,
) -> impl FnMut(HttpRequest) -> Result<HttpResponse> + Send + 'static {
    move |_| Ok(HttpResponse::new(status, body))
}
