//! Test doubles for the fetch port.
//!
//! [`StubFetch`] resolves queued responses without touching the network,
//! and can suspend once before resolving so orchestration tests can act
//! inside the window between request and resolution.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::task::Poll;

use async_trait::async_trait;
use serde_json::Value;

use super::{FetchError, JsonFetch};

/// Stub [`JsonFetch`] returning pre-configured resolutions.
///
/// Each call consumes the next queued resolution; an exhausted stub
/// resolves to a network error naming the URL.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use waymark_ingest::JsonFetch;
/// use waymark_ingest::net::test_support::StubFetch;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let stub = StubFetch::with_response(json!({ "info": { "version": "2.0.0" } }));
/// let document = stub.fetch_json("https://example.org/c.json").await.unwrap();
/// assert_eq!(document["info"]["version"], "2.0.0");
/// assert_eq!(stub.requests(), ["https://example.org/c.json"]);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct StubFetch {
    responses: RefCell<VecDeque<Result<Value, FetchError>>>,
    pending_once: Cell<bool>,
    requests: RefCell<Vec<String>>,
}

impl StubFetch {
    /// Stub whose first call resolves to the given document.
    #[must_use]
    pub fn with_response(document: Value) -> Self {
        Self::default().then_resolve(Ok(document))
    }

    /// Stub whose first call resolves to the given error.
    #[must_use]
    pub fn with_error(error: FetchError) -> Self {
        Self::default().then_resolve(Err(error))
    }

    /// Queue a further resolution behind any already queued.
    #[must_use]
    pub fn then_resolve(self, response: Result<Value, FetchError>) -> Self {
        self.responses.borrow_mut().push_back(response);
        self
    }

    /// Suspend at the first poll of the next call before resolving.
    #[must_use]
    pub fn pending_once(self) -> Self {
        self.pending_once.set(true);
        self
    }

    /// URLs requested so far, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl JsonFetch for StubFetch {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        self.requests.borrow_mut().push(url.to_owned());
        if self.pending_once.replace(false) {
            yield_now().await;
        }
        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Err(FetchError::Network {
                url: url.to_owned(),
                message: "stub exhausted".to_owned(),
            })
        })
    }
}

/// Yield to the executor exactly once.
async fn yield_now() {
    let mut yielded = false;
    std::future::poll_fn(move |cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await;
}
