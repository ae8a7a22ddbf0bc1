//! Request supersession for weather fetches.
//!
//! Each map click starts a new request generation. Only the newest
//! generation's response may reach the caller; older in-flight work is
//! aborted or, if it already finished, discarded.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generation tag handed out by [`RequestGate::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Monotonic generation counter deciding which response is current.
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    generation: Arc<AtomicU64>,
}

impl RequestGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier token.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Pass `value` through only if `token` is still the newest request.
    pub fn accept<T>(&self, token: RequestToken, value: T) -> Option<T> {
        if self.is_current(token) {
            Some(value)
        } else {
            log::debug!(
                "dropping stale response for request {} (current {})",
                token.0,
                self.generation.load(Ordering::SeqCst)
            );
            None
        }
    }
}

#[cfg(feature = "async")]
pub use self::tasks::{SupersedingFetcher, WeatherSource};

#[cfg(feature = "async")]
mod tasks {
    use super::{RequestGate, RequestToken};
    use crate::error::SimResult;
    use crate::upstream::UpstreamRequest;
    use crate::weather::RawDay;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;

    /// Remote weather provider seam.
    #[async_trait]
    pub trait WeatherSource: Send + Sync + 'static {
        /// Fetch the raw daily series for a request.
        async fn fetch(&self, request: &UpstreamRequest) -> SimResult<Vec<RawDay>>;
    }

    /// Runs at most one fetch at a time; a new request aborts the previous one.
    pub struct SupersedingFetcher<S: WeatherSource> {
        source: Arc<S>,
        gate: RequestGate,
        in_flight: Mutex<Option<JoinHandle<()>>>,
    }

    impl<S: WeatherSource> SupersedingFetcher<S> {
        #[must_use]
        pub fn new(source: S) -> Self {
            Self {
                source: Arc::new(source),
                gate: RequestGate::new(),
                in_flight: Mutex::new(None),
            }
        }

        #[must_use]
        pub fn gate(&self) -> &RequestGate {
            &self.gate
        }

        /// Fetch for `request`, superseding anything still running.
        ///
        /// Resolves to `None` when a newer request superseded this one,
        /// either by aborting the task or by arriving first.
        pub async fn fetch(&self, request: UpstreamRequest) -> Option<SimResult<Vec<RawDay>>> {
            let token = self.gate.begin();
            let (tx, rx) = tokio::sync::oneshot::channel();
            let source = Arc::clone(&self.source);
            let handle = tokio::spawn(async move {
                let result = source.fetch(&request).await;
                let _ = tx.send(result);
            });

            if let Some(previous) = self.in_flight.lock().await.replace(handle) {
                previous.abort();
            }

            let result = rx.await.ok()?;
            self.finish(token, result)
        }

        fn finish(
            &self,
            token: RequestToken,
            result: SimResult<Vec<RawDay>>,
        ) -> Option<SimResult<Vec<RawDay>>> {
            self.gate.accept(token, result)
        }

        /// Abort whatever is running and invalidate its response.
        pub async fn cancel(&self) {
            self.gate.begin();
            if let Some(handle) = self.in_flight.lock().await.take() {
                handle.abort();
            }
        }
    }
}
