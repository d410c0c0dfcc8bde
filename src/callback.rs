//! Completion-handler invocation style
//!
//! Every client operation is a future resolving to `Result<T, BlockfolioError>`.
//! Awaiting it directly is the deferred style; the [`Callback`] adapter turns
//! the same future into a call of `handler(error, result)`.
//!
//! ```no_run
//! use blockfolio_sdk::{BlockfolioClient, Callback, MarketOptions};
//!
//! # async fn example(client: BlockfolioClient) {
//! client
//!     .get_price("AEON/BTC", MarketOptions::default())
//!     .on_complete(|err, price| match err {
//!         Some(err) => eprintln!("{}", err.message()),
//!         None => println!("AEON: {:?}", price),
//!     })
//!     .await;
//! # }
//! ```

use crate::error::BlockfolioError;
use futures::FutureExt;
use std::future::Future;
use tokio::task::JoinHandle;

/// Adapter from an operation future to a completion handler
pub trait Callback<T>: Future<Output = Result<T, BlockfolioError>> + Sized {
    /// Resolves the operation, then calls `handler`; error is `None` on success
    fn on_complete<H>(self, handler: H) -> impl Future<Output = ()>
    where
        H: FnOnce(Option<BlockfolioError>, Option<T>),
    {
        self.map(move |result| match result {
            Ok(value) => handler(None, Some(value)),
            Err(err) => handler(Some(err), None),
        })
    }

    /// Same as [`on_complete`](Self::on_complete), spawned on the tokio runtime
    fn spawn_with<H>(self, handler: H) -> JoinHandle<()>
    where
        Self: Send + 'static,
        T: Send + 'static,
        H: FnOnce(Option<BlockfolioError>, Option<T>) + Send + 'static,
    {
        tokio::spawn(self.map(move |result| match result {
            Ok(value) => handler(None, Some(value)),
            Err(err) => handler(Some(err), None),
        }))
    }
}

impl<T, F> Callback<T> for F where F: Future<Output = Result<T, BlockfolioError>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_success_passes_result() {
        let mut seen = None;
        async { Ok::<_, BlockfolioError>(42u32) }
            .on_complete(|err, value| seen = Some((err, value)))
            .await;
        assert_eq!(seen, Some((None, Some(42))));
    }

    #[tokio::test]
    async fn test_failure_passes_same_error() {
        let failing = || async { Err::<u32, _>(BlockfolioError::Uninitialized) };

        let mut seen = None;
        failing().on_complete(|err, value| seen = Some((err, value))).await;
        let awaited = failing().await.unwrap_err();

        assert_eq!(seen, Some((Some(awaited), None)));
    }

    #[tokio::test]
    async fn test_spawn_with() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        async { Ok::<_, BlockfolioError>("success".to_string()) }
            .spawn_with(move |err, value| *sink.lock().unwrap() = Some((err, value)))
            .await
            .unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            Some((None, Some("success".to_string())))
        );
    }
}
