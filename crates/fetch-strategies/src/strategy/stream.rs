//! Awaitable view over a strategy's forwarded responses.

use fetch_domain::SealedResponse;
use tokio::sync::mpsc;

use super::dispatch::{Sources, Strategy};
use crate::error::Result;

/// Responses forwarded by one strategy call, in forwarding order.
///
/// The stream ends once every continuation that could still forward a
/// response has run or been dropped. A source that never calls its
/// continuation keeps the stream open.
#[derive(Debug)]
pub struct ResponseStream<T> {
    rx: mpsc::UnboundedReceiver<SealedResponse<T>>,
}

impl<T> ResponseStream<T> {
    /// Wait for the next forwarded response, `None` once the strategy is done
    pub async fn recv(&mut self) -> Option<SealedResponse<T>> {
        self.rx.recv().await
    }

    /// Wait for the strategy to finish and return everything it forwarded
    pub async fn collect(mut self) -> Vec<SealedResponse<T>> {
        let mut responses = Vec::new();
        while let Some(response) = self.recv().await {
            responses.push(response);
        }
        responses
    }
}

impl Strategy {
    /// Run the strategy, receiving its responses through a [`ResponseStream`].
    ///
    /// # Errors
    ///
    /// Same as [`Strategy::execute`].
    pub fn responses<T>(self, sources: Sources<T>) -> Result<ResponseStream<T>>
    where
        T: Clone + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        self.execute(sources, move |response| {
            if tx.send(response).is_err() {
                tracing::trace!("Response stream dropped, discarding response");
            }
        })?;
        Ok(ResponseStream { rx })
    }
}
