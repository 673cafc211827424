//! Shared utilities for use cases.
//!
//! Timeout and cancellation wrappers around a single gateway call, used by
//! the fan-out, the consensus turn loop and the conversion call.

use crate::ports::chat_gateway::{ChatCompletion, ChatGateway, ChatRequest, GatewayError};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Issue one request, turning an elapsed timeout into [`GatewayError::Timeout`].
pub(crate) async fn complete_with_timeout(
    gateway: &dyn ChatGateway,
    request: &ChatRequest,
    timeout: Option<Duration>,
) -> Result<ChatCompletion, GatewayError> {
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, gateway.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(limit)),
        },
        None => gateway.complete(request).await,
    }
}

/// Run `future` unless the token fires first. `None` means cancelled.
pub(crate) async fn cancellable<F: Future>(
    token: &Option<CancellationToken>,
    future: F,
) -> Option<F::Output> {
    match token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = future => Some(output),
            }
        }
        None => Some(future.await),
    }
}
