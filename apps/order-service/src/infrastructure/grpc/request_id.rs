//! Request correlation ids.
//!
//! The server resolves an id per call from `x-request-id` (or mints one)
//! and runs the handler inside [`scope`]. Outbound clients read it back with
//! [`current`] so upstream calls carry the same id.

use std::future::Future;

use tonic::metadata::MetadataMap;
use uuid::Uuid;

/// Correlation header read from incoming calls and set on outgoing ones.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static CURRENT: String;
}

/// The caller's request id, or a fresh UUID v4 when absent or not ASCII.
#[must_use]
pub fn from_metadata(metadata: &MetadataMap) -> String {
    metadata
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string)
}

/// Run `fut` with `id` as the current request id.
pub async fn scope<F: Future>(id: String, fut: F) -> F::Output {
    CURRENT.scope(id, fut).await
}

/// Request id of the call being served on this task, if any.
#[must_use]
pub fn current() -> Option<String> {
    CURRENT.try_with(Clone::clone).ok()
}
