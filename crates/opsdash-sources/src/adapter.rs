//! The source adapter contract consumed by the refresh scheduler
//!
//! Every backend, regardless of API shape, is reduced to this interface: a
//! stable identity, an enabled flag derived from "are the required config
//! fields present", and one bounded fetch. Version differences between
//! backend API generations stay inside the adapter, invisible to the core.

use async_trait::async_trait;
use opsdash_core::{Result, SourceId, StatusRow};

/// The result of one adapter fetch: normalized rows plus any panel-level
/// extras (only analytics uses the active-users figure today).
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    /// Normalized rows in the backend's intrinsic order
    pub rows: Vec<StatusRow>,
    /// Realtime active-users count, if the backend reports one
    pub active_users: Option<String>,
}

impl SourceData {
    pub fn rows(rows: Vec<StatusRow>) -> Self {
        Self {
            rows,
            active_users: None,
        }
    }
}

/// One configured backend instance.
///
/// Contract:
/// - `fetch` must never panic on remote 4xx/5xx; "resource not found" (a repo
///   with no CI configured) maps to an empty result, not an error.
/// - Returned lists are bounded; paginated upstream calls are exhausted
///   internally before returning, with a hard page cap.
/// - `enabled() == false` means required configuration is absent. The
///   scheduler skips the source silently instead of retrying it.
/// - Fetches are plain futures; the scheduler bounds them with a timeout, so
///   an adapter gives up cooperatively at its next I/O await point.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identity of this source instance
    fn id(&self) -> SourceId;

    /// Human-readable panel title (border label)
    fn title(&self) -> String;

    /// Required configuration present?
    fn enabled(&self) -> bool;

    /// Fetch current state from the backend
    async fn fetch(&self) -> Result<SourceData>;
}
