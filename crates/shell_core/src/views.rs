use anyhow::Result;
use futures::future::BoxFuture;

/// Capability interface for rendered views that load their own data after a
/// navigation commits.
///
/// Both hooks are optional: a view may declare neither, either, or both. The
/// coordinator only collects the futures a view actually provides, so a
/// `None` hook never contributes to the page-method phase.
pub trait PageView: Send + Sync {
    /// Per-view data fetch, run once the destination route is committed.
    fn fetch_page_data(&self) -> Option<BoxFuture<'_, Result<()>>> {
        None
    }

    /// Declared preload hook, invoked with the view instance as context.
    fn preload(&self) -> Option<BoxFuture<'_, Result<()>>> {
        None
    }

    /// Name used for logs and hook-failure errors.
    fn name(&self) -> &str {
        "view"
    }
}
