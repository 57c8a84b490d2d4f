use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use futures::{
    future::{try_join_all, BoxFuture},
    FutureExt,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    preload::PreloadHook,
    request_queue::{RequestId, RequestQueue},
    routes::{RouteMatch, RouteTransition},
    session_store::SessionStore,
};

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("failed to cancel route-scoped requests: {0}")]
    Cancel(anyhow::Error),
    #[error("preload step failed: {0}")]
    Preload(anyhow::Error),
    #[error("page data hook failed for view '{view}': {cause}")]
    PageData { view: String, cause: anyhow::Error },
}

/// Process-wide lifecycle flags, one per pipeline phase. Each is true
/// exactly while its phase is in flight for the most recently started
/// navigation; they are deliberately not per-navigation, so a later
/// navigation's phases are visible to an earlier navigation's final check.
#[derive(Debug, Default)]
pub struct LifecycleFlags {
    canceling: AtomicBool,
    preloading: AtomicBool,
    page_method_executing: AtomicBool,
}

impl LifecycleFlags {
    pub fn canceling(&self) -> bool {
        self.canceling.load(Ordering::SeqCst)
    }

    pub fn preloading(&self) -> bool {
        self.preloading.load(Ordering::SeqCst)
    }

    pub fn page_method_executing(&self) -> bool {
        self.page_method_executing.load(Ordering::SeqCst)
    }

    fn all_clear(&self) -> bool {
        !self.canceling() && !self.preloading() && !self.page_method_executing()
    }
}

/// Sets a phase flag on entry and clears it on every exit path, including
/// failure unwinds.
struct PhaseGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PhaseGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Drives the cancel -> preload -> per-view fetch pipeline on every route
/// change and maintains the session store's loading indicator.
///
/// The external router is expected to call [`before_each`] ahead of
/// committing a transition (awaiting it before proceeding) and
/// [`after_each`] once the destination's components begin mounting.
///
/// [`before_each`]: NavigationCoordinator::before_each
/// [`after_each`]: NavigationCoordinator::after_each
pub struct NavigationCoordinator {
    queue: Arc<dyn RequestQueue>,
    preload: Arc<dyn PreloadHook>,
    store: Arc<SessionStore>,
    flags: LifecycleFlags,
}

impl NavigationCoordinator {
    pub fn new(
        queue: Arc<dyn RequestQueue>,
        preload: Arc<dyn PreloadHook>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            queue,
            preload,
            store,
            flags: LifecycleFlags::default(),
        }
    }

    pub fn flags(&self) -> &LifecycleFlags {
        &self.flags
    }

    /// Before-transition hook: abort every in-flight request marked
    /// route-scoped, then hand control back to the router by calling `next`
    /// exactly once. Never blocks or redirects the navigation itself.
    ///
    /// Cancellation must fully complete before the destination issues its
    /// own requests, so a canceled-but-still-arriving response cannot
    /// overwrite fresh state.
    pub async fn before_each<F>(
        &self,
        transition: &RouteTransition,
        next: F,
    ) -> Result<(), NavigationError>
    where
        F: FnOnce(),
    {
        {
            let _canceling = PhaseGuard::enter(&self.flags.canceling);

            let scoped: Vec<RequestId> = self
                .queue
                .snapshot()
                .await
                .into_iter()
                .filter(|request| request.cancel_when_route_change)
                .map(|request| request.id)
                .collect();

            debug!(
                from = transition.from.leaf_name(),
                to = transition.to.leaf_name(),
                scoped = scoped.len(),
                "navigation: canceling route-scoped requests"
            );

            self.queue
                .cancel(&scoped)
                .await
                .map_err(NavigationError::Cancel)?;
        }

        next();
        Ok(())
    }

    /// After-transition hook: loading indicator on, global preload, then
    /// all per-view hooks of the destination awaited concurrently. The
    /// indicator is cleared only if, at the moment the final check runs, no
    /// phase of any navigation is still in flight.
    pub async fn after_each(&self, to: &RouteMatch) -> Result<(), NavigationError> {
        self.store.set_main_content_loading(true).await;

        {
            let _preloading = PhaseGuard::enter(&self.flags.preloading);
            self.preload
                .run()
                .await
                .map_err(NavigationError::Preload)?;
        }

        let hooks = collect_page_hooks(to);
        debug!(
            to = to.leaf_name(),
            hooks = hooks.len(),
            "navigation: executing page data hooks"
        );

        {
            let _executing = PhaseGuard::enter(&self.flags.page_method_executing);
            try_join_all(hooks).await?;
        }

        if self.flags.all_clear() {
            self.store.set_main_content_loading(false).await;
        } else {
            info!(
                to = to.leaf_name(),
                canceling = self.flags.canceling(),
                preloading = self.flags.preloading(),
                page_method_executing = self.flags.page_method_executing(),
                "navigation: another navigation is in flight, leaving loading indicator on"
            );
        }

        Ok(())
    }
}

/// Collects the fetch and preload hooks declared by every live view of the
/// destination's matched records. All hooks are fired together by the
/// caller, not sequentially.
fn collect_page_hooks(to: &RouteMatch) -> Vec<BoxFuture<'_, Result<(), NavigationError>>> {
    let mut hooks = Vec::new();
    for record in &to.records {
        for view in &record.views {
            if let Some(fetch) = view.fetch_page_data() {
                let name = view.name().to_string();
                hooks.push(
                    async move {
                        fetch
                            .await
                            .map_err(|cause| NavigationError::PageData { view: name, cause })
                    }
                    .boxed(),
                );
            }
            if let Some(preload) = view.preload() {
                let name = view.name().to_string();
                hooks.push(
                    async move {
                        preload
                            .await
                            .map_err(|cause| NavigationError::PageData { view: name, cause })
                    }
                    .boxed(),
                );
            }
        }
    }
    hooks
}
