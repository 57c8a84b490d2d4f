pub mod config;
pub mod navigation;
pub mod preload;
pub mod request_queue;
pub mod routes;
pub mod session_store;
pub mod views;

pub use config::{load_settings, Settings};
pub use navigation::{LifecycleFlags, NavigationCoordinator, NavigationError};
pub use preload::{FnPreload, NoPreload, PreloadHook};
pub use request_queue::{
    InFlightQueue, RequestError, RequestGuard, RequestId, RequestQueue, TrackedRequest,
};
pub use routes::{route_table, RouteDef, RouteMatch, RouteMeta, RouteRecord, RouteTransition};
pub use session_store::{SessionStore, UserInfo};
pub use views::PageView;

#[cfg(test)]
mod tests;
