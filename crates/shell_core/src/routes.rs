use std::sync::Arc;

use crate::views::PageView;

/// Declarative metadata attached to a route definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Label shown in the navigation breadcrumb for this route.
    pub match_route: Option<&'static str>,
}

/// One entry of the static route table. Path matching is delegated to the
/// external router; this table is declarative data only.
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub path: &'static str,
    pub name: &'static str,
    pub meta: RouteMeta,
    pub children: Vec<RouteDef>,
}

impl RouteDef {
    fn new(path: &'static str, name: &'static str) -> Self {
        Self {
            path,
            name,
            meta: RouteMeta::default(),
            children: Vec::new(),
        }
    }

    fn labeled(path: &'static str, name: &'static str, label: &'static str) -> Self {
        Self {
            path,
            name,
            meta: RouteMeta {
                match_route: Some(label),
            },
            children: Vec::new(),
        }
    }
}

/// The application route table: a main entry with the content views as
/// children, plus a catch-all for unknown paths.
pub fn route_table() -> Vec<RouteDef> {
    let mut app_main = RouteDef::new("/", "app_main");
    app_main.children = vec![
        RouteDef::labeled("overview", "overview", "Overview"),
        RouteDef::labeled("session", "session", "Login info"),
        RouteDef::labeled("resource", "resource", "Provision resources"),
        RouteDef::labeled("record", "record", "Operation records"),
    ];
    vec![app_main, RouteDef::new("*", "not_found")]
}

/// One matched route record, carrying the view instances currently rendered
/// for it. A record may have zero views while its component is still
/// mounting.
#[derive(Clone)]
pub struct RouteRecord {
    pub name: String,
    pub views: Vec<Arc<dyn PageView>>,
}

impl RouteRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            views: Vec::new(),
        }
    }

    pub fn with_views(name: impl Into<String>, views: Vec<Arc<dyn PageView>>) -> Self {
        Self {
            name: name.into(),
            views,
        }
    }
}

/// Ordered chain of matched route records, outermost first, as supplied by
/// the external router for one side of a transition.
#[derive(Clone, Default)]
pub struct RouteMatch {
    pub records: Vec<RouteRecord>,
}

impl RouteMatch {
    pub fn new(records: Vec<RouteRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Name of the innermost matched record, for logging.
    pub fn leaf_name(&self) -> &str {
        self.records
            .last()
            .map(|record| record.name.as_str())
            .unwrap_or("")
    }
}

/// A route change event handed to the coordinator hooks.
#[derive(Clone)]
pub struct RouteTransition {
    pub from: RouteMatch,
    pub to: RouteMatch,
}
