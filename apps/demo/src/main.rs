use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use futures::{future::BoxFuture, FutureExt};
use shell_core::{
    load_settings, route_table, FnPreload, InFlightQueue, NavigationCoordinator, PageView,
    RequestQueue, RouteDef, RouteMatch, RouteRecord, RouteTransition, SessionStore,
};

/// Breadcrumb label for a route name, from the static route table.
fn breadcrumb(name: &str) -> Option<&'static str> {
    fn find(defs: &[RouteDef], name: &str) -> Option<&'static str> {
        for def in defs {
            if def.name == name {
                return def.meta.match_route;
            }
            if let Some(label) = find(&def.children, name) {
                return Some(label);
            }
        }
        None
    }
    find(&route_table(), name)
}

/// Drives the navigation pipeline with a simulated router: two outstanding
/// requests (one route-scoped, one background poll), a navigation to the
/// overview and one to the record list.
#[derive(Parser, Debug)]
struct Args {
    /// Fetch the current user from this URL after the navigations finish.
    #[arg(long)]
    user_info_url: Option<String>,
}

struct OverviewView;

impl PageView for OverviewView {
    fn fetch_page_data(&self) -> Option<BoxFuture<'_, Result<()>>> {
        Some(
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                tracing::info!("overview data loaded");
                Ok(())
            }
            .boxed(),
        )
    }

    fn name(&self) -> &str {
        "overview"
    }
}

struct RecordListView;

impl PageView for RecordListView {
    fn fetch_page_data(&self) -> Option<BoxFuture<'_, Result<()>>> {
        Some(
            async {
                tokio::time::sleep(Duration::from_millis(80)).await;
                tracing::info!("record list loaded");
                Ok(())
            }
            .boxed(),
        )
    }

    fn preload(&self) -> Option<BoxFuture<'_, Result<()>>> {
        Some(
            async {
                tracing::info!("record list cache primed");
                Ok(())
            }
            .boxed(),
        )
    }

    fn name(&self) -> &str {
        "record"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.user_info_url.clone() {
        settings.user_info_url = url;
    }

    let store = Arc::new(SessionStore::new(&settings));
    let queue = InFlightQueue::new();
    let preload = Arc::new(FnPreload::new(|| {
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(())
        }
        .boxed()
    }));
    let coordinator = Arc::new(NavigationCoordinator::new(
        queue.clone(),
        preload,
        store.clone(),
    ));

    let scoped = queue.track(true);
    let background = queue.track(false);
    println!(
        "outstanding requests: scoped={} background={}",
        scoped.id(),
        background.id()
    );
    let scoped_task = tokio::spawn(scoped.run(futures::future::pending::<Result<()>>()));
    let background_task = tokio::spawn(background.run(async {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }));

    let to_overview = RouteMatch::new(vec![
        RouteRecord::new("app_main"),
        RouteRecord::with_views("overview", vec![Arc::new(OverviewView)]),
    ]);
    let transition = RouteTransition {
        from: RouteMatch::empty(),
        to: to_overview.clone(),
    };
    coordinator
        .before_each(&transition, || println!("router: overview committed"))
        .await?;

    match scoped_task.await? {
        Err(err) => println!("scoped request: {err}"),
        Ok(()) => println!("scoped request finished before cancellation"),
    }
    println!(
        "still tracked after route change: {} request(s)",
        queue.snapshot().await.len()
    );

    coordinator.after_each(&to_overview).await?;
    println!(
        "breadcrumb: {} | main content loading: {}",
        breadcrumb(to_overview.leaf_name()).unwrap_or("-"),
        store.main_content_loading().await
    );

    let to_record = RouteMatch::new(vec![
        RouteRecord::new("app_main"),
        RouteRecord::with_views("record", vec![Arc::new(RecordListView)]),
    ]);
    let transition = RouteTransition {
        from: to_overview,
        to: to_record.clone(),
    };
    coordinator
        .before_each(&transition, || println!("router: record list committed"))
        .await?;
    coordinator.after_each(&to_record).await?;
    println!(
        "breadcrumb: {} | main content loading: {}",
        breadcrumb(to_record.leaf_name()).unwrap_or("-"),
        store.main_content_loading().await
    );

    if args.user_info_url.is_some() {
        let user = store.fetch_user().await?;
        println!("current user: {}", serde_json::to_string(&user)?);
    }

    background_task.abort();
    Ok(())
}
