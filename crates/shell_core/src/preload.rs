use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;

/// Global preload step, run unconditionally after every completed
/// navigation. The coordinator treats it as opaque and only observes
/// completion or failure.
#[async_trait]
pub trait PreloadHook: Send + Sync {
    async fn run(&self) -> Result<()>;
}

/// Null preload for shells that have nothing to warm up.
pub struct NoPreload;

#[async_trait]
impl PreloadHook for NoPreload {
    async fn run(&self) -> Result<()> {
        Ok(())
    }
}

/// Adapter turning a closure into a [`PreloadHook`].
pub struct FnPreload<F>(F);

impl<F> FnPreload<F>
where
    F: Fn() -> BoxFuture<'static, Result<()>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> PreloadHook for FnPreload<F>
where
    F: Fn() -> BoxFuture<'static, Result<()>> + Send + Sync,
{
    async fn run(&self) -> Result<()> {
        (self.0)().await
    }
}
