//! Route groups

use crate::middleware::{MiddlewareFn, Next, from_fn};
use crate::{Request, Response, RouteResult};

/// A group of routes sharing a path prefix and middleware.
///
/// Routes hold their ancestor groups as `Arc<RouteGroup>`, outermost first.
/// Middleware is kept in declaration order; the first declared runs first.
#[derive(Clone, Default)]
pub struct RouteGroup {
    pattern: String,
    middleware: Vec<MiddlewareFn>,
}

impl RouteGroup {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            middleware: Vec::new(),
        }
    }

    /// Path prefix of the group.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn middleware(&self) -> &[MiddlewareFn] {
        &self.middleware
    }

    /// Append middleware.
    pub fn add(&mut self, middleware: MiddlewareFn) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Append middleware built from a function.
    pub fn add_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Request, Response, Next) -> RouteResult<Response> + Send + Sync + 'static,
    {
        self.add(from_fn(f))
    }
}

impl std::fmt::Debug for RouteGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGroup")
            .field("pattern", &self.pattern)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}
