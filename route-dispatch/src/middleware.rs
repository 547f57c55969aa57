//! Middleware support and the execution stack
//!
//! A middleware receives the request and response, may hand them inward by
//! calling `next`, and sees the response again when `next` returns.

use crate::{Request, Response, RouteResult};
use std::sync::Arc;

/// Next step in the middleware chain
pub type Next = Arc<dyn Fn(Request, Response) -> RouteResult<Response> + Send + Sync>;

/// Middleware function type
pub type MiddlewareFn =
    Arc<dyn Fn(Request, Response, Next) -> RouteResult<Response> + Send + Sync>;

/// Trait for implementing custom middleware
pub trait Middleware: Send + Sync {
    /// Process the request, optionally calling next
    fn handle(&self, req: Request, res: Response, next: Next) -> RouteResult<Response>;
}

/// Create middleware from a function
///
/// # Example
/// ```rust,ignore
/// let timing = from_fn(|req, res, next| {
///     let started = std::time::Instant::now();
///     let res = next(req, res)?;
///     Ok(res.with_header("x-elapsed-us", started.elapsed().as_micros().to_string()))
/// });
/// ```
pub fn from_fn<F>(f: F) -> MiddlewareFn
where
    F: Fn(Request, Response, Next) -> RouteResult<Response> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a [`Middleware`] implementation as a [`MiddlewareFn`]
pub fn from_middleware<M: Middleware + 'static>(middleware: M) -> MiddlewareFn {
    let middleware = Arc::new(middleware);
    Arc::new(move |req: Request, res: Response, next: Next| middleware.handle(req, res, next))
}

/// Execution stack that threads a request/response pair through registered
/// middleware down to a kernel.
///
/// Registration is LIFO: every [`add_middleware`](Self::add_middleware) wraps
/// everything registered before it, so the **last registered layer is the
/// outermost** and sees the request first and the response last.
///
/// ```text
/// add_middleware(M1); add_middleware(M2); add_middleware(M3);
/// call → M3 → M2 → M1 → kernel → M1 → M2 → M3
/// ```
#[derive(Clone, Default)]
pub struct MiddlewareStack {
    layers: Vec<MiddlewareFn>,
}

impl MiddlewareStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the stack in `middleware`, making it the new outermost layer.
    pub fn add_middleware(&mut self, middleware: MiddlewareFn) {
        self.layers.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Run the pair through every layer, outermost first, ending at `kernel`.
    pub fn call(&self, req: Request, res: Response, kernel: Next) -> RouteResult<Response> {
        // The first registered layer sits directly on the kernel.
        let chain = self.layers.iter().fold(kernel, |next: Next, mw| {
            let mw = mw.clone();
            let wrapped: Next =
                Arc::new(move |req: Request, res: Response| (mw)(req, res, next.clone()));
            wrapped
        });
        chain(req, res)
    }
}

impl std::fmt::Debug for MiddlewareStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareStack")
            .field("layers", &self.layers.len())
            .finish()
    }
}
