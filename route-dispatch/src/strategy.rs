//! Invocation strategies and the handler container
//!
//! An [`InvocationStrategy`] decides how a resolved handler is called. Routes
//! use [`RequestResponse`] unless their [`Container`] supplies another one.

use crate::handler::{Handler, HandlerOutput};
use crate::{Arguments, ROUTE_ATTRIBUTE, Request, Response, RouteResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Policy for calling a handler with the request, response and arguments.
pub trait InvocationStrategy: Send + Sync {
    fn invoke(
        &self,
        handler: &Handler,
        req: Request,
        res: Response,
        args: &Arguments,
    ) -> RouteResult<HandlerOutput>;
}

/// Default strategy: calls `handler(request, response, arguments)`.
///
/// Each argument is also set as a request attribute, so handlers that only
/// look at the request still see them. An argument named like
/// [`ROUTE_ATTRIBUTE`] does not overwrite the route tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestResponse;

impl InvocationStrategy for RequestResponse {
    fn invoke(
        &self,
        handler: &Handler,
        req: Request,
        res: Response,
        args: &Arguments,
    ) -> RouteResult<HandlerOutput> {
        let req = args
            .iter()
            .filter(|(key, _)| key.as_str() != ROUTE_ATTRIBUTE)
            .fold(req, |req, (key, value)| {
                req.with_attribute(key.clone(), value.clone())
            });
        handler(req, res, args)
    }
}

struct FnStrategy<F>(F);

impl<F> InvocationStrategy for FnStrategy<F>
where
    F: Fn(&Handler, Request, Response, &Arguments) -> RouteResult<HandlerOutput> + Send + Sync,
{
    fn invoke(
        &self,
        handler: &Handler,
        req: Request,
        res: Response,
        args: &Arguments,
    ) -> RouteResult<HandlerOutput> {
        (self.0)(handler, req, res, args)
    }
}

/// Create a strategy from a function.
///
/// # Example
/// ```rust,ignore
/// // Hide arguments from the handler
/// let strategy = strategy_fn(|handler, req, res, _args| handler(req, res, &Arguments::new()));
/// ```
pub fn strategy_fn<F>(f: F) -> Arc<dyn InvocationStrategy>
where
    F: Fn(&Handler, Request, Response, &Arguments) -> RouteResult<HandlerOutput>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnStrategy(f))
}

/// Resolves named handlers and optionally supplies the invocation strategy.
pub trait Container: Send + Sync {
    /// Look up a handler by name.
    fn resolve(&self, name: &str) -> Option<Handler>;

    /// Strategy to use instead of [`RequestResponse`].
    fn invocation_strategy(&self) -> Option<Arc<dyn InvocationStrategy>> {
        None
    }
}

/// In-memory [`Container`].
///
/// # Example
/// ```rust,ignore
/// let registry = HandlerRegistry::new()
///     .register("users.show", handler(show_user))
///     .with_strategy(strategy_fn(audited));
/// ```
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
    strategy: Option<Arc<dyn InvocationStrategy>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any earlier registration.
    pub fn register(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Use `strategy` for every route backed by this registry.
    pub fn with_strategy(mut self, strategy: Arc<dyn InvocationStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Container for HandlerRegistry {
    fn resolve(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).cloned()
    }

    fn invocation_strategy(&self) -> Option<Arc<dyn InvocationStrategy>> {
        self.strategy.clone()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .field("custom_strategy", &self.strategy.is_some())
            .finish()
    }
}
