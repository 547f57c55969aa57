//! Route entity
//!
//! A [`Route`] binds a method set and pattern to a handler. Dispatching through
//! it follows three steps:
//!
//! 1. [`Route::prepare`] binds a [`RouteInfo`] to the request holding the
//!    arguments for this dispatch (saved route arguments overlaid with the
//!    matched path parameters).
//! 2. [`Route::finalize`] flattens group and route middleware into the
//!    execution stack. It runs once; later calls do nothing.
//! 3. [`Route::run`] threads the request and response through the stack down
//!    to the handler, capturing any output the handler writes as a side
//!    effect and merging it into the response.
//!
//! Dispatch only needs `&self`, so a finalized route can serve concurrent
//! requests: each request carries its own argument binding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::handler::{Callable, Handler, HandlerOutput};
use crate::middleware::{MiddlewareFn, MiddlewareStack, Next, from_fn};
use crate::strategy::{Container, InvocationStrategy, RequestResponse};
use crate::{
    Arguments, Body, Request, Response, RouteError, RouteGroup, RouteInfo, RouteResult,
    RouteSettings, output,
};

// =============================================================================
// Route identity
// =============================================================================

/// Identifier assigned to a route when it is constructed.
///
/// Ids are UUID v7, so they sort roughly by creation time. The text form is `route_` followed by the hyphenated UUID, and
/// [`parse`](Self::parse) reads it back with or without the prefix.
///
/// ```rust,ignore
/// let id = routes.get("/health", health)?.identifier();
/// let same: RouteId = id.to_string().parse()?;
/// assert_eq!(routes.route(same)?.pattern(), "/health");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(Uuid);

impl RouteId {
    const PREFIX: &'static str = "route_";

    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Read an id from its text form. Fails with `InvalidArgument`.
    pub fn parse(text: &str) -> RouteResult<Self> {
        let raw = text.strip_prefix(Self::PREFIX).unwrap_or(text);
        Uuid::parse_str(raw).map(Self).map_err(|err| {
            RouteError::invalid_argument(format!("'{}' is not a route id", text))
                .with_cause(err.to_string())
        })
    }
}

impl Default for RouteId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RouteId {
    type Err = RouteError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

// =============================================================================
// Output capture mode
// =============================================================================

/// How output written by a handler during invocation is merged into the
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "CaptureSetting")]
pub enum OutputCapture {
    /// Output is not captured
    Disabled,
    /// Captured output is placed before the response body
    Prepend,
    /// Captured output is placed after the response body
    #[default]
    Append,
}

impl OutputCapture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Prepend => "prepend",
            Self::Append => "append",
        }
    }
}

impl fmt::Display for OutputCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OutputCapture {
    type Error = RouteError;

    fn try_from(mode: &str) -> Result<Self, Self::Error> {
        match mode {
            "append" => Ok(Self::Append),
            "prepend" => Ok(Self::Prepend),
            "disabled" | "false" => Ok(Self::Disabled),
            other => Err(RouteError::invalid_configuration(format!(
                "Unknown output capture mode '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for OutputCapture {
    type Error = RouteError;

    fn try_from(mode: String) -> Result<Self, Self::Error> {
        Self::try_from(mode.as_str())
    }
}

/// `false` disables capture; `true` names no mode and is rejected.
impl TryFrom<bool> for OutputCapture {
    type Error = RouteError;

    fn try_from(enabled: bool) -> Result<Self, Self::Error> {
        if enabled {
            Err(RouteError::invalid_configuration(
                "Output capture mode 'true' is ambiguous; use \"append\" or \"prepend\"",
            ))
        } else {
            Ok(Self::Disabled)
        }
    }
}

impl FromStr for OutputCapture {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CaptureSetting {
    Flag(bool),
    Mode(String),
}

impl TryFrom<CaptureSetting> for OutputCapture {
    type Error = RouteError;

    fn try_from(setting: CaptureSetting) -> Result<Self, Self::Error> {
        match setting {
            CaptureSetting::Flag(flag) => Self::try_from(flag),
            CaptureSetting::Mode(mode) => Self::try_from(mode),
        }
    }
}

// =============================================================================
// Route
// =============================================================================

/// A method set + pattern + handler binding with its own middleware.
///
/// # Example
/// ```rust,ignore
/// let mut route = Route::new(["GET"], "/users/{id}", handler(show_user), vec![api_group])?;
/// route.set_name("users.show")?.add_fn(audit)?;
///
/// let req = route.prepare(req, Arguments::from([("id".into(), "7".into())]));
/// route.finalize();
/// let res = route.run(req, Response::new())?;
/// ```
pub struct Route {
    methods: Vec<String>,
    pattern: String,
    callable: Callable,
    groups: Vec<Arc<RouteGroup>>,
    identifier: RouteId,
    name: Option<String>,
    output_capture: OutputCapture,
    arguments: Arguments,
    middleware: Vec<MiddlewareFn>,
    container: Option<Arc<dyn Container>>,
    debug_logging: bool,
    stack: OnceLock<MiddlewareStack>,
}

impl Route {
    /// Create a route.
    ///
    /// `groups` is the ancestor chain, outermost first. Fails with
    /// `InvalidArgument` when `methods` is empty.
    pub fn new<M, S>(
        methods: M,
        pattern: impl Into<String>,
        callable: impl Into<Callable>,
        groups: Vec<Arc<RouteGroup>>,
    ) -> RouteResult<Self>
    where
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for method in methods {
            let method = method.into();
            if !unique.contains(&method) {
                unique.push(method);
            }
        }
        if unique.is_empty() {
            return Err(RouteError::invalid_argument(
                "A route must answer to at least one method",
            ));
        }

        Ok(Self {
            methods: unique,
            pattern: pattern.into(),
            callable: callable.into(),
            groups,
            identifier: RouteId::new(),
            name: None,
            output_capture: OutputCapture::default(),
            arguments: Arguments::new(),
            middleware: Vec::new(),
            container: None,
            debug_logging: false,
            stack: OnceLock::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Whether the route answers to `method` (case-insensitive).
    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    /// Ancestor groups, outermost first.
    pub fn groups(&self) -> &[Arc<RouteGroup>] {
        &self.groups
    }

    pub fn identifier(&self) -> RouteId {
        self.identifier
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn output_capture(&self) -> OutputCapture {
        self.output_capture
    }

    /// The route's own middleware in declaration order.
    pub fn middleware(&self) -> &[MiddlewareFn] {
        &self.middleware
    }

    pub fn container(&self) -> Option<&Arc<dyn Container>> {
        self.container.as_ref()
    }

    pub fn is_finalized(&self) -> bool {
        self.stack.get().is_some()
    }

    /// Saved arguments.
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Get a saved argument, or `default` when it is not set.
    pub fn argument<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.arguments.get(key).map(String::as_str).unwrap_or(default)
    }

    /// Snapshot of the route carrying its saved arguments.
    pub fn info(&self) -> RouteInfo {
        RouteInfo {
            identifier: self.identifier,
            name: self.name.clone(),
            pattern: self.pattern.clone(),
            methods: self.methods.clone(),
            arguments: self.arguments.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    pub fn set_pattern(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.pattern = pattern.into();
        self
    }

    /// Name the route. Empty or blank names are rejected.
    pub fn set_name(&mut self, name: impl Into<String>) -> RouteResult<&mut Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RouteError::invalid_argument("Route name must not be empty"));
        }
        self.name = Some(name);
        Ok(self)
    }

    /// Change the output capture mode.
    ///
    /// Accepts an [`OutputCapture`], its string form, or `false`. On error the
    /// previous mode is kept.
    pub fn set_output_capture<M>(&mut self, mode: M) -> RouteResult<&mut Self>
    where
        M: TryInto<OutputCapture>,
        RouteError: From<M::Error>,
    {
        self.output_capture = mode.try_into()?;
        Ok(self)
    }

    pub fn set_argument(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Replace all saved arguments.
    pub fn set_arguments(&mut self, arguments: Arguments) -> &mut Self {
        self.arguments = arguments;
        self
    }

    pub fn set_container(&mut self, container: Arc<dyn Container>) -> &mut Self {
        self.container = Some(container);
        self
    }

    pub fn set_debug_logging(&mut self, enabled: bool) -> &mut Self {
        self.debug_logging = enabled;
        self
    }

    /// Apply collector-wide defaults.
    pub fn apply_settings(&mut self, settings: &RouteSettings) -> &mut Self {
        self.output_capture = settings.output_capture;
        self.debug_logging = settings.debug_logging;
        self
    }

    /// Append middleware. Middleware declared first runs first.
    ///
    /// Fails with `AlreadyFinalized` once [`finalize`](Self::finalize) ran.
    pub fn add(&mut self, middleware: MiddlewareFn) -> RouteResult<&mut Self> {
        if self.is_finalized() {
            return Err(RouteError::already_finalized(self.identifier));
        }
        self.middleware.push(middleware);
        Ok(self)
    }

    /// Append middleware built from a function.
    pub fn add_fn<F>(&mut self, f: F) -> RouteResult<&mut Self>
    where
        F: Fn(Request, Response, Next) -> RouteResult<Response> + Send + Sync + 'static,
    {
        self.add(from_fn(f))
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Bind `matched` path parameters for one dispatch and tag the request
    /// with the route.
    ///
    /// Matched values override saved arguments of the same name. The route
    /// itself is not modified.
    pub fn prepare(&self, req: Request, matched: Arguments) -> Request {
        let mut info = self.info();
        info.arguments.extend(matched);
        if self.debug_logging {
            debug!(route = %self.identifier, arguments = ?info.arguments, "Route prepared");
        }
        req.with_route_info(info)
    }

    /// Middleware in execution order: outermost group first, then nearer
    /// groups, then the route's own middleware.
    pub fn flattened_middleware(&self) -> Vec<MiddlewareFn> {
        self.groups
            .iter()
            .flat_map(|group| group.middleware().iter().cloned())
            .chain(self.middleware.iter().cloned())
            .collect()
    }

    /// Build the execution stack. Only the first call has an effect.
    pub fn finalize(&self) {
        self.stack.get_or_init(|| self.build_stack());
    }

    fn build_stack(&self) -> MiddlewareStack {
        let flattened = self.flattened_middleware();
        let mut stack = MiddlewareStack::new();
        // The stack wraps in LIFO order, so the first layer to execute is
        // registered last.
        for middleware in flattened.into_iter().rev() {
            stack.add_middleware(middleware);
        }
        debug!(
            route = %self.identifier,
            pattern = %self.pattern,
            layers = stack.len(),
            "Route middleware finalized"
        );
        stack
    }

    /// Run the request through the middleware stack and the handler.
    ///
    /// Finalizes the route first if that has not happened yet.
    pub fn run(&self, req: Request, res: Response) -> RouteResult<Response> {
        let stack = self.stack.get_or_init(|| self.build_stack());
        debug!(
            route = %self.identifier,
            method = %req.method(),
            path = %req.path(),
            "Dispatching route"
        );
        let terminal = Terminal {
            identifier: self.identifier,
            callable: self.callable.clone(),
            container: self.container.clone(),
            output_capture: self.output_capture,
            arguments: self.arguments.clone(),
            debug_logging: self.debug_logging,
        };
        let kernel: Next = Arc::new(move |req: Request, res: Response| terminal.invoke(req, res));
        stack.call(req, res, kernel)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("identifier", &self.identifier)
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("pattern", &self.pattern)
            .field("callable", &self.callable)
            .field("groups", &self.groups.len())
            .field("output_capture", &self.output_capture)
            .field("arguments", &self.arguments)
            .field("middleware", &self.middleware.len())
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

// =============================================================================
// Terminal invocation
// =============================================================================

/// The innermost step of a route's stack.
struct Terminal {
    identifier: RouteId,
    callable: Callable,
    container: Option<Arc<dyn Container>>,
    output_capture: OutputCapture,
    arguments: Arguments,
    debug_logging: bool,
}

impl Terminal {
    fn invoke(&self, req: Request, res: Response) -> RouteResult<Response> {
        let handler = self.resolve_handler()?;
        let strategy: Arc<dyn InvocationStrategy> = self
            .container
            .as_ref()
            .and_then(|container| container.invocation_strategy())
            .unwrap_or_else(|| Arc::new(RequestResponse));

        let arguments = match req.route_info() {
            Some(info) => info.arguments.clone(),
            None => self.arguments.clone(),
        };
        if self.debug_logging {
            debug!(route = %self.identifier, arguments = ?arguments, "Invoking handler");
        }

        let (produced, captured) = match self.output_capture {
            OutputCapture::Disabled => {
                (strategy.invoke(&handler, req, res.clone(), &arguments)?, None)
            }
            OutputCapture::Prepend | OutputCapture::Append => {
                // Dropped without `finish` on error or panic, discarding the text.
                let capture = output::begin();
                let produced = strategy.invoke(&handler, req, res.clone(), &arguments)?;
                (produced, Some(capture.finish()))
            }
        };

        let res = self.reconcile(res, produced);
        Ok(self.merge_captured(res, captured.unwrap_or_default()))
    }

    fn resolve_handler(&self) -> RouteResult<Handler> {
        match &self.callable {
            Callable::Direct(handler) => Ok(handler.clone()),
            Callable::Named(name) => self
                .container
                .as_ref()
                .and_then(|container| container.resolve(name))
                .ok_or_else(|| RouteError::handler_not_resolved(name)),
        }
    }

    fn reconcile(&self, res: Response, produced: HandlerOutput) -> Response {
        match produced {
            HandlerOutput::Response(replacement) => {
                trace!(route = %self.identifier, "Handler returned a response");
                replacement
            }
            HandlerOutput::Text(text) => {
                if !res.body().is_writable() {
                    warn!(
                        route = %self.identifier,
                        bytes = text.len(),
                        "Handler text dropped: response body is read-only"
                    );
                }
                res.write(&text)
            }
            HandlerOutput::Empty => res,
        }
    }

    fn merge_captured(&self, res: Response, captured: String) -> Response {
        if captured.is_empty() {
            return res;
        }
        trace!(
            route = %self.identifier,
            mode = %self.output_capture,
            bytes = captured.len(),
            "Merging captured output"
        );
        match self.output_capture {
            OutputCapture::Append if !res.body().is_writable() => {
                warn!(
                    route = %self.identifier,
                    bytes = captured.len(),
                    "Captured output dropped: response body is read-only"
                );
                res
            }
            OutputCapture::Append => res.write(&captured),
            // A new body replaces the old one, writable or not.
            OutputCapture::Prepend => {
                let body = Body::from(format!("{}{}", captured, res.body().contents()));
                res.with_body(body)
            }
            OutputCapture::Disabled => res,
        }
    }
}
