//! Handler references and handler results

use crate::{Arguments, Request, Response, RouteResult};
use std::fmt;
use std::sync::Arc;

/// Type-erased route handler.
pub type Handler =
    Arc<dyn Fn(Request, Response, &Arguments) -> RouteResult<HandlerOutput> + Send + Sync>;

/// What a handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    /// A full response that replaces the working response
    Response(Response),
    /// Body text appended to the working response
    Text(String),
    /// Nothing; the working response is kept as it is
    Empty,
}

impl From<Response> for HandlerOutput {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<String> for HandlerOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for HandlerOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<()> for HandlerOutput {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

/// Create a [`Handler`] from a function returning anything convertible into
/// [`HandlerOutput`].
///
/// # Example
/// ```rust,ignore
/// let hello = handler(|_req, _res, args: &Arguments| {
///     Ok(format!("Hello, {}", args.get("name").map(String::as_str).unwrap_or("world")))
/// });
/// ```
pub fn handler<F, O>(f: F) -> Handler
where
    F: Fn(Request, Response, &Arguments) -> RouteResult<O> + Send + Sync + 'static,
    O: Into<HandlerOutput>,
{
    Arc::new(move |req: Request, res: Response, args: &Arguments| {
        f(req, res, args).map(Into::into)
    })
}

/// Reference to the callable a route invokes.
#[derive(Clone)]
pub enum Callable {
    /// A handler value
    Direct(Handler),
    /// A name resolved through the route's [`Container`](crate::Container)
    Named(String),
}

impl Callable {
    /// Create a direct callable from a function.
    pub fn from_fn<F, O>(f: F) -> Self
    where
        F: Fn(Request, Response, &Arguments) -> RouteResult<O> + Send + Sync + 'static,
        O: Into<HandlerOutput>,
    {
        Self::Direct(handler(f))
    }

    /// Create a callable resolved by name at dispatch time.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// The name of a named callable.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Direct(_) => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl From<Handler> for Callable {
    fn from(handler: Handler) -> Self {
        Self::Direct(handler)
    }
}

impl From<&str> for Callable {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for Callable {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Callable::Direct(..)"),
            Self::Named(name) => f.debug_tuple("Callable::Named").field(name).finish(),
        }
    }
}
