//! # route-dispatch
//!
//! The per-route execution unit of an HTTP dispatch layer.
//!
//! Given a route an external matcher picked, this crate binds the matched path
//! parameters, composes group and route middleware into one onion-ordered
//! stack, invokes the handler through a pluggable invocation strategy, and
//! merges whatever the handler produced into a single response.
//!
//! ```text
//! matcher ──► Route::prepare ──► Route::run
//!                                  │
//!                    ┌─────────────▼──────────────┐
//!                    │ outer group middleware     │
//!                    │  ┌──────────────────────┐  │
//!                    │  │ inner group mw       │  │
//!                    │  │  ┌────────────────┐  │  │
//!                    │  │  │ route mw       │  │  │
//!                    │  │  │  ┌──────────┐  │  │  │
//!                    │  │  │  │ handler  │  │  │  │
//!                    │  │  │  └──────────┘  │  │  │
//!                    │  │  └────────────────┘  │  │
//!                    │  └──────────────────────┘  │
//!                    └────────────────────────────┘
//! ```
//!
//! Handlers may return a [`Response`], body text, or nothing, and may also
//! write output as a side effect with [`echo!`]; the route's
//! [`OutputCapture`] mode decides where that output lands in the body.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use route_dispatch::prelude::*;
//!
//! let mut routes = RouteCollector::new();
//! let route = routes.get("/hello/{name}", handler(|_req, _res, args: &Arguments| {
//!     echo!("<!-- greeting -->");
//!     Ok(format!("Hello, {}", args["name"]))
//! }))?;
//! let id = route.identifier();
//!
//! let matched = Arguments::from([("name".to_string(), "Ada".to_string())]);
//! let res = routes.dispatch(id, Request::new("GET", "/hello/Ada"), Response::new(), matched)?;
//! assert_eq!(res.body().contents(), "Hello, Ada<!-- greeting -->");
//! ```

pub mod collector;
pub mod config;
mod error;
pub mod group;
pub mod handler;
pub mod middleware;
pub mod output;
pub mod route;
pub mod strategy;
mod types;

#[cfg(test)]
mod tests;

pub use collector::{ANY_METHODS, RouteCollector};
pub use config::RouteSettings;
pub use error::*;
pub use group::RouteGroup;
pub use handler::{Callable, Handler, HandlerOutput, handler};
pub use middleware::{Middleware, MiddlewareFn, MiddlewareStack, Next};
pub use route::{OutputCapture, Route, RouteId};
pub use strategy::{Container, HandlerRegistry, InvocationStrategy, RequestResponse, strategy_fn};
pub use types::*;

/// Commonly used items.
pub mod prelude {
    pub use crate::echo;
    pub use crate::middleware::from_fn;
    pub use crate::{
        Arguments, Body, Callable, Container, HandlerOutput, HandlerRegistry, Middleware,
        MiddlewareFn, Next, OutputCapture, Request, Response, Route, RouteCollector, RouteError,
        RouteGroup, RouteId, RouteInfo, RouteResult, RouteSettings, handler,
    };
}
