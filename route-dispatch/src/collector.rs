//! Route collector with builder-style definition
//!
//! The collector owns the routes of an application, hands each new route the
//! active group chain and the configured defaults, and dispatches to a route
//! once an external matcher has picked it.
//!
//! # Example
//! ```rust,ignore
//! let mut routes = RouteCollector::new().with_settings(settings);
//!
//! let mut api = RouteGroup::new("/api");
//! api.add(auth);
//! routes.group(api, |routes| {
//!     routes.get("/users/{id}", handler(show_user))?.set_name("users.show")?;
//!     Ok(())
//! })?;
//!
//! let id = routes.named("users.show")?.identifier();
//! let res = routes.dispatch(id, req, Response::new(), matched)?;
//! ```

use std::sync::Arc;

use crate::handler::Callable;
use crate::strategy::Container;
use crate::{
    Arguments, Request, Response, Route, RouteError, RouteGroup, RouteId, RouteResult,
    RouteSettings,
};

/// Methods registered by [`RouteCollector::any`].
pub const ANY_METHODS: [&str; 6] = ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

/// Owns routes and the group nesting used while defining them.
#[derive(Default)]
pub struct RouteCollector {
    settings: RouteSettings,
    container: Option<Arc<dyn Container>>,
    routes: Vec<Route>,
    groups: Vec<Arc<RouteGroup>>,
}

impl RouteCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults applied to routes created afterwards.
    pub fn with_settings(mut self, settings: RouteSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Container given to routes created afterwards.
    pub fn with_container(mut self, container: Arc<dyn Container>) -> Self {
        self.container = Some(container);
        self
    }

    pub fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    /// Define a route. The pattern is prefixed with the patterns of the
    /// enclosing groups.
    pub fn map<M, S>(
        &mut self,
        methods: M,
        pattern: &str,
        callable: impl Into<Callable>,
    ) -> RouteResult<&mut Route>
    where
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut full_pattern: String = self.groups.iter().map(|g| g.pattern()).collect();
        full_pattern.push_str(pattern);

        let mut route = Route::new(methods, full_pattern, callable, self.groups.clone())?;
        route.apply_settings(&self.settings);
        if let Some(container) = &self.container {
            route.set_container(container.clone());
        }

        tracing::trace!(
            route = %route.identifier(),
            pattern = %route.pattern(),
            "Route mapped"
        );

        let index = self.routes.len();
        self.routes.push(route);
        Ok(&mut self.routes[index])
    }

    pub fn get(&mut self, pattern: &str, callable: impl Into<Callable>) -> RouteResult<&mut Route> {
        self.map(["GET"], pattern, callable)
    }

    pub fn post(&mut self, pattern: &str, callable: impl Into<Callable>) -> RouteResult<&mut Route> {
        self.map(["POST"], pattern, callable)
    }

    pub fn put(&mut self, pattern: &str, callable: impl Into<Callable>) -> RouteResult<&mut Route> {
        self.map(["PUT"], pattern, callable)
    }

    pub fn patch(&mut self, pattern: &str, callable: impl Into<Callable>) -> RouteResult<&mut Route> {
        self.map(["PATCH"], pattern, callable)
    }

    pub fn delete(&mut self, pattern: &str, callable: impl Into<Callable>) -> RouteResult<&mut Route> {
        self.map(["DELETE"], pattern, callable)
    }

    pub fn options(&mut self, pattern: &str, callable: impl Into<Callable>) -> RouteResult<&mut Route> {
        self.map(["OPTIONS"], pattern, callable)
    }

    /// Define a route answering to every method in [`ANY_METHODS`].
    pub fn any(&mut self, pattern: &str, callable: impl Into<Callable>) -> RouteResult<&mut Route> {
        self.map(ANY_METHODS, pattern, callable)
    }

    /// Define routes inside `group`.
    ///
    /// Routes created by `define` get `group` appended to their ancestor
    /// chain. The group is closed again even when `define` fails.
    pub fn group<F>(&mut self, group: RouteGroup, define: F) -> RouteResult<Arc<RouteGroup>>
    where
        F: FnOnce(&mut Self) -> RouteResult<()>,
    {
        let group = Arc::new(group);
        self.groups.push(group.clone());
        let defined = define(self);
        self.groups.pop();
        defined?;
        Ok(group)
    }

    pub fn route(&self, id: RouteId) -> RouteResult<&Route> {
        self.routes
            .iter()
            .find(|route| route.identifier() == id)
            .ok_or_else(|| RouteError::route_not_found(id))
    }

    pub fn route_mut(&mut self, id: RouteId) -> RouteResult<&mut Route> {
        self.routes
            .iter_mut()
            .find(|route| route.identifier() == id)
            .ok_or_else(|| RouteError::route_not_found(id))
    }

    /// First route named `name`.
    pub fn named(&self, name: &str) -> RouteResult<&Route> {
        self.routes
            .iter()
            .find(|route| route.name() == Some(name))
            .ok_or_else(|| RouteError::route_not_found(name))
    }

    /// Routes in definition order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn remove(&mut self, id: RouteId) -> RouteResult<Route> {
        let index = self
            .routes
            .iter()
            .position(|route| route.identifier() == id)
            .ok_or_else(|| RouteError::route_not_found(id))?;
        Ok(self.routes.remove(index))
    }

    /// Finalize every route.
    pub fn finalize_all(&self) {
        for route in &self.routes {
            route.finalize();
        }
    }

    /// Prepare and run the route `id` with the parameters a matcher produced.
    pub fn dispatch(
        &self,
        id: RouteId,
        req: Request,
        res: Response,
        matched: Arguments,
    ) -> RouteResult<Response> {
        let route = self.route(id)?;
        let req = route.prepare(req, matched);
        route.run(req, res)
    }
}

impl std::fmt::Debug for RouteCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCollector")
            .field("settings", &self.settings)
            .field("routes", &self.routes)
            .field("open_groups", &self.groups.len())
            .finish()
    }
}
