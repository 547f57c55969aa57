//! Request and response value types
//!
//! Both types are plain values: every `with_*` method consumes `self` and hands
//! back the modified copy, so a middleware that wants to change the request
//! passes a new value inward instead of mutating shared state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::{RouteError, RouteId, RouteResult};

/// Request attribute under which [`Route::prepare`](crate::Route::prepare)
/// tags a request with the identifier of the matched route.
pub const ROUTE_ATTRIBUTE: &str = "route";

/// Path parameters bound to a route, keyed by parameter name.
pub type Arguments = BTreeMap<String, String>;

/// Snapshot of the matched route carried by a prepared request.
///
/// This is the per-dispatch argument binding: middleware reads and rewrites
/// arguments here, and the terminal handler receives whatever is left. It is
/// kept apart from the attribute map, so attributes set by middleware never
/// disturb it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    /// Identifier of the matched route
    pub identifier: RouteId,
    /// Route name, if one was assigned
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    /// Route pattern
    pub pattern: String,
    /// Methods the route answers to
    pub methods: Vec<String>,
    /// Arguments bound for this dispatch
    #[serde(default)]
    pub arguments: Arguments,
}

impl RouteInfo {
    /// Get an argument, or `default` when it is not bound.
    pub fn argument<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.arguments.get(key).map(String::as_str).unwrap_or(default)
    }
}

/// Incoming request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    method: String,
    path: String,
    attributes: HashMap<String, Value>,
    route: Option<RouteInfo>,
    body: String,
}

impl Request {
    /// Create a request for `method` and `path`.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            attributes: HashMap::new(),
            route: None,
            body: String::new(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Return a copy with the given body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Return a copy tagged with `key = value`.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Return a copy without the attribute `key`.
    pub fn without_attribute(mut self, key: &str) -> Self {
        self.attributes.remove(key);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    /// The route this request was prepared for, if any.
    pub fn route_info(&self) -> Option<&RouteInfo> {
        self.route.as_ref()
    }

    /// Return a copy bound to `info` and tagged with its identifier under
    /// [`ROUTE_ATTRIBUTE`].
    pub fn with_route_info(self, info: RouteInfo) -> Self {
        let tag = info.identifier.to_string();
        let mut req = self.with_attribute(ROUTE_ATTRIBUTE, tag);
        req.route = Some(info);
        req
    }

    /// Get a bound route argument of a prepared request.
    pub fn route_argument(&self, key: &str) -> Option<&str> {
        self.route
            .as_ref()
            .and_then(|info| info.arguments.get(key))
            .map(String::as_str)
    }

    /// Return a copy whose route argument `key` is set to `value`.
    ///
    /// Fails when the request was never prepared for a route.
    pub fn with_route_argument(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> RouteResult<Self> {
        let info = self.route.as_mut().ok_or_else(|| {
            RouteError::invalid_argument("Request has not been prepared for a route")
        })?;
        info.arguments.insert(key.into(), value.into());
        Ok(self)
    }
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    contents: String,
    writable: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

impl Body {
    /// Create an empty writable body.
    pub fn new() -> Self {
        Self {
            contents: String::new(),
            writable: true,
        }
    }

    /// Create a body that rejects writes.
    pub fn read_only(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            writable: false,
        }
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Append `chunk`. Returns false (and leaves the body alone) when the body
    /// is read-only.
    pub fn write(&mut self, chunk: &str) -> bool {
        if !self.writable {
            return false;
        }
        self.contents.push_str(chunk);
        true
    }
}

impl From<String> for Body {
    fn from(contents: String) -> Self {
        Self {
            contents,
            writable: true,
        }
    }
}

impl From<&str> for Body {
    fn from(contents: &str) -> Self {
        Self::from(contents.to_string())
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.contents)
    }
}

/// Outgoing response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Body,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Create an empty `200` response.
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            body: Body::new(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Return a copy with header `name` set. Names are case-insensitive.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Return a copy with the body replaced.
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Return a copy with `chunk` appended to the body. A read-only body is
    /// left as it is.
    pub fn write(mut self, chunk: &str) -> Self {
        self.body.write(chunk);
        self
    }
}
