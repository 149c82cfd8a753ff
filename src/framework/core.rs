//! # Core Routing Framework
//!
//! This module defines the generic building blocks every API call rides on.
//!
//! ## Key Types
//!
//! - [`RequestContext`]: The immutable description of one inbound call.
//! - [`DataBag`]: Accumulated values threaded into nested dispatch.
//! - [`RouteTable`]: An ordered list of pattern routes, first match wins.
//! - [`DispatchContext`]: A request narrowed to one route table.
//! - [`RouteHandler`]: The trait every route implementation satisfies.
//! - [`route_call`]: Matches a dispatch context against its table and runs the handler.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::error::ApiError;
use crate::model::User;

/// A boxed, sendable future. Used where async steps recurse.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Ordered request body.
pub type Payload = Map<String, Value>;

// =============================================================================
// 1. THE REQUEST
// =============================================================================

/// The fixed set of request methods the router understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Method {
    #[default]
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Head,
    Options,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Patch,
        Method::Put,
        Method::Delete,
        Method::Head,
        Method::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ApiError::MethodNotAllowed(s.to_string()))
    }
}

/// Type-erased values carried from an outer dispatch into a nested one.
///
/// Bags are never changed in place: [`DataBag::with`] returns a new bag that
/// extends the old one, so a narrowed context cannot alias its parent's data.
#[derive(Clone, Default)]
pub struct DataBag {
    entries: BTreeMap<String, Arc<dyn Any + Send + Sync>>,
}

impl DataBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new bag with `key` bound to `value`. A key already present in
    /// this bag is shadowed in the returned bag only.
    pub fn with<T: Any + Send + Sync>(&self, key: impl Into<String>, value: Arc<T>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key.into(), value);
        Self { entries }
    }

    /// Merges `other` on top of this bag, producing a new bag.
    pub fn merge(&self, other: &DataBag) -> Self {
        let mut entries = self.entries.clone();
        for (key, value) in &other.entries {
            entries.insert(key.clone(), Arc::clone(value));
        }
        Self { entries }
    }

    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let value = Arc::clone(self.entries.get(key)?);
        value.downcast::<T>().ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Debug for DataBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Everything known about one inbound call.
///
/// Created once per call and discarded when the call ends. Identity and
/// language are plain fields: the orchestrator produces a new, contextualized
/// value instead of touching shared state.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    path: String,
    method: Method,
    payload: Payload,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    identity: Option<User>,
    language: Option<String>,
    translation: Option<String>,
    data: DataBag,
}

impl RequestContext {
    pub fn new(path: impl AsRef<str>, method: Method) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            method,
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Header names are case-insensitive and stored lower-cased.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_identity(mut self, identity: Option<User>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_translation(mut self, translation: Option<String>) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_data(mut self, data: DataBag) -> Self {
        self.data = data;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn identity(&self) -> Option<&User> {
        self.identity.as_ref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }

    pub fn data(&self) -> &DataBag {
        &self.data
    }
}

/// Strips surrounding slashes; the router never sees them.
pub fn normalize_path(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

// =============================================================================
// 2. THE ROUTES
// =============================================================================

/// Captured placeholder values of a matched route, in pattern order.
/// Optional placeholders that did not match are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteArgs(Vec<String>);

impl RouteArgs {
    pub fn new(args: Vec<String>) -> Self {
        Self(args)
    }

    pub fn get(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Implementation behind a route.
///
/// `S` is the service the routes are registered on; handlers receive it so
/// they can resolve models or dispatch further without global state.
#[async_trait]
pub trait RouteHandler<S>: Send + Sync {
    async fn handle(
        &self,
        service: &S,
        ctx: &DispatchContext<'_, S>,
        args: &RouteArgs,
    ) -> Result<Value, ApiError>;
}

/// A single route: a placeholder pattern, the methods it answers and its handler.
pub struct Route<S> {
    pattern: String,
    regex: Regex,
    methods: Vec<Method>,
    handler: Arc<dyn RouteHandler<S>>,
}

impl<S: Send + Sync + 'static> Route<S> {
    pub fn new(
        pattern: &str,
        methods: impl IntoIterator<Item = Method>,
        handler: impl RouteHandler<S> + 'static,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            pattern: normalize_path(pattern),
            regex: compile_pattern(pattern)?,
            methods: methods.into_iter().collect(),
            handler: Arc::new(handler),
        })
    }

    pub fn get(pattern: &str, handler: impl RouteHandler<S> + 'static) -> Result<Self, ApiError> {
        Self::new(pattern, [Method::Get], handler)
    }

    pub fn any(pattern: &str, handler: impl RouteHandler<S> + 'static) -> Result<Self, ApiError> {
        Self::new(pattern, Method::ALL, handler)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn allows(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    /// Matches `path` against the pattern and returns the captured arguments.
    pub fn matches(&self, path: &str) -> Option<RouteArgs> {
        let captures = self.regex.captures(path)?;
        let args = captures
            .iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect();
        Some(RouteArgs(args))
    }
}

impl<S> Clone for Route<S> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            regex: self.regex.clone(),
            methods: self.methods.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<S> Debug for Route<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Translates a placeholder pattern into an anchored regular expression.
///
/// | placeholder   | matches                         |
/// |---------------|---------------------------------|
/// | `(:any)`      | one segment                     |
/// | `(:num)`      | an integer                      |
/// | `(:alpha)`    | ASCII letters                   |
/// | `(:alphanum)` | ASCII letters and digits        |
/// | `(:all)`      | the rest, slashes included      |
/// | `(:any?)`     | an optional trailing segment    |
/// | `(:all?)`     | an optional trailing rest       |
fn compile_pattern(pattern: &str) -> Result<Regex, ApiError> {
    let escaped = regex::escape(&normalize_path(pattern));

    let expr = escaped
        .replace(r"/\(:all\?\)", "(?:/(.*))?")
        .replace(r"/\(:any\?\)", "(?:/([^/]+))?")
        .replace(r"\(:all\?\)", "(.*)")
        .replace(r"\(:any\?\)", "([^/]*)")
        .replace(r"\(:any\)", "([^/]+)")
        .replace(r"\(:num\)", "(-?[0-9]+)")
        .replace(r"\(:alphanum\)", "([a-zA-Z0-9]+)")
        .replace(r"\(:alpha\)", "([a-zA-Z]+)")
        .replace(r"\(:all\)", "(.+?)");

    if expr.contains(r"\(:") {
        return Err(ApiError::InvalidRoute(pattern.to_string()));
    }

    Regex::new(&format!("^{expr}$")).map_err(|e| ApiError::InvalidRoute(format!("{pattern}: {e}")))
}

/// An ordered route table. Registration order is match order; the fallback,
/// if any, is tried after every registered route.
pub struct RouteTable<S> {
    routes: Vec<Route<S>>,
    fallback: Option<Route<S>>,
}

impl<S: Send + Sync + 'static> RouteTable<S> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            fallback: None,
        }
    }

    /// Sets the route consulted when nothing registered matches.
    pub fn fallback(&mut self, route: Route<S>) -> &mut Self {
        self.fallback = Some(route);
        self
    }

    pub fn register(&mut self, route: Route<S>) -> &mut Self {
        self.routes.push(route);
        self
    }

    /// Appends every route of `table` after the existing ones.
    pub fn register_routes(&mut self, table: RouteTable<S>) -> &mut Self {
        self.routes.extend(table.routes);
        self
    }

    pub fn routes(&self) -> &[Route<S>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First route matching both `path` and `method`.
    pub fn find(&self, path: &str, method: Method) -> Option<(&Route<S>, RouteArgs)> {
        self.routes
            .iter()
            .chain(self.fallback.iter())
            .filter(|route| route.allows(method))
            .find_map(|route| route.matches(path).map(|args| (route, args)))
    }
}

impl<S: Send + Sync + 'static> Default for RouteTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for RouteTable<S> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<S> Debug for RouteTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|r| &r.pattern))
            .finish()
    }
}

// =============================================================================
// 3. THE DISPATCH CONTEXT
// =============================================================================

/// A request narrowed to one route table.
///
/// The context borrows its table for the duration of one call and never
/// outlives it. Narrowing produces a fresh context; the parent is untouched,
/// so the same chain can appear twice in a nesting without aliasing.
pub struct DispatchContext<'a, S> {
    request: &'a RequestContext,
    routes: &'a RouteTable<S>,
    path: String,
    data: DataBag,
    depth: usize,
}

impl<'a, S: Send + Sync + 'static> DispatchContext<'a, S> {
    /// The top-level context: the request's own path against the main table.
    pub fn root(request: &'a RequestContext, routes: &'a RouteTable<S>) -> Self {
        Self {
            request,
            routes,
            path: request.path().to_string(),
            data: request.data().clone(),
            depth: 0,
        }
    }

    /// Produces a nested context over `routes`, addressing `path`, with `data`
    /// merged on top of everything accumulated so far.
    pub fn narrow<'b>(
        &'b self,
        routes: &'b RouteTable<S>,
        path: &str,
        data: &DataBag,
    ) -> DispatchContext<'b, S> {
        DispatchContext {
            request: self.request,
            routes,
            path: normalize_path(path),
            data: self.data.merge(data),
            depth: self.depth + 1,
        }
    }

    pub fn request(&self) -> &RequestContext {
        self.request
    }

    pub fn routes(&self) -> &RouteTable<S> {
        self.routes
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.request.method()
    }

    pub fn payload(&self) -> &Payload {
        self.request.payload()
    }

    pub fn data(&self) -> &DataBag {
        &self.data
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Routes `ctx` through its narrowed table.
///
/// A path that matches no route for the request method fails with
/// [`ApiError::RouteNotFound`].
pub async fn route_call<S: Send + Sync + 'static>(
    service: &S,
    ctx: &DispatchContext<'_, S>,
) -> Result<Value, ApiError> {
    let method = ctx.method();
    match ctx.routes().find(ctx.path(), method) {
        Some((route, args)) => {
            debug!(path = ctx.path(), pattern = route.pattern(), %method, depth = ctx.depth(), "Route matched");
            route.handler.handle(service, ctx, &args).await
        }
        None => {
            warn!(path = ctx.path(), %method, depth = ctx.depth(), "No route");
            Err(ApiError::RouteNotFound {
                path: ctx.path().to_string(),
                method: method.to_string(),
            })
        }
    }
}

// =============================================================================
// 4. THE RESPONSE
// =============================================================================

/// What the boundary sends back: a status code and a JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn ok(data: Value) -> Self {
        Self {
            status: 200,
            body: json!({
                "status": "ok",
                "code": 200,
                "data": data,
            }),
        }
    }

    pub fn error(error: &ApiError) -> Self {
        Self {
            status: error.status_code(),
            body: error.to_body(),
        }
    }

    pub fn data(&self) -> Option<&Value> {
        self.body.get("data")
    }
}

impl From<Result<Value, ApiError>> for Response {
    fn from(result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(data) => Response::ok(data),
            Err(e) => Response::error(&e),
        }
    }
}
