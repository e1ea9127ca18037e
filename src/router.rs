//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. A path that exists under
//! another method answers `405`, anything else `404`.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax and are read with `req.param("name")`:
    ///
    /// ```rust,no_run
    /// # use students_api::{Method, Request, Response, Router};
    /// # async fn get_student(_: Request) -> Response { Response::text("") }
    /// # async fn list_students(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get, "/api/students/{id}", get_student)
    ///     .on(Method::Get, "/api/students",      list_students);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    /// Routes one fully-read request and produces its response.
    ///
    /// This is the whole per-request hot path; the server calls it after
    /// collecting the body, and tests call it directly. A `HEAD` request with
    /// no route of its own runs the `GET` route and drops the body.
    pub async fn call(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();

        let Ok(method) = parts.method.as_str().parse::<Method>() else {
            return Response::status(Status::MethodNotAllowed);
        };
        let path = parts.uri.path();

        if let Some((handler, params)) = self.lookup(method, path) {
            return handler.call(Request::new(body, params)).await;
        }

        if method == Method::Head {
            if let Some((handler, params)) = self.lookup(Method::Get, path) {
                let mut res = handler.call(Request::new(body, params)).await;
                res.body.clear();
                return res;
            }
        }

        if self.allowed_elsewhere(method, path) {
            Response::status(Status::MethodNotAllowed)
        } else {
            Response::status(Status::NotFound)
        }
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn allowed_elsewhere(&self, method: Method, path: &str) -> bool {
        Method::ALL
            .into_iter()
            .filter(|m| *m != method)
            .any(|m| self.lookup(m, path).is_some())
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
