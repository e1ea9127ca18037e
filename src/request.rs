//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;

/// An incoming request as a handler sees it: the fully read body plus the
/// path parameters the router captured.
pub struct Request {
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(body: Bytes, params: HashMap<String, String>) -> Self {
        Self { body, params }
    }

    pub fn body(&self) -> &[u8] { &self.body }

    /// Returns a named path parameter.
    ///
    /// For a route `/api/students/{id}`, `req.param("id")` on
    /// `/api/students/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[cfg(test)]
impl Request {
    /// Builds a request as the router would hand it to a handler.
    pub(crate) fn for_test(body: &str, params: &[(&str, &str)]) -> Self {
        Self::new(
            Bytes::copy_from_slice(body.as_bytes()),
            params.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_returns_router_captures() {
        let req = Request::for_test("", &[("id", "7")]);
        assert_eq!(req.param("id"), Some("7"));
        assert_eq!(req.param("name"), None);
    }

    #[test]
    fn body_is_exposed_as_read() {
        let req = Request::for_test(r#"{"age":21}"#, &[]);
        assert_eq!(req.body(), br#"{"age":21}"#);
    }
}
