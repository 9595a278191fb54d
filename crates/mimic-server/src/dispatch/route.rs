//! URL pattern matching for handler registration.

use crate::http::RouteRequest;
use hyper::Method;
use std::borrow::Cow;
use std::collections::HashMap;

/// Path parameters derived from a pattern match.
pub type PathParams = HashMap<String, String>;

/// How a registered URL pattern is matched against a request path.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// The path must equal the registered path exactly. An extra trailing
    /// segment does not match.
    Exact(String),
    /// The registered path plus exactly one trailing segment, captured
    /// (percent-decoded) under the given parameter name.
    Item(String, &'static str),
    /// Any path outside the given prefix. Used by the mock-serving
    /// fallthrough, which answers everything that is not admin traffic.
    Outside(String),
}

impl RoutePattern {
    /// Match a path, yielding captured parameters on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        match self {
            RoutePattern::Exact(registered) => {
                (path == registered).then(PathParams::new)
            }
            RoutePattern::Item(collection, param) => {
                let segment = path.strip_prefix(collection.as_str())?.strip_prefix('/')?;
                if segment.is_empty() || segment.contains('/') {
                    return None;
                }
                let decoded = urlencoding::decode(segment)
                    .unwrap_or(Cow::Borrowed(segment))
                    .into_owned();
                let mut params = PathParams::new();
                params.insert((*param).to_string(), decoded);
                Some(params)
            }
            RoutePattern::Outside(prefix) => {
                let under_prefix =
                    path == prefix || path.strip_prefix(prefix.as_str()).is_some_and(|r| r.starts_with('/'));
                (!under_prefix).then(PathParams::new)
            }
        }
    }
}

/// Immutable handler registration entry: URL pattern plus method filter.
/// `method: None` answers any method.
#[derive(Debug, Clone)]
pub struct Registration {
    pub pattern: RoutePattern,
    pub method: Option<Method>,
}

impl Registration {
    pub fn of(method: Method, pattern: RoutePattern) -> Self {
        Self {
            pattern,
            method: Some(method),
        }
    }

    pub fn any_method(pattern: RoutePattern) -> Self {
        Self {
            pattern,
            method: None,
        }
    }

    /// Applicability predicate over URL and method only. Pure and cheap:
    /// string comparison plus at most one segment split.
    pub fn matches(&self, req: &RouteRequest) -> Option<PathParams> {
        if let Some(method) = &self.method {
            if req.method != *method {
                return None;
            }
        }
        self.pattern.matches(&req.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_requires_full_equality() {
        let pattern = RoutePattern::Exact("/mimic/variables".to_string());

        assert!(pattern.matches("/mimic/variables").is_some());
        assert!(pattern.matches("/mimic/variables/one").is_none());
        assert!(pattern.matches("/mimic/variable").is_none());
        assert!(pattern.matches("/mimic").is_none());
    }

    #[test]
    fn item_captures_exactly_one_segment() {
        let pattern = RoutePattern::Item("/mimic/variables".to_string(), "name");

        let params = pattern.matches("/mimic/variables/one").unwrap();
        assert_eq!(params.get("name").map(String::as_str), Some("one"));

        assert!(pattern.matches("/mimic/variables").is_none());
        assert!(pattern.matches("/mimic/variables/").is_none());
        assert!(pattern.matches("/mimic/variables/one/two").is_none());
        assert!(pattern.matches("/mimic/other/one").is_none());
    }

    #[test]
    fn item_percent_decodes_the_segment() {
        let pattern = RoutePattern::Item("/mimic/variables".to_string(), "name");
        let params = pattern.matches("/mimic/variables/api%20key").unwrap();
        assert_eq!(params.get("name").map(String::as_str), Some("api key"));
    }

    #[test]
    fn outside_excludes_the_prefix_subtree() {
        let pattern = RoutePattern::Outside("/mimic".to_string());

        assert!(pattern.matches("/api/users").is_some());
        assert!(pattern.matches("/mimicry").is_some());
        assert!(pattern.matches("/mimic").is_none());
        assert!(pattern.matches("/mimic/mocks").is_none());
    }

    #[test]
    fn registration_checks_method_and_pattern() {
        let reg = Registration::of(
            Method::DELETE,
            RoutePattern::Item("/mimic/variables".to_string(), "name"),
        );

        let mut req = RouteRequest::new(Method::DELETE, "/mimic/variables/one");
        assert!(reg.matches(&req).is_some());

        req.method = Method::GET;
        assert!(reg.matches(&req).is_none());

        req.method = Method::DELETE;
        req.path = "/mimic/variables".to_string();
        assert!(reg.matches(&req).is_none());
    }

    #[test]
    fn any_method_registration_ignores_method() {
        let reg = Registration::any_method(RoutePattern::Outside("/mimic".to_string()));

        for method in [Method::GET, Method::POST, Method::DELETE] {
            let req = RouteRequest::new(method, "/api/users");
            assert!(reg.matches(&req).is_some());
        }
    }
}
