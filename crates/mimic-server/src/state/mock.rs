//! Mock definitions: a request matcher plus named response scenarios.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A registered mock. The definition carries both the static shape
/// (matcher, scenarios) and the runtime selection handlers mutate
/// (scenario, delay, echo).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockDefinition {
    pub name: String,
    pub request: RequestMatcher,
    /// Response scenarios by name. At least one is required; the one
    /// flagged `default` is served when no scenario is selected.
    pub responses: HashMap<String, MockResponse>,
    /// Currently selected scenario, `None` for the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    /// Extra latency applied when serving, in milliseconds.
    #[serde(default)]
    pub delay_ms: u64,
    /// Log the incoming request payload when this mock serves.
    #[serde(default)]
    pub echo: bool,
}

/// Which requests a mock answers: a regular expression over the path and
/// an HTTP method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMatcher {
    pub url: String,
    pub method: String,
}

/// One response scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockResponse {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    /// JSON body served for this scenario.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Served when no scenario is selected.
    #[serde(rename = "default", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
}

fn default_status() -> u16 {
    200
}

impl MockDefinition {
    /// Validate a definition on registration: the URL must be a valid
    /// regular expression and at least one scenario must exist.
    pub fn validate(&self) -> Result<(), String> {
        Regex::new(&self.request.url)
            .map_err(|e| format!("invalid url pattern '{}': {e}", self.request.url))?;
        if self.responses.is_empty() {
            return Err(format!("mock '{}' has no responses", self.name));
        }
        if let Some(scenario) = &self.scenario {
            if !self.responses.contains_key(scenario) {
                return Err(format!(
                    "mock '{}' selects unknown scenario '{scenario}'",
                    self.name
                ));
            }
        }
        Ok(())
    }

    /// Whether this mock answers the given request line. The URL pattern
    /// was validated at registration; a definition that somehow carries an
    /// invalid pattern matches nothing.
    pub fn matches(&self, method: &str, path: &str) -> bool {
        if !self.request.method.eq_ignore_ascii_case(method) {
            return false;
        }
        Regex::new(&self.request.url)
            .map(|re| re.is_match(path))
            .unwrap_or(false)
    }

    /// The scenario to serve: the selected one, else the default-flagged
    /// one. `None` means the mock has nothing to serve and the request
    /// falls through.
    pub fn active_response(&self) -> Option<(&str, &MockResponse)> {
        if let Some(name) = &self.scenario {
            return self.responses.get(name).map(|r| (name.as_str(), r));
        }
        self.responses
            .iter()
            .find(|(_, r)| r.is_default)
            .map(|(name, r)| (name.as_str(), r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> MockDefinition {
        serde_json::from_value(serde_json::json!({
            "name": "get-users",
            "request": {"url": "/api/users$", "method": "GET"},
            "responses": {
                "ok": {"status": 200, "data": [{"name": "alice"}], "default": true},
                "error": {"status": 500, "data": {"message": "boom"}}
            }
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_with_defaults() {
        let mock = definition();
        assert_eq!(mock.scenario, None);
        assert_eq!(mock.delay_ms, 0);
        assert!(!mock.echo);
        assert_eq!(mock.responses["error"].status, 500);
        assert!(mock.responses["ok"].is_default);
    }

    #[test]
    fn validate_rejects_bad_regex() {
        let mut mock = definition();
        mock.request.url = "[unclosed".to_string();
        assert!(mock.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_responses() {
        let mut mock = definition();
        mock.responses.clear();
        assert!(mock.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_selection() {
        let mut mock = definition();
        mock.scenario = Some("missing".to_string());
        assert!(mock.validate().is_err());
    }

    #[test]
    fn matches_on_regex_and_method() {
        let mock = definition();
        assert!(mock.matches("GET", "/api/users"));
        assert!(mock.matches("get", "/v2/api/users"));
        assert!(!mock.matches("POST", "/api/users"));
        assert!(!mock.matches("GET", "/api/users/42"));
    }

    #[test]
    fn active_response_prefers_selection_over_default() {
        let mut mock = definition();
        let (name, resp) = mock.active_response().unwrap();
        assert_eq!(name, "ok");
        assert_eq!(resp.status, 200);

        mock.scenario = Some("error".to_string());
        let (name, resp) = mock.active_response().unwrap();
        assert_eq!(name, "error");
        assert_eq!(resp.status, 500);
    }

    #[test]
    fn active_response_none_without_default_or_selection() {
        let mut mock = definition();
        mock.responses.get_mut("ok").unwrap().is_default = false;
        assert!(mock.active_response().is_none());
    }
}
