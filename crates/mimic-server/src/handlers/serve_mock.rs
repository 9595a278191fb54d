//! The mock-serving fallthrough: answers non-admin traffic from the
//! registered mock definitions.

use super::{Handler, HandlerError, Outcome};
use crate::dispatch::{PathParams, Registration, RoutePattern};
use crate::http::RouteRequest;
use crate::state::{MockResponse, StateStore};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Registered last in the chain, for any method on any path outside the
/// admin base path. Matches the request line against the session's mock
/// definitions (name order, first match wins) and serves the active
/// scenario. Passes when nothing matches, falling through to the 404.
pub struct ServeMockHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

/// Snapshot of everything needed to serve, taken under one lock.
struct Serving {
    mock_name: String,
    scenario: String,
    response: MockResponse,
    delay_ms: u64,
    echo: bool,
}

impl ServeMockHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::any_method(RoutePattern::Outside(base_path.to_string())),
            store,
        }
    }

    /// Find the serving mock and snapshot its active scenario. A single
    /// lock acquisition: match and read happen in one step, so a
    /// concurrent update cannot produce a half-applied view.
    fn resolve(&self, req: &RouteRequest) -> Option<Serving> {
        let state = self.store.matching_state(req);
        let state = state.lock();
        let method = req.method.as_str();

        for mock in state.mocks_sorted() {
            if !mock.matches(method, &req.path) {
                continue;
            }
            let Some((scenario, response)) = mock.active_response() else {
                debug!(mock = %mock.name, "matched mock has no servable scenario");
                continue;
            };
            return Some(Serving {
                mock_name: mock.name.clone(),
                scenario: scenario.to_string(),
                response: response.clone(),
                delay_ms: mock.delay_ms,
                echo: mock.echo,
            });
        }
        None
    }
}

#[async_trait]
impl Handler for ServeMockHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let Some(serving) = self.resolve(req) else {
            return Ok(Outcome::Pass);
        };

        if serving.echo {
            info!(
                mock = %serving.mock_name,
                method = %req.method,
                path = %req.path,
                payload = req.body_string().as_deref().unwrap_or(""),
                "echo"
            );
        }

        // The state lock is long released; only the snapshot waits.
        if serving.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(serving.delay_ms)).await;
        }

        debug!(
            mock = %serving.mock_name,
            scenario = %serving.scenario,
            status = serving.response.status,
            "serving mock response"
        );

        let status =
            StatusCode::from_u16(serving.response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = Response::builder().status(status);
        for (name, value) in &serving.response.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = match &serving.response.data {
            Some(data) => {
                let body = serde_json::to_string(data)
                    .map_err(|e| HandlerError::Internal(anyhow::anyhow!(e)))?;
                if !serving.response.headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
                    builder = builder.header("Content-Type", "application/json");
                }
                builder.body(Full::new(Bytes::from(body)))
            }
            None => builder.body(Full::new(Bytes::new())),
        }
        .map_err(|e| HandlerError::Internal(anyhow::anyhow!(e)))?;

        Ok(Outcome::Respond(response))
    }
}
