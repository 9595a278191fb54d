//! Liveness endpoint.

use super::{Handler, HandlerError, Outcome};
use crate::dispatch::{PathParams, Registration, RoutePattern};
use crate::http::{json_response, RouteRequest};
use async_trait::async_trait;
use hyper::{Method, StatusCode};

/// `GET <base>/health` - always `{"status":"ok"}`.
pub struct HealthHandler {
    registration: Registration,
}

impl HealthHandler {
    pub fn new(base_path: &str) -> Self {
        Self {
            registration: Registration::of(
                Method::GET,
                RoutePattern::Exact(format!("{base_path}/health")),
            ),
        }
    }
}

#[async_trait]
impl Handler for HealthHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        _req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        Ok(Outcome::Respond(json_response(
            StatusCode::OK,
            &serde_json::json!({"status": "ok"}),
        )))
    }
}
