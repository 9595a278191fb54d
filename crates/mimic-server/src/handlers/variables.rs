//! Named-variable handlers: list, set, delete.

use super::{Handler, HandlerError, Outcome};
use crate::dispatch::{PathParams, Registration, RoutePattern};
use crate::http::{empty_json, json_response, RouteRequest};
use crate::state::StateStore;
use async_trait::async_trait;
use hyper::{Method, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// `GET <base>/variables` - the variable map of the resolved session.
pub struct GetVariablesHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

impl GetVariablesHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::of(
                Method::GET,
                RoutePattern::Exact(format!("{base_path}/variables")),
            ),
            store,
        }
    }
}

#[async_trait]
impl Handler for GetVariablesHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let state = self.store.matching_state(req);
        let variables = state.lock().variables.clone();
        Ok(Outcome::Respond(json_response(
            StatusCode::OK,
            &serde_json::json!({ "variables": variables }),
        )))
    }
}

/// `PUT <base>/variables` - merge a `{name: value}` object into the
/// variable map. Existing keys are overwritten.
pub struct SetVariablesHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

impl SetVariablesHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::of(
                Method::PUT,
                RoutePattern::Exact(format!("{base_path}/variables")),
            ),
            store,
        }
    }
}

#[async_trait]
impl Handler for SetVariablesHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let assignments: HashMap<String, String> = req
            .json()
            .map_err(|e| HandlerError::BadRequest(format!("invalid variables payload: {e}")))?;

        let state = self.store.matching_state(req);
        state.lock().set_variables(assignments);
        Ok(Outcome::Respond(empty_json(StatusCode::OK)))
    }
}

/// `DELETE <base>/variables/<name>` - remove one variable. Removing an
/// absent key is an idempotent success.
pub struct DeleteVariableHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

impl DeleteVariableHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::of(
                Method::DELETE,
                RoutePattern::Item(format!("{base_path}/variables"), "id"),
            ),
            store,
        }
    }
}

#[async_trait]
impl Handler for DeleteVariableHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let name = params
            .get("id")
            .ok_or_else(|| HandlerError::BadRequest("missing variable name".to_string()))?;

        let state = self.store.matching_state(req);
        let existed = state.lock().delete_variable(name);
        debug!(variable = %name, existed, "variable deleted");

        Ok(Outcome::Respond(empty_json(StatusCode::OK)))
    }
}
