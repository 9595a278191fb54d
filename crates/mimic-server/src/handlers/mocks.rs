//! Mock-definition handlers: register, list, update selection, reset.

use super::{Handler, HandlerError, Outcome};
use crate::dispatch::{PathParams, Registration, RoutePattern};
use crate::http::{empty_json, json_response, RouteRequest};
use crate::state::{MockDefinition, StateStore};
use async_trait::async_trait;
use hyper::{Method, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// `POST <base>/mocks` - register or replace a mock definition.
pub struct RegisterMockHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

impl RegisterMockHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::of(
                Method::POST,
                RoutePattern::Exact(format!("{base_path}/mocks")),
            ),
            store,
        }
    }
}

#[async_trait]
impl Handler for RegisterMockHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let mock: MockDefinition = req
            .json()
            .map_err(|e| HandlerError::BadRequest(format!("invalid mock definition: {e}")))?;
        mock.validate().map_err(HandlerError::BadRequest)?;

        info!(mock = %mock.name, url = %mock.request.url, "mock registered");

        let state = self.store.matching_state(req);
        state.lock().put_mock(mock);
        Ok(Outcome::Respond(empty_json(StatusCode::CREATED)))
    }
}

/// `GET <base>/mocks` - list registered definitions, name-sorted.
pub struct ListMocksHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

impl ListMocksHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::of(
                Method::GET,
                RoutePattern::Exact(format!("{base_path}/mocks")),
            ),
            store,
        }
    }
}

#[async_trait]
impl Handler for ListMocksHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let state = self.store.matching_state(req);
        let mocks: Vec<MockDefinition> = state
            .lock()
            .mocks_sorted()
            .into_iter()
            .cloned()
            .collect();
        Ok(Outcome::Respond(json_response(
            StatusCode::OK,
            &serde_json::json!({ "mocks": mocks }),
        )))
    }
}

/// Runtime update for one mock: scenario selection, delay, echo.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MockUpdate {
    name: String,
    /// `Some(scenario)` selects; `None` leaves the selection untouched.
    scenario: Option<String>,
    delay_ms: Option<u64>,
    echo: Option<bool>,
}

/// `PUT <base>/mocks` - update the runtime selection of one mock.
/// Unknown mock or scenario answers 409; the state is left untouched.
pub struct UpdateMockHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

impl UpdateMockHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::of(
                Method::PUT,
                RoutePattern::Exact(format!("{base_path}/mocks")),
            ),
            store,
        }
    }
}

#[async_trait]
impl Handler for UpdateMockHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let update: MockUpdate = req
            .json()
            .map_err(|e| HandlerError::BadRequest(format!("invalid mock update: {e}")))?;

        let state = self.store.matching_state(req);
        // Validate and apply under one lock so a concurrent re-register
        // cannot slip between the check and the write.
        let mut state = state.lock();
        let mock = state
            .mocks
            .get_mut(&update.name)
            .ok_or_else(|| HandlerError::UnknownMock(update.name.clone()))?;

        if let Some(scenario) = &update.scenario {
            if !mock.responses.contains_key(scenario) {
                return Err(HandlerError::UnknownScenario(
                    update.name.clone(),
                    scenario.clone(),
                ));
            }
            mock.scenario = Some(scenario.clone());
        }
        if let Some(delay_ms) = update.delay_ms {
            mock.delay_ms = delay_ms;
        }
        if let Some(echo) = update.echo {
            mock.echo = echo;
        }

        Ok(Outcome::Respond(empty_json(StatusCode::OK)))
    }
}

/// `PUT <base>/mocks/defaults` - reset every mock to its default scenario,
/// zero delay, echo off.
pub struct ResetMocksHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

impl ResetMocksHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::of(
                Method::PUT,
                RoutePattern::Exact(format!("{base_path}/mocks/defaults")),
            ),
            store,
        }
    }
}

#[async_trait]
impl Handler for ResetMocksHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let state = self.store.matching_state(req);
        state.lock().reset_mocks_to_defaults();
        Ok(Outcome::Respond(empty_json(StatusCode::OK)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    const BASE: &str = "/mimic";

    fn definition_json(name: &str) -> String {
        serde_json::json!({
            "name": name,
            "request": {"url": "/api/users$", "method": "GET"},
            "responses": {
                "ok": {"status": 200, "data": [], "default": true},
                "error": {"status": 500}
            }
        })
        .to_string()
    }

    async fn register(store: &Arc<StateStore>, name: &str) {
        let handler = RegisterMockHandler::new(BASE, Arc::clone(store));
        let mut req = RouteRequest::new(Method::POST, "/mimic/mocks");
        req.body = Bytes::from(definition_json(name));
        let Outcome::Respond(response) = handler.handle(&req, PathParams::new()).await.unwrap()
        else {
            panic!("expected a response");
        };
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn register_stores_the_definition() {
        let store = Arc::new(StateStore::new());
        register(&store, "get-users").await;

        let probe = RouteRequest::new(Method::GET, "/");
        let state = store.matching_state(&probe);
        assert!(state.lock().mocks.contains_key("get-users"));
    }

    #[tokio::test]
    async fn register_rejects_invalid_regex() {
        let store = Arc::new(StateStore::new());
        let handler = RegisterMockHandler::new(BASE, Arc::clone(&store));

        let mut req = RouteRequest::new(Method::POST, "/mimic/mocks");
        req.body = Bytes::from(
            serde_json::json!({
                "name": "broken",
                "request": {"url": "[unclosed", "method": "GET"},
                "responses": {"ok": {"default": true}}
            })
            .to_string(),
        );

        let err = handler.handle(&req, PathParams::new()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_selects_a_scenario() {
        let store = Arc::new(StateStore::new());
        register(&store, "get-users").await;

        let handler = UpdateMockHandler::new(BASE, Arc::clone(&store));
        let mut req = RouteRequest::new(Method::PUT, "/mimic/mocks");
        req.body = Bytes::from(r#"{"name": "get-users", "scenario": "error", "delayMs": 250}"#);

        let Outcome::Respond(response) = handler.handle(&req, PathParams::new()).await.unwrap()
        else {
            panic!("expected a response");
        };
        assert_eq!(response.status(), StatusCode::OK);

        let state = store.matching_state(&req);
        let state = state.lock();
        let mock = state.mocks.get("get-users").unwrap();
        assert_eq!(mock.scenario.as_deref(), Some("error"));
        assert_eq!(mock.delay_ms, 250);
    }

    #[tokio::test]
    async fn update_unknown_mock_conflicts() {
        let store = Arc::new(StateStore::new());
        let handler = UpdateMockHandler::new(BASE, Arc::clone(&store));

        let mut req = RouteRequest::new(Method::PUT, "/mimic/mocks");
        req.body = Bytes::from(r#"{"name": "missing"}"#);

        let err = handler.handle(&req, PathParams::new()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn update_unknown_scenario_conflicts_and_changes_nothing() {
        let store = Arc::new(StateStore::new());
        register(&store, "get-users").await;

        let handler = UpdateMockHandler::new(BASE, Arc::clone(&store));
        let mut req = RouteRequest::new(Method::PUT, "/mimic/mocks");
        req.body = Bytes::from(r#"{"name": "get-users", "scenario": "missing"}"#);

        let err = handler.handle(&req, PathParams::new()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let state = store.matching_state(&req);
        assert_eq!(state.lock().mocks.get("get-users").unwrap().scenario, None);
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let store = Arc::new(StateStore::new());
        register(&store, "get-users").await;

        let update = UpdateMockHandler::new(BASE, Arc::clone(&store));
        let mut req = RouteRequest::new(Method::PUT, "/mimic/mocks");
        req.body = Bytes::from(r#"{"name": "get-users", "scenario": "error", "echo": true}"#);
        update.handle(&req, PathParams::new()).await.unwrap();

        let reset = ResetMocksHandler::new(BASE, Arc::clone(&store));
        let req = RouteRequest::new(Method::PUT, "/mimic/mocks/defaults");
        reset.handle(&req, PathParams::new()).await.unwrap();

        let state = store.matching_state(&req);
        let state = state.lock();
        let mock = state.mocks.get("get-users").unwrap();
        assert_eq!(mock.scenario, None);
        assert!(!mock.echo);
    }

    #[tokio::test]
    async fn list_is_name_sorted() {
        let store = Arc::new(StateStore::new());
        register(&store, "zeta").await;
        register(&store, "alpha").await;

        let handler = ListMocksHandler::new(BASE, Arc::clone(&store));
        let req = RouteRequest::new(Method::GET, "/mimic/mocks");
        let Outcome::Respond(response) = handler.handle(&req, PathParams::new()).await.unwrap()
        else {
            panic!("expected a response");
        };
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn applicability_is_exact_per_route() {
        let store = Arc::new(StateStore::new());
        let update = UpdateMockHandler::new(BASE, Arc::clone(&store));
        let reset = ResetMocksHandler::new(BASE, store);

        let defaults = RouteRequest::new(Method::PUT, "/mimic/mocks/defaults");
        assert!(!update.is_applicable(&defaults));
        assert!(reset.is_applicable(&defaults));

        let collection = RouteRequest::new(Method::PUT, "/mimic/mocks");
        assert!(update.is_applicable(&collection));
        assert!(!reset.is_applicable(&collection));
    }
}
