//! Recorded-traffic handlers: list and clear.

use super::{Handler, HandlerError, Outcome};
use crate::dispatch::{PathParams, Registration, RoutePattern};
use crate::http::{empty_json, json_response, RouteRequest};
use crate::state::StateStore;
use async_trait::async_trait;
use hyper::{Method, StatusCode};
use std::sync::Arc;

/// `GET <base>/recordings` - captured traffic plus the current mode flag.
pub struct GetRecordingsHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

impl GetRecordingsHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::of(
                Method::GET,
                RoutePattern::Exact(format!("{base_path}/recordings")),
            ),
            store,
        }
    }
}

#[async_trait]
impl Handler for GetRecordingsHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let state = self.store.matching_state(req);
        let (recordings, record) = {
            let state = state.lock();
            (state.recordings.clone(), state.record)
        };
        Ok(Outcome::Respond(json_response(
            StatusCode::OK,
            &serde_json::json!({ "recordings": recordings, "record": record }),
        )))
    }
}

/// `DELETE <base>/recordings` - drop the captured traffic. Leaves the
/// record flag as it is.
pub struct ClearRecordingsHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

impl ClearRecordingsHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::of(
                Method::DELETE,
                RoutePattern::Exact(format!("{base_path}/recordings")),
            ),
            store,
        }
    }
}

#[async_trait]
impl Handler for ClearRecordingsHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let state = self.store.matching_state(req);
        state.lock().clear_recordings();
        Ok(Outcome::Respond(empty_json(StatusCode::OK)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Recording;

    fn seeded_store() -> Arc<StateStore> {
        let store = Arc::new(StateStore::new());
        let probe = RouteRequest::new(Method::GET, "/");
        let state = store.matching_state(&probe);
        let mut state = state.lock();
        state.record = true;
        state.append_recording(Recording {
            method: "GET".to_string(),
            path: "/api/users".to_string(),
            query: None,
            request_body: None,
            status: 200,
            response_body: Some("[]".to_string()),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        });
        drop(state);
        store
    }

    #[tokio::test]
    async fn clear_drops_recordings_but_keeps_the_flag() {
        let store = seeded_store();
        let handler = ClearRecordingsHandler::new("/mimic", Arc::clone(&store));

        let req = RouteRequest::new(Method::DELETE, "/mimic/recordings");
        let Outcome::Respond(response) = handler.handle(&req, PathParams::new()).await.unwrap()
        else {
            panic!("expected a response");
        };
        assert_eq!(response.status(), StatusCode::OK);

        let state = store.matching_state(&req);
        let state = state.lock();
        assert!(state.recordings.is_empty());
        assert!(state.record);
    }

    #[tokio::test]
    async fn get_reports_recordings_and_flag() {
        let store = seeded_store();
        let handler = GetRecordingsHandler::new("/mimic", Arc::clone(&store));

        let req = RouteRequest::new(Method::GET, "/mimic/recordings");
        let Outcome::Respond(response) = handler.handle(&req, PathParams::new()).await.unwrap()
        else {
            panic!("expected a response");
        };
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn applicability_is_method_split_on_one_route() {
        let store = Arc::new(StateStore::new());
        let get = GetRecordingsHandler::new("/mimic", Arc::clone(&store));
        let clear = ClearRecordingsHandler::new("/mimic", store);

        let get_req = RouteRequest::new(Method::GET, "/mimic/recordings");
        let del_req = RouteRequest::new(Method::DELETE, "/mimic/recordings");

        assert!(get.is_applicable(&get_req));
        assert!(!get.is_applicable(&del_req));
        assert!(clear.is_applicable(&del_req));
        assert!(!clear.is_applicable(&get_req));
    }
}
