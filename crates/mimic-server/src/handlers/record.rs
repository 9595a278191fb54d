//! Record-mode toggle. The only mutator of the `record` flag.

use super::{Handler, HandlerError, Outcome};
use crate::dispatch::{PathParams, Registration, RoutePattern};
use crate::http::{empty_json, RouteRequest};
use crate::state::StateStore;
use async_trait::async_trait;
use hyper::{Method, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct RecordToggle {
    record: bool,
}

/// `PUT <base>/record` - switch between Idle and Recording. Toggling
/// never touches the recordings already captured.
pub struct ToggleRecordHandler {
    registration: Registration,
    store: Arc<StateStore>,
}

impl ToggleRecordHandler {
    pub fn new(base_path: &str, store: Arc<StateStore>) -> Self {
        Self {
            registration: Registration::of(
                Method::PUT,
                RoutePattern::Exact(format!("{base_path}/record")),
            ),
            store,
        }
    }
}

#[async_trait]
impl Handler for ToggleRecordHandler {
    fn registration(&self) -> &Registration {
        &self.registration
    }

    async fn handle(
        &self,
        req: &RouteRequest,
        _params: PathParams,
    ) -> Result<Outcome, HandlerError> {
        let toggle: RecordToggle = req
            .json()
            .map_err(|e| HandlerError::BadRequest(format!("invalid record payload: {e}")))?;

        let state = self.store.matching_state(req);
        state.lock().record = toggle.record;
        info!(record = toggle.record, "record mode set");

        Ok(Outcome::Respond(empty_json(StatusCode::OK)))
    }
}
