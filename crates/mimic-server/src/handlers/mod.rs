//! The handler capability contract and the concrete handler chain.
//!
//! Every handler declares an immutable [`Registration`] (URL pattern +
//! method) and processes applicable requests against the session state it
//! resolves through the [`StateStore`]. Handlers are assembled into an
//! ordered chain by [`default_chain`]; the dispatcher invokes the first
//! applicable one per request.

mod health;
mod mocks;
mod record;
mod recordings;
mod serve_mock;
mod variables;

pub use health::HealthHandler;
pub use mocks::{ListMocksHandler, RegisterMockHandler, ResetMocksHandler, UpdateMockHandler};
pub use record::ToggleRecordHandler;
pub use recordings::{ClearRecordingsHandler, GetRecordingsHandler};
pub use serve_mock::ServeMockHandler;
pub use variables::{DeleteVariableHandler, GetVariablesHandler, SetVariablesHandler};

use crate::dispatch::{PathParams, Registration};
use crate::http::RouteRequest;
use crate::state::StateStore;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;

/// What a handler did with an applicable request.
#[derive(Debug)]
pub enum Outcome {
    /// A complete response was written.
    Respond(Response<Full<Bytes>>),
    /// The handler declined; the dispatcher falls through to the designed
    /// not-found path. The recording tap still observes the exchange.
    Pass,
}

/// Handler-level failures, converted to HTTP responses at the dispatcher
/// boundary. They never propagate further.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    BadRequest(String),
    #[error("no mock with name '{0}'")]
    UnknownMock(String),
    #[error("mock '{0}' has no scenario '{1}'")]
    UnknownScenario(String, String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HandlerError::UnknownMock(_) | HandlerError::UnknownScenario(_, _) => {
                StatusCode::CONFLICT
            }
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A unit in the dispatch chain.
#[async_trait]
pub trait Handler: Send + Sync {
    /// The immutable registration entry this handler answers to.
    /// Applicability is exactly `registration().matches(request)`: a pure,
    /// cheap predicate over URL and method, no state access, no I/O.
    fn registration(&self) -> &Registration;

    /// Whether this handler answers the request.
    fn is_applicable(&self, req: &RouteRequest) -> bool {
        self.registration().matches(req).is_some()
    }

    /// Process an applicable request. `params` are the path parameters
    /// derived from the registration's pattern match. A handler either
    /// responds once or passes; never both.
    async fn handle(
        &self,
        req: &RouteRequest,
        params: PathParams,
    ) -> Result<Outcome, HandlerError>;
}

/// Assemble the default handler chain for a base path.
///
/// Registration order is part of the observable contract: earlier entries
/// win ties. Admin handlers come first; the mock-serving fallthrough is
/// last so admin URLs can never be shadowed by a mock definition.
pub fn default_chain(base_path: &str, store: &Arc<StateStore>) -> Vec<Arc<dyn Handler>> {
    vec![
        Arc::new(HealthHandler::new(base_path)),
        Arc::new(RegisterMockHandler::new(base_path, Arc::clone(store))),
        Arc::new(ListMocksHandler::new(base_path, Arc::clone(store))),
        Arc::new(ResetMocksHandler::new(base_path, Arc::clone(store))),
        Arc::new(UpdateMockHandler::new(base_path, Arc::clone(store))),
        Arc::new(GetVariablesHandler::new(base_path, Arc::clone(store))),
        Arc::new(SetVariablesHandler::new(base_path, Arc::clone(store))),
        Arc::new(DeleteVariableHandler::new(base_path, Arc::clone(store))),
        Arc::new(ToggleRecordHandler::new(base_path, Arc::clone(store))),
        Arc::new(GetRecordingsHandler::new(base_path, Arc::clone(store))),
        Arc::new(ClearRecordingsHandler::new(base_path, Arc::clone(store))),
        Arc::new(ServeMockHandler::new(base_path, Arc::clone(store))),
    ]
}
