//! Request dispatch across the ordered handler chain.
//!
//! - `route`: URL patterns and registration entries

mod route;

pub use route::{PathParams, Registration, RoutePattern};

use crate::handlers::{Handler, Outcome};
use crate::http::{error_response, not_found, RouteRequest};
use crate::state::{Recording, StateStore};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::Response;
use std::sync::Arc;
use tracing::{debug, warn};

/// Selects and invokes the first applicable handler for each request.
///
/// The chain is fixed at construction; registration order is the sole
/// tie-break when several handlers could match. Per request exactly one
/// handler runs, or none: a miss is answered by the designed 404
/// fallback, not an error.
pub struct Dispatcher {
    handlers: Vec<Arc<dyn Handler>>,
    store: Arc<StateStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<StateStore>, handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { handlers, store }
    }

    /// Dispatch one request to completion.
    pub async fn dispatch(&self, req: RouteRequest) -> Response<Full<Bytes>> {
        debug!(method = %req.method, path = %req.path, "dispatching");

        let selected = self
            .handlers
            .iter()
            .find_map(|h| h.registration().matches(&req).map(|params| (h, params)));

        let response = match selected {
            Some((handler, params)) => match handler.handle(&req, params).await {
                Ok(Outcome::Respond(response)) => response,
                Ok(Outcome::Pass) => not_found(&req.method, &req.path),
                Err(err) => {
                    warn!(
                        method = %req.method,
                        path = %req.path,
                        error = %err,
                        "handler failed"
                    );
                    error_response(err.status(), &err.to_string())
                }
            },
            None => not_found(&req.method, &req.path),
        };

        self.tap(req, response).await
    }

    /// Recording tap: when the request's context is in record mode, append
    /// the request/response pair to its recordings, in arrival order. This
    /// runs after every dispatch, whichever path produced the response.
    async fn tap(&self, req: RouteRequest, response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
        let state = self.store.matching_state(&req);
        if !state.lock().record {
            return response;
        }

        let (parts, body) = response.into_parts();
        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        let recording = Recording {
            method: req.method.to_string(),
            path: req.path.clone(),
            query: req.query.clone(),
            request_body: req.body_string(),
            status: parts.status.as_u16(),
            response_body: if bytes.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&bytes).to_string())
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        state.lock().append_recording(recording);

        Response::from_parts(parts, Full::new(bytes))
    }
}
