//! Accept loop: one hyper connection task per client, every request
//! funneled through the dispatcher.

use crate::dispatch::Dispatcher;
use crate::http::RouteRequest;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

pub struct MockServer {
    listener: TcpListener,
    addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
}

impl MockServer {
    /// Bind the listener. Split from [`MockServer::run`] so callers (and
    /// the integration tests) can bind port 0 and read the assigned port.
    pub async fn bind(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        Ok(Self {
            listener,
            addr,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until the task is dropped or aborted.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        info!("mimic listening on http://{}", self.addr);

        loop {
            let (stream, _) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let dispatcher = Arc::clone(&self.dispatcher);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let dispatcher = Arc::clone(&dispatcher);
                    async move {
                        let route_req = RouteRequest::from_hyper(req).await?;
                        Ok::<_, hyper::Error>(dispatcher.dispatch(route_req).await)
                    }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("connection error: {}", e);
                }
            });
        }
    }
}
