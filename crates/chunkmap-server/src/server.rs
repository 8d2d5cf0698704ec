//! HTTP map server

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::protocol::{Method, Request, Response, Route};

/// Visualization page served at `/`
const INDEX_HTML: &str = include_str!("../static/index.html");

/// Upper bound on header lines read before a request is answered
const MAX_HEADER_LINES: usize = 100;

/// Errors at the serving boundary
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait that the application implements to provide the served documents.
///
/// Called concurrently from connection tasks, so implementations must only
/// read shared state.
pub trait SnapshotSource: Send + Sync + 'static {
    /// JSON array of every aggregated unit
    fn document(&self) -> serde_json::Result<String>;

    /// Counters describing the aggregate
    fn stats(&self) -> serde_json::Value;
}

/// A bound, not yet running, map server
pub struct MapServer {
    listener: TcpListener,
    source: Arc<dyn SnapshotSource>,
}

impl MapServer {
    /// Bind the listener. Failure is returned to the caller.
    pub async fn bind(addr: &str, source: Arc<dyn SnapshotSource>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Self { listener, source })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the task is dropped.
    pub async fn serve(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    log::debug!("Map client connected from {}", peer);
                    let source = self.source.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, source).await {
                            log::warn!("Map client {} error: {}", peer, e);
                        }
                    });
                }
                Err(e) => {
                    log::error!("Map server accept error: {}", e);
                }
            }
        }
    }

    /// Bind and serve in a background task.
    ///
    /// Returns immediately. A bind failure is logged and only ends the
    /// server task; the caller keeps running.
    pub fn start(source: Arc<dyn SnapshotSource>, addr: String) -> MapServerHandle {
        let handle = tokio::spawn(async move {
            let server = match MapServer::bind(&addr, source).await {
                Ok(server) => {
                    log::info!("Map server listening on http://{}", addr);
                    server
                }
                Err(e) => {
                    log::error!("Map server failed to start: {}", e);
                    return;
                }
            };
            server.serve().await;
        });

        MapServerHandle { handle }
    }
}

/// Handle to a background server task - dropping it leaves the task running
pub struct MapServerHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl MapServerHandle {
    /// Stop accepting connections
    pub fn stop(self) {
        self.handle.abort();
        log::info!("Map server stopped");
    }

    /// True once the server task has exited (e.g. after a bind failure)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

async fn handle_connection(
    stream: TcpStream,
    source: Arc<dyn SnapshotSource>,
) -> Result<(), ServerError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(());
    }

    // Drain headers; nothing in them changes the response
    let mut header = String::new();
    for _ in 0..MAX_HEADER_LINES {
        header.clear();
        let n = reader.read_line(&mut header).await?;
        if n == 0 || header.trim().is_empty() {
            break;
        }
    }

    let response = match Request::parse(&request_line) {
        Some(request) => respond(&request, source.as_ref()),
        None => Response::error(400, "malformed request line"),
    };

    writer.write_all(&response.to_bytes()).await?;
    writer.flush().await?;
    writer.shutdown().await?;
    Ok(())
}

/// Build the response for a parsed request
pub fn respond(request: &Request, source: &dyn SnapshotSource) -> Response {
    match request.method {
        Method::Options => return Response::preflight(),
        Method::Other => return Response::error(405, "method not allowed"),
        Method::Get => {}
    }

    match Route::resolve(&request.path) {
        Route::Index => Response::html(INDEX_HTML),
        Route::Chunks => match source.document() {
            Ok(body) => Response::json(body),
            Err(e) => {
                log::error!("Failed to serialize chunk document: {}", e);
                Response::error(500, "serialization failed")
            }
        },
        Route::Stats => Response::json(source.stats().to_string()),
        Route::NotFound => Response::error(404, "not found"),
    }
}
