//! HTTP boundary for chunkmap - serves the aggregated unit document
//!
//! Start the server from your app:
//! ```ignore
//! let source: Arc<dyn SnapshotSource> = Arc::new(my_exporter);
//! let _server = MapServer::start(source, format!("0.0.0.0:{}", DEFAULT_PORT));
//! ```

pub mod protocol;
pub mod server;

pub use protocol::{Method, Request, Response, Route};
pub use server::{MapServer, MapServerHandle, ServerError, SnapshotSource};

/// Default map server port
pub const DEFAULT_PORT: u16 = 8080;
