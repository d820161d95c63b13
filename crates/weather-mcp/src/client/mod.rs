//! MCP client: connection-state machine, transport seams and the session.

pub mod channel;
#[cfg(feature = "http")]
pub mod http;
pub mod session;
pub mod state;
#[cfg(feature = "http")]
pub mod ws;

pub use channel::{DuplexLink, OneShotChannel, PersistentChannel, PersistentConnector};
#[cfg(feature = "http")]
pub use http::HttpOneShot;
pub use session::McpClient;
pub use state::{ConnectionState, SessionStateMachine, StateObserver, Subscription};
#[cfg(feature = "http")]
pub use ws::WebSocketConnector;
