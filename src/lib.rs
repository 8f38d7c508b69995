//! Authenticated multi-group text chat over TCP.
//!
//! Clients log in with a username and password from a flat credential file,
//! then exchange direct messages, server-wide broadcasts, and messages scoped
//! to named groups.

pub mod config;
pub mod conn;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod messenger;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod state;

pub use config::Config;
pub use credentials::CredentialStore;
pub use state::ServerState;
