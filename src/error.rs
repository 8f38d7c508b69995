use std::io;
use std::path::PathBuf;

/// Failures that take the whole server down.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("cannot read credential file {}: {source}", .path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),
}
