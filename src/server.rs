use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::state::ServerState;

pub async fn run(listen_addr: &str, state: ServerState) -> Result<()> {
    let listener = TcpListener::bind(listen_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: listen_addr.to_string(),
            source,
        })?;

    serve(listener, state).await
}

/// Accepts forever, one task per connection. Only an accept failure returns.
pub async fn serve(listener: TcpListener, state: ServerState) -> Result<()> {
    info!(addr = %listener.local_addr()?, "listening");

    let slots = session_slots(state.config.max_sessions);

    loop {
        let permit = match &slots {
            Some(slots) => Some(slots.clone().acquire_owned().await?),
            None => None,
        };

        let (socket, peer) = listener.accept().await.map_err(ServerError::Accept)?;
        info!(%peer, "accepted connection");

        let state = state.clone();

        tokio::spawn(async move {
            if let Err(err) = crate::conn::handle(state, socket, peer).await {
                warn!(%peer, "connection error: {err:?}");
            }
            drop(permit);
        });
    }
}

fn session_slots(max_sessions: Option<usize>) -> Option<Arc<Semaphore>> {
    max_sessions.map(|n| Arc::new(Semaphore::new(n.clamp(1, Semaphore::MAX_PERMITS))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cap_is_clamped() {
        assert!(session_slots(None).is_none());

        let zero = session_slots(Some(0)).unwrap();
        assert_eq!(zero.available_permits(), 1);

        let huge = session_slots(Some(usize::MAX)).unwrap();
        assert_eq!(huge.available_permits(), Semaphore::MAX_PERMITS);
    }
}
