use std::sync::Arc;

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::registry::{ClientRegistry, GroupRegistry};
use crate::session::SessionId;
use crate::{messenger, protocol};

/// Everything a connection task needs; clones share the same registries.
#[derive(Clone)]
pub struct ServerState {
    pub clients: Arc<ClientRegistry>,
    pub groups: Arc<GroupRegistry>,
    pub credentials: Arc<CredentialStore>,
    pub config: Arc<Config>,
}

impl ServerState {
    pub fn new(config: Config, credentials: CredentialStore) -> Self {
        Self {
            clients: Arc::default(),
            groups: Arc::default(),
            credentials: Arc::new(credentials),
            config: Arc::new(config),
        }
    }

    /// Drops `id` from every group and from the client registry, then tells
    /// everyone still online. Must run at most once per session.
    pub fn teardown(&self, id: SessionId) -> Option<String> {
        let username = self.clients.unregister(id, &self.groups)?;

        messenger::broadcast_except(&self.clients, None, protocol::left_chat(&username));

        Some(username)
    }
}
