//! Delivery to one, many, or all sessions.
//!
//! Every primitive snapshots the registry it needs, drops the lock, and only
//! then queues the text. A session that joins or leaves after the snapshot may
//! or may not see the message.
//!
//! Queueing never waits: a recipient whose outbox is full loses the message,
//! so a peer that stops reading only starves itself.

use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace};

use crate::registry::{ClientRegistry, GroupRegistry};
use crate::session::{Outbox, SessionId};

fn deliver(id: SessionId, outbox: &Outbox, text: String) {
    match outbox.try_send(text) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => debug!(session = %id, "outbox full, message dropped"),
        Err(TrySendError::Closed(_)) => trace!(session = %id, "outbox closed, message dropped"),
    }
}

pub fn unicast(clients: &ClientRegistry, to: SessionId, text: impl Into<String>) {
    let Some(outbox) = clients.outbox_of(to) else {
        return;
    };

    deliver(to, &outbox, text.into());
}

/// Sends to every registered session except `except`.
pub fn broadcast_except(clients: &ClientRegistry, except: Option<SessionId>, text: impl Into<String>) {
    let text = text.into();
    let targets = clients.snapshot();

    for (id, outbox) in targets {
        if Some(id) != except {
            deliver(id, &outbox, text.clone());
        }
    }
}

/// Sends to the members of `group` except `sender`. Returns false if the group
/// does not exist at snapshot time.
pub fn group_cast_except(
    clients: &ClientRegistry,
    groups: &GroupRegistry,
    group: &str,
    sender: SessionId,
    text: impl Into<String>,
) -> bool {
    let Some(mut members) = groups.members(group) else {
        return false;
    };
    members.remove(&sender);

    let text = text.into();
    for (id, outbox) in clients.outboxes(&members) {
        deliver(id, &outbox, text.clone());
    }

    true
}
