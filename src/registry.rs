use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::session::{Outbox, SessionId};

struct Entry {
    username: String,
    outbox: Outbox,
}

#[derive(Default)]
struct Clients {
    by_id: HashMap<SessionId, Entry>,
    by_name: HashMap<String, SessionId>,
}

/// Who is online. Both views live behind one lock so they always agree.
#[derive(Default)]
pub struct ClientRegistry {
    inner: Mutex<Clients>,
}

impl ClientRegistry {
    /// Returns false, leaving the registry untouched, if either the handle or
    /// the username is already registered.
    pub fn register(&self, id: SessionId, username: String, outbox: Outbox) -> bool {
        let mut clients = self.inner.lock();

        if clients.by_id.contains_key(&id) || clients.by_name.contains_key(&username) {
            return false;
        }

        clients.by_name.insert(username.clone(), id);
        clients.by_id.insert(id, Entry { username, outbox });

        true
    }

    /// Removes `id` from every group and then from both client views, with the
    /// client lock held throughout. Lock order: clients, then groups.
    pub fn unregister(&self, id: SessionId, groups: &GroupRegistry) -> Option<String> {
        let mut clients = self.inner.lock();

        groups.remove_member_everywhere(id);

        let entry = clients.by_id.remove(&id)?;
        clients.by_name.remove(&entry.username);

        Some(entry.username)
    }

    pub fn username_of(&self, id: SessionId) -> Option<String> {
        self.inner.lock().by_id.get(&id).map(|e| e.username.clone())
    }

    pub fn id_of(&self, username: &str) -> Option<SessionId> {
        self.inner.lock().by_name.get(username).copied()
    }

    pub fn outbox_of(&self, id: SessionId) -> Option<Outbox> {
        self.inner.lock().by_id.get(&id).map(|e| e.outbox.clone())
    }

    pub fn snapshot(&self) -> Vec<(SessionId, Outbox)> {
        self.inner
            .lock()
            .by_id
            .iter()
            .map(|(id, e)| (*id, e.outbox.clone()))
            .collect()
    }

    /// Outboxes for the given handles; handles no longer registered are skipped.
    pub fn outboxes(&self, ids: &HashSet<SessionId>) -> Vec<(SessionId, Outbox)> {
        let clients = self.inner.lock();

        ids.iter()
            .filter_map(|id| clients.by_id.get(id).map(|e| (*id, e.outbox.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group name to member handles. Groups are never deleted.
#[derive(Default)]
pub struct GroupRegistry {
    groups: DashMap<String, HashSet<SessionId>>,
}

impl GroupRegistry {
    /// Creates the group if needed and adds `id` to it.
    pub fn create(&self, name: &str, id: SessionId) {
        self.groups.entry(name.to_string()).or_default().insert(id);
    }

    pub fn join(&self, name: &str, id: SessionId) -> bool {
        match self.groups.get_mut(name) {
            Some(mut members) => {
                members.insert(id);
                true
            }
            None => false,
        }
    }

    /// False only when the group does not exist; leaving a group you are not
    /// in still succeeds.
    pub fn leave(&self, name: &str, id: SessionId) -> bool {
        match self.groups.get_mut(name) {
            Some(mut members) => {
                members.remove(&id);
                true
            }
            None => false,
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn members(&self, name: &str) -> Option<HashSet<SessionId>> {
        self.groups.get(name).map(|m| m.value().clone())
    }

    pub fn remove_member_everywhere(&self, id: SessionId) {
        for mut members in self.groups.iter_mut() {
            members.remove(&id);
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
