use tracing::debug;

use crate::messenger;
use crate::protocol::{self, Command, NO_SUCH_GROUP, NO_SUCH_USER};
use crate::session::Session;
use crate::state::ServerState;

/// Runs one command on behalf of `session`. Failures are reported to the
/// sender as plain text; nothing here can end the session.
pub fn dispatch(state: &ServerState, session: &Session, cmd: Command) {
    let me = session.id;

    match cmd {
        Command::GroupMsg { group, text } => {
            if !state.groups.exists(&group) {
                messenger::unicast(&state.clients, me, NO_SUCH_GROUP);
                return;
            }

            // Existence was checked above as a separate step; a group removed
            // in between would make this a silent no-op.
            let msg = protocol::prefixed(&protocol::group_label(&group), &text);
            messenger::group_cast_except(&state.clients, &state.groups, &group, me, msg);
        }

        Command::Broadcast { text } => {
            let msg = protocol::prefixed(&session.username, &text);
            messenger::broadcast_except(&state.clients, Some(me), msg);
        }

        Command::Msg { to, text } => match state.clients.id_of(&to) {
            Some(id) => {
                let msg = protocol::prefixed(&session.username, &text);
                messenger::unicast(&state.clients, id, msg);
            }
            None => messenger::unicast(&state.clients, me, NO_SUCH_USER),
        },

        Command::CreateGroup { group } => {
            state.groups.create(&group, me);
            debug!(session = %me, %group, "group created or re-announced");
            messenger::unicast(&state.clients, me, protocol::group_created(&group));
        }

        Command::JoinGroup { group } => {
            let reply = if state.groups.join(&group, me) {
                protocol::group_joined(&group)
            } else {
                NO_SUCH_GROUP.to_string()
            };
            messenger::unicast(&state.clients, me, reply);
        }

        Command::LeaveGroup { group } => {
            let reply = if state.groups.leave(&group, me) {
                protocol::group_left(&group)
            } else {
                NO_SUCH_GROUP.to_string()
            };
            messenger::unicast(&state.clients, me, reply);
        }

        Command::Unrecognized => {
            debug!(session = %me, "unrecognized payload dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::credentials::CredentialStore;
    use crate::session::SessionId;
    use tokio::sync::mpsc;

    fn login(state: &ServerState, name: &str) -> (Session, mpsc::Receiver<String>) {
        let session = Session::new(SessionId::next(), name.to_string());
        let (tx, rx) = mpsc::channel(16);
        assert!(state.clients.register(session.id, session.username.clone(), tx));
        (session, rx)
    }

    fn state() -> ServerState {
        ServerState::new(Config::default(), CredentialStore::default())
    }

    fn run(state: &ServerState, session: &Session, payload: &str) {
        dispatch(state, session, protocol::parse_command(payload));
    }

    #[tokio::test]
    async fn create_join_then_group_message() {
        let state = state();
        let (alice, mut rx_a) = login(&state, "alice");
        let (bob, mut rx_b) = login(&state, "bob");

        run(&state, &alice, "/create_group g");
        assert_eq!(rx_a.recv().await.as_deref(), Some("Group g created."));

        run(&state, &bob, "/join_group g");
        assert_eq!(rx_b.recv().await.as_deref(), Some("You joined the group g."));

        let members = state.groups.members("g").unwrap();
        assert!(members.contains(&alice.id) && members.contains(&bob.id));

        run(&state, &alice, "/group_msg g hi");
        assert_eq!(rx_b.recv().await.as_deref(), Some("[Group g]: hi"));
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_targets_get_error_replies() {
        let state = state();
        let (alice, mut rx_a) = login(&state, "alice");
        let (_bob, mut rx_b) = login(&state, "bob");

        run(&state, &alice, "/msg nobody hi");
        assert_eq!(rx_a.recv().await.as_deref(), Some(NO_SUCH_USER));

        run(&state, &alice, "/group_msg nowhere hi");
        assert_eq!(rx_a.recv().await.as_deref(), Some(NO_SUCH_GROUP));

        run(&state, &alice, "/join_group nowhere");
        assert_eq!(rx_a.recv().await.as_deref(), Some(NO_SUCH_GROUP));

        run(&state, &alice, "/leave_group nowhere");
        assert_eq!(rx_a.recv().await.as_deref(), Some(NO_SUCH_GROUP));

        assert!(rx_b.try_recv().is_err());
        assert!(state.groups.is_empty());
    }

    #[tokio::test]
    async fn direct_message_reaches_only_recipient() {
        let state = state();
        let (alice, mut rx_a) = login(&state, "alice");
        let (_bob, mut rx_b) = login(&state, "bob");
        let (_carol, mut rx_c) = login(&state, "carol");

        run(&state, &alice, "/msg bob psst");

        assert_eq!(rx_b.recv().await.as_deref(), Some("[alice]: psst"));
        assert!(rx_a.try_recv().is_err());
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn leave_is_lenient_about_membership() {
        let state = state();
        let (alice, mut rx_a) = login(&state, "alice");

        run(&state, &alice, "/create_group study");
        assert_eq!(rx_a.recv().await.as_deref(), Some("Group study created."));

        for _ in 0..2 {
            run(&state, &alice, "/leave_group study");
            assert_eq!(rx_a.recv().await.as_deref(), Some("You left the group study."));
        }
        assert!(state.groups.members("study").unwrap().is_empty());
    }

    #[tokio::test]
    async fn unrecognized_is_silent() {
        let state = state();
        let (alice, mut rx_a) = login(&state, "alice");
        let (_bob, mut rx_b) = login(&state, "bob");

        run(&state, &alice, "hello?");
        run(&state, &alice, "/broadcast");

        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn stuck_recipient_does_not_block_sender() {
        let state = state();
        let (alice, mut rx_a) = login(&state, "alice");
        let (_bob, mut rx_b) = login(&state, "bob");

        let mallory = SessionId::next();
        let (tx_m, _rx_m) = mpsc::channel(1);
        tx_m.try_send("backlog".to_string()).unwrap();
        assert!(state.clients.register(mallory, "mallory".into(), tx_m));

        run(&state, &alice, "/msg mallory hi");
        run(&state, &alice, "/broadcast hi");

        assert_eq!(rx_b.recv().await.as_deref(), Some("[alice]: hi"));
        assert!(rx_a.try_recv().is_err());
        assert_eq!(state.clients.len(), 3);
    }
}
