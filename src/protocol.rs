pub const USERNAME_PROMPT: &str = "Enter username: ";
pub const PASSWORD_PROMPT: &str = "Enter password: ";
pub const WELCOME: &str = "Welcome to the server";
pub const AUTH_FAILED: &str = "Authentication Failed";
pub const NO_SUCH_GROUP: &str = "No such group exists.";
pub const NO_SUCH_USER: &str = "No such user exists.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GroupMsg { group: String, text: String },
    Broadcast { text: String },
    Msg { to: String, text: String },
    CreateGroup { group: String },
    JoinGroup { group: String },
    LeaveGroup { group: String },
    Unrecognized,
}

/// Classifies one received payload. Anything that does not fit a known form
/// comes back as `Unrecognized`.
pub fn parse_command(payload: &str) -> Command {
    let Some((cmd, rest)) = payload.split_once(' ') else {
        return Command::Unrecognized;
    };

    match cmd {
        "/group_msg" => match rest.split_once(' ') {
            Some((group, text)) => Command::GroupMsg {
                group: group.to_string(),
                text: text.to_string(),
            },
            None => Command::Unrecognized,
        },
        "/msg" => match rest.split_once(' ') {
            Some((to, text)) => Command::Msg {
                to: to.to_string(),
                text: text.to_string(),
            },
            None => Command::Unrecognized,
        },
        "/broadcast" => Command::Broadcast { text: rest.to_string() },
        "/create_group" => Command::CreateGroup { group: rest.to_string() },
        "/join_group" => Command::JoinGroup { group: rest.to_string() },
        "/leave_group" => Command::LeaveGroup { group: rest.to_string() },
        _ => Command::Unrecognized,
    }
}

/// `[label]: text`, the form every relayed message takes on the wire.
pub fn prefixed(label: &str, text: &str) -> String {
    format!("[{}]: {}", label, text)
}

pub fn group_label(group: &str) -> String {
    format!("Group {}", group)
}

pub fn joined_chat(username: &str) -> String {
    format!("{} has joined the chat.", username)
}

pub fn left_chat(username: &str) -> String {
    format!("{} left the chat.", username)
}

pub fn group_created(group: &str) -> String {
    format!("Group {} created.", group)
}

pub fn group_joined(group: &str) -> String {
    format!("You joined the group {}.", group)
}

pub fn group_left(group: &str) -> String {
    format!("You left the group {}.", group)
}
