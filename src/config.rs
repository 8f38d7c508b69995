use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:12345";
pub const DEFAULT_BUFFER_SIZE: usize = 1024;
pub const DEFAULT_OUTBOX_CAPACITY: usize = 64;

/// Multi-room chat server with password authentication.
#[derive(Parser, Debug, Clone)]
#[command(name = "huddle", version, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "HUDDLE_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Credential file with one `username:secret` pair per line
    #[arg(long, env = "HUDDLE_USERS", value_name = "FILE", default_value = "users.txt")]
    pub users: PathBuf,

    /// Bytes taken by a single read; each read is one message
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Upper bound on concurrently handled connections
    #[arg(long)]
    pub max_sessions: Option<usize>,

    /// Outbound messages queued per session before senders wait
    #[arg(long, default_value_t = DEFAULT_OUTBOX_CAPACITY)]
    pub outbox_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            users: PathBuf::from("users.txt"),
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_sessions: None,
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_default() {
        let cfg = Config::try_parse_from(["huddle"]).unwrap();
        let def = Config::default();

        assert_eq!(cfg.listen, def.listen);
        assert_eq!(cfg.users, def.users);
        assert_eq!(cfg.buffer_size, 1024);
        assert_eq!(cfg.max_sessions, None);
    }

    #[test]
    fn cli_overrides() {
        let cfg = Config::try_parse_from([
            "huddle",
            "--listen",
            "127.0.0.1:9000",
            "--max-sessions",
            "8",
            "--buffer-size",
            "256",
        ])
        .unwrap();

        assert_eq!(cfg.listen, "127.0.0.1:9000");
        assert_eq!(cfg.max_sessions, Some(8));
        assert_eq!(cfg.buffer_size, 256);
    }
}
