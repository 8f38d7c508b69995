use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::error::ServerError;

/// Username to secret lookup, loaded once at startup.
#[derive(Debug, Default, Clone)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let text = std::fs::read_to_string(path).map_err(|source| ServerError::Credentials {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::parse(&text))
    }

    /// Parses `name:secret` lines. The secret is everything after the first colon.
    pub fn parse(text: &str) -> Self {
        let mut users = HashMap::new();

        for (lineno, line) in text.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }

            match line.split_once(':') {
                Some((name, secret)) => {
                    users.insert(name.to_string(), secret.to_string());
                }
                None => warn!(line = lineno + 1, "credential line has no ':' separator, skipped"),
            }
        }

        Self { users }
    }

    pub fn verify(&self, username: &str, secret: &str) -> bool {
        self.users.get(username).is_some_and(|s| s == secret)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
