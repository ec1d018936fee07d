//! Auth collaborator: permission checks and preview keys.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::config::AuthConfig;

/// Length of a preview key in hex characters.
pub const USER_KEY_LEN: usize = 40;

pub trait Auth: Send + Sync {
    /// True when the user holds any of `levels` (or is an admin).
    fn check_permission(&self, user_id: &str, levels: &[&str]) -> bool;

    /// Constant-time check of a preview key.
    fn check_user_key(&self, user_id: &str, key: &str) -> bool;
}

struct KeyringUser {
    key: String,
    permissions: HashSet<String>,
}

/// Users and their derived keys, built from configuration.
pub struct Keyring {
    users: HashMap<String, KeyringUser>,
}

impl Keyring {
    pub fn from_config(config: &AuthConfig) -> Self {
        let users = config
            .users
            .iter()
            .map(|u| {
                (
                    u.id.clone(),
                    KeyringUser {
                        key: Self::user_key(&u.id, &u.secret),
                        permissions: u.permissions.iter().cloned().collect(),
                    },
                )
            })
            .collect();
        Self { users }
    }

    /// Preview key of a user: the first 40 hex digits of SHA-256(id NUL secret).
    pub fn user_key(user_id: &str, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(secret.as_bytes());
        let mut key = hex::encode(hasher.finalize());
        key.truncate(USER_KEY_LEN);
        key
    }
}

impl Auth for Keyring {
    fn check_permission(&self, user_id: &str, levels: &[&str]) -> bool {
        self.users.get(user_id).is_some_and(|user| {
            user.permissions.contains("admin")
                || levels.iter().any(|level| user.permissions.contains(*level))
        })
    }

    fn check_user_key(&self, user_id: &str, key: &str) -> bool {
        match self.users.get(user_id) {
            Some(user) => constant_time_eq(user.key.as_bytes(), key.as_bytes()),
            None => {
                constant_time_eq(&[b'0'; USER_KEY_LEN], key.as_bytes());
                false
            }
        }
    }
}

/// Compare two secrets without short-circuiting on the first difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
