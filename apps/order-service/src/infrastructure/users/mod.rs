//! In-memory user directory.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::application::ports::UserDirectory;
use crate::domain::{User, UserId};
use crate::error::OrderError;

const TRADER: &str = "USER_ROLE_TRADER";
const ADMIN: &str = "USER_ROLE_ADMIN";

const SEED: [(u128, &str, &str); 4] = [
    (0x1179_803e_06f0_4369_b94f_14e2_6ec1_90a3, "Gleb", TRADER),
    (0x2179_803e_06f0_4369_b94f_14e2_6ec1_90a3, "Oleg", ADMIN),
    (0x3179_803e_06f0_4369_b94f_14e2_6ec1_90a3, "Vova", TRADER),
    (0x4179_803e_06f0_4369_b94f_14e2_6ec1_90a3, "Arsen", ADMIN),
];

/// Process-local `UserDirectory`.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserDirectory {
    /// Empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding the four built-in users.
    #[must_use]
    pub fn seeded() -> Self {
        let directory = Self::new();
        for (id, name, role) in SEED {
            directory.insert(User::new(Uuid::from_u128(id), name, [role]));
        }
        directory
    }

    /// Add or replace a user.
    pub fn insert(&self, user: User) {
        tracing::debug!(user_id = %user.id, "User registered");
        self.users.write().insert(user.id, user);
    }

    /// Number of known users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_user(&self, id: UserId) -> Result<User, OrderError> {
        self.users
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| OrderError::user_not_found(&id.to_string()))
    }
}
