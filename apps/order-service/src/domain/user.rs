//! Users and their role tags.

use std::collections::BTreeSet;

use uuid::Uuid;

/// User identifier.
pub type UserId = Uuid;

/// A user known to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Role tags, e.g. `USER_ROLE_TRADER`.
    pub roles: BTreeSet<String>,
}

impl User {
    /// Create a user with the given roles.
    #[must_use]
    pub fn new<I, S>(id: UserId, name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            name: name.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// True if any of the caller-claimed roles is held by this user.
    #[must_use]
    pub fn has_any_role<S: AsRef<str>>(&self, claimed: &[S]) -> bool {
        claimed.iter().any(|role| self.roles.contains(role.as_ref()))
    }

    /// Roles as an owned list, in stable order.
    #[must_use]
    pub fn role_list(&self) -> Vec<String> {
        self.roles.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trader() -> User {
        User::new(Uuid::new_v4(), "Gleb", ["USER_ROLE_TRADER"])
    }

    #[test]
    fn intersecting_roles_match() {
        let user = trader();
        assert!(user.has_any_role(&["USER_ROLE_ADMIN", "USER_ROLE_TRADER"]));
    }

    #[test]
    fn disjoint_roles_do_not_match() {
        let user = trader();
        assert!(!user.has_any_role(&["USER_ROLE_ADMIN"]));
        assert!(!user.has_any_role::<&str>(&[]));
    }

    #[test]
    fn role_list_is_sorted() {
        let user = User::new(Uuid::new_v4(), "Oleg", ["b", "a", "a"]);
        assert_eq!(user.role_list(), vec!["a".to_string(), "b".to_string()]);
    }
}
