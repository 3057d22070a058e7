//! Process-local repository: users live in a vector kept in insertion order.

use parking_lot::RwLock;
use uuid::Uuid;

use crate::contract::User;
use crate::domain::repo::{UniqueField, UsersRepository};

#[derive(Default)]
pub struct InMemoryUsersRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn field_value(u: &User, field: UniqueField) -> &str {
    match field {
        UniqueField::Username => &u.username,
        UniqueField::Email => &u.email,
    }
}

#[async_trait::async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn list(&self, skip: u64, limit: u64) -> anyhow::Result<Vec<User>> {
        let users = self.users.read();
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(users.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by(&self, field: UniqueField, value: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|u| field_value(u, field) == value)
            .cloned())
    }

    async fn insert(&self, u: User) -> anyhow::Result<User> {
        let mut users = self.users.write();
        if users.iter().any(|existing| existing.id == u.id) {
            anyhow::bail!("insert failed: duplicate id {}", u.id);
        }
        users.push(u.clone());
        Ok(u)
    }

    async fn update(&self, u: User) -> anyhow::Result<User> {
        let mut users = self.users.write();
        let slot = users
            .iter_mut()
            .find(|existing| existing.id == u.id)
            .ok_or_else(|| anyhow::anyhow!("update failed: no user with id {}", u.id))?;
        *slot = u.clone();
        Ok(u)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut users = self.users.write();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(username: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            full_name: None,
            department: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn list_window_keeps_insertion_order() {
        let repo = InMemoryUsersRepository::new();
        for name in ["a", "b", "c", "d"] {
            repo.insert(user(name)).await.unwrap();
        }

        let names = |v: Vec<User>| v.into_iter().map(|u| u.username).collect::<Vec<_>>();
        assert_eq!(names(repo.list(0, 100).await.unwrap()), ["a", "b", "c", "d"]);
        assert_eq!(names(repo.list(1, 2).await.unwrap()), ["b", "c"]);
        assert!(repo.list(10, 2).await.unwrap().is_empty());
        assert!(repo.list(0, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_by_unique_fields() {
        let repo = InMemoryUsersRepository::new();
        let alice = repo.insert(user("alice")).await.unwrap();

        let by_name = repo.find_by(UniqueField::Username, "alice").await.unwrap();
        let by_mail = repo
            .find_by(UniqueField::Email, "alice@example.com")
            .await
            .unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(alice.id));
        assert_eq!(by_mail.map(|u| u.id), Some(alice.id));
        assert!(repo
            .find_by(UniqueField::Username, "bob")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_missing_user_is_an_error() {
        let repo = InMemoryUsersRepository::new();
        assert!(repo.update(user("ghost")).await.is_err());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let repo = InMemoryUsersRepository::new();
        let u = repo.insert(user("x")).await.unwrap();
        assert!(repo.delete(u.id).await.unwrap());
        assert!(!repo.delete(u.id).await.unwrap());
    }
}
