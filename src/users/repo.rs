use uuid::Uuid;

use crate::storage::{keys, load, save, KvStore, StoreError};
use crate::users::repo_types::User;

impl User {
    pub async fn find_by_id(store: &dyn KvStore, id: Uuid) -> Result<Option<User>, StoreError> {
        load(store, &keys::user(id)).await
    }

    /// Case-insensitive lookup over the user index.
    pub async fn find_by_email(store: &dyn KvStore, email: &str) -> Result<Option<User>, StoreError> {
        let wanted = email.trim().to_lowercase();
        for id in Self::list_ids(store).await? {
            if let Some(user) = Self::find_by_id(store, id).await? {
                if user.email.to_lowercase() == wanted {
                    return Ok(Some(user));
                }
            }
        }
        Ok(None)
    }

    /// Ids in registration order.
    pub async fn list_ids(store: &dyn KvStore) -> Result<Vec<Uuid>, StoreError> {
        Ok(load::<Vec<Uuid>>(store, keys::USERS).await?.unwrap_or_default())
    }

    pub async fn list_all(store: &dyn KvStore) -> Result<Vec<User>, StoreError> {
        let mut users = Vec::new();
        for id in Self::list_ids(store).await? {
            if let Some(user) = Self::find_by_id(store, id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }

    /// Persists a new user and appends it to the index. Callers hold the
    /// `users` lock so the uniqueness check and the append stay together.
    pub async fn create(store: &dyn KvStore, user: &User) -> Result<(), StoreError> {
        save(store, &keys::user(user.id), user).await?;
        let mut ids = Self::list_ids(store).await?;
        ids.push(user.id);
        save(store, keys::USERS, &ids).await
    }

    pub async fn update(store: &dyn KvStore, user: &User) -> Result<(), StoreError> {
        save(store, &keys::user(user.id), user).await
    }
}
