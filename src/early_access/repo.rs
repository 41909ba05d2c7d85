use crate::early_access::repo_types::EarlyAccessSignup;
use crate::storage::{keys, load, save, KvStore, StoreError};

/// Signups in arrival order.
pub async fn list_all(store: &dyn KvStore) -> Result<Vec<EarlyAccessSignup>, StoreError> {
    Ok(load(store, keys::EARLY_ACCESS).await?.unwrap_or_default())
}

/// Callers hold the `early_access` key lock.
pub async fn append(store: &dyn KvStore, signup: &EarlyAccessSignup) -> Result<(), StoreError> {
    let mut all = list_all(store).await?;
    all.push(signup.clone());
    save(store, keys::EARLY_ACCESS, &all).await
}
