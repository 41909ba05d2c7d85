use time::Date;
use uuid::Uuid;

use crate::activities::repo_types::Activity;
use crate::storage::{keys, load, save, KvStore, StoreError};

pub async fn list_by_day(store: &dyn KvStore, user_id: Uuid, date: Date) -> Result<Vec<Activity>, StoreError> {
    Ok(load(store, &keys::activities(user_id, date)).await?.unwrap_or_default())
}

/// Appends to the day list. Callers hold the day's key lock.
pub async fn insert(store: &dyn KvStore, activity: &Activity) -> Result<(), StoreError> {
    let key = keys::activities(activity.user_id, activity.date);
    let mut acts: Vec<Activity> = load(store, &key).await?.unwrap_or_default();
    acts.push(activity.clone());
    save(store, &key, &acts).await
}

pub async fn delete(store: &dyn KvStore, user_id: Uuid, date: Date, activity_id: Uuid) -> Result<bool, StoreError> {
    let key = keys::activities(user_id, date);
    let mut acts: Vec<Activity> = load(store, &key).await?.unwrap_or_default();
    let before = acts.len();
    acts.retain(|a| a.id != activity_id);
    if acts.len() == before {
        return Ok(false);
    }
    save(store, &key, &acts).await?;
    Ok(true)
}
