use time::Date;
use uuid::Uuid;

use crate::meals::repo_types::Meal;
use crate::storage::{keys, load, save, KvStore, StoreError};

pub async fn list_by_day(store: &dyn KvStore, user_id: Uuid, date: Date) -> Result<Vec<Meal>, StoreError> {
    Ok(load(store, &keys::meals(user_id, date)).await?.unwrap_or_default())
}

/// Appends to the day list. Callers hold the day's key lock.
pub async fn insert(store: &dyn KvStore, meal: &Meal) -> Result<(), StoreError> {
    let key = keys::meals(meal.user_id, meal.date);
    let mut meals: Vec<Meal> = load(store, &key).await?.unwrap_or_default();
    meals.push(meal.clone());
    save(store, &key, &meals).await
}

/// Returns whether a meal was removed. Callers hold the day's key lock.
pub async fn delete(store: &dyn KvStore, user_id: Uuid, date: Date, meal_id: Uuid) -> Result<bool, StoreError> {
    let key = keys::meals(user_id, date);
    let mut meals: Vec<Meal> = load(store, &key).await?.unwrap_or_default();
    let before = meals.len();
    meals.retain(|m| m.id != meal_id);
    if meals.len() == before {
        return Ok(false);
    }
    if meals.is_empty() {
        store.delete(&key).await?;
    } else {
        save(store, &key, &meals).await?;
    }
    Ok(true)
}
