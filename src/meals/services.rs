use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::meals::dto::{CreateMealRequest, NewFoodItem};
use crate::meals::repo_types::{FoodItem, Meal};
use crate::nutrition::services::{resolve, round1};

pub const DEFAULT_MEAL_NAME: &str = "Meal";

/// Turns form rows into saved items. Rows without a name or a positive
/// quantity are dropped. A row with no macros at all is estimated from the
/// nutrition table; a partially filled row keeps what it has and zeroes the
/// rest.
pub fn build_items(rows: Vec<NewFoodItem>) -> Vec<FoodItem> {
    rows.into_iter()
        .filter_map(|row| {
            let name = row.name.trim().to_string();
            let grams = row.grams.filter(|g| g.is_finite() && *g > 0.0)?;
            if name.is_empty() {
                return None;
            }

            let given = [row.calories, row.protein, row.carbs, row.fat];
            let (calories, protein, carbs, fat) = if given.iter().all(Option::is_none) {
                let m = resolve(&name, grams);
                (m.calories, m.protein, m.carbs, m.fat)
            } else {
                (
                    non_negative(row.calories).round() as u32,
                    round1(non_negative(row.protein)),
                    round1(non_negative(row.carbs)),
                    round1(non_negative(row.fat)),
                )
            };

            Some(FoodItem {
                id: Uuid::new_v4(),
                name,
                grams,
                calories,
                protein,
                carbs,
                fat,
            })
        })
        .collect()
}

pub fn new_meal(user_id: Uuid, today: Date, now: OffsetDateTime, req: CreateMealRequest, items: Vec<FoodItem>) -> Meal {
    let name = match req.name.trim() {
        "" => DEFAULT_MEAL_NAME.to_string(),
        n => n.to_string(),
    };
    Meal {
        id: Uuid::new_v4(),
        user_id,
        date: req.date.unwrap_or(today),
        name,
        items,
        created_at: now,
    }
}

fn non_negative(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite()).unwrap_or(0.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, grams: Option<f64>) -> NewFoodItem {
        NewFoodItem {
            name: name.into(),
            grams,
            calories: None,
            protein: None,
            carbs: None,
            fat: None,
        }
    }

    #[test]
    fn drops_incomplete_rows() {
        let items = build_items(vec![
            row("", Some(100.0)),
            row("rice", None),
            row("rice", Some(0.0)),
            row("rice", Some(200.0)),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].grams, 200.0);
    }

    #[test]
    fn empty_macros_are_estimated() {
        let items = build_items(vec![row("Rice", Some(200.0))]);
        assert_eq!(items[0].calories, 260);
        assert_eq!(items[0].carbs, 56.0);
    }

    #[test]
    fn partial_macros_are_kept_and_zero_filled() {
        let mut r = row("homemade stew", Some(300.0));
        r.calories = Some(412.6);
        r.protein = Some(31.04);
        let items = build_items(vec![r]);
        assert_eq!(items[0].calories, 413);
        assert_eq!(items[0].protein, 31.0);
        assert_eq!(items[0].carbs, 0.0);
        assert_eq!(items[0].fat, 0.0);
    }

    #[test]
    fn meal_totals_sum_items() {
        let items = build_items(vec![row("chicken", Some(100.0)), row("rice", Some(100.0))]);
        let meal = new_meal(
            Uuid::new_v4(),
            time::macros::date!(2026 - 10 - 19),
            OffsetDateTime::now_utc(),
            CreateMealRequest { date: None, name: " ".into(), items: vec![] },
            items,
        );
        assert_eq!(meal.name, DEFAULT_MEAL_NAME);
        let t = meal.totals();
        assert_eq!(t.calories, 295);
        assert!((t.protein - 33.7).abs() < 1e-9);
    }
}
