use serde::Serialize;
use time::Date;

use crate::activities::Activity;
use crate::clock::iso_date;
use crate::meals::Meal;
use crate::nutrition::{services::round1, Macros};
use crate::users::User;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub total_calories_in: u32,
    pub total_calories_out: u32,
    pub net_calories: i64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub calorie_target: u32,
    pub protein_target: u32,
    pub carbs_target: u32,
    pub fat_target: u32,
    /// Net calories as a share of the calorie target, 0..=100.
    pub compliance: u32,
}

pub fn summarize(date: Date, user: &User, meals: &[Meal], activities: &[Activity]) -> DaySummary {
    let eaten = meals
        .iter()
        .map(Meal::totals)
        .fold(Macros::default(), |acc, m| acc + m);
    let burned = activities
        .iter()
        .fold(0u32, |acc, a| acc.saturating_add(a.calories_burned));
    let net = i64::from(eaten.calories) - i64::from(burned);

    let target = user.daily_calorie_target;
    let compliance = if target > 0 {
        (net as f64 / f64::from(target) * 100.0).clamp(0.0, 100.0).round() as u32
    } else {
        0
    };

    DaySummary {
        date,
        total_calories_in: eaten.calories,
        total_calories_out: burned,
        net_calories: net,
        total_protein: round1(eaten.protein),
        total_carbs: round1(eaten.carbs),
        total_fat: round1(eaten.fat),
        calorie_target: target,
        protein_target: user.protein_target,
        carbs_target: user.carbs_target,
        fat_target: user.fat_target,
        compliance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::services::Intensity;
    use crate::meals::FoodItem;
    use crate::users::services::new_user;
    use time::{macros::date, OffsetDateTime};
    use uuid::Uuid;

    fn meal(calories: u32, protein: f64) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: date!(2026 - 10 - 19),
            name: "Lunch".into(),
            items: vec![FoodItem {
                id: Uuid::new_v4(),
                name: "x".into(),
                grams: 100.0,
                calories,
                protein,
                carbs: 0.1,
                fat: 0.2,
            }],
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn activity(kcal: u32) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: date!(2026 - 10 - 19),
            kind: "Boxing".into(),
            duration: 60.0,
            intensity: Intensity::Medium,
            calories_burned: kcal,
            notes: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn user() -> User {
        new_user("Kid", "kid@x.io", "password1", "admin@x.io", OffsetDateTime::now_utc())
    }

    #[test]
    fn nets_intake_against_burn() {
        let s = summarize(
            date!(2026 - 10 - 19),
            &user(),
            &[meal(1200, 60.1), meal(800, 40.1)],
            &[activity(750)],
        );
        assert_eq!(s.total_calories_in, 2000);
        assert_eq!(s.total_calories_out, 750);
        assert_eq!(s.net_calories, 1250);
        assert_eq!(s.total_protein, 100.2);
        assert_eq!(s.total_carbs, 0.2);
        assert_eq!(s.compliance, 50);
    }

    #[test]
    fn compliance_is_clamped() {
        let over = summarize(date!(2026 - 10 - 19), &user(), &[meal(5000, 0.0)], &[]);
        assert_eq!(over.compliance, 100);
        let under = summarize(date!(2026 - 10 - 19), &user(), &[], &[activity(400)]);
        assert_eq!(under.net_calories, -400);
        assert_eq!(under.compliance, 0);
    }

    #[test]
    fn oversized_entries_saturate() {
        let huge = crate::meals::services::build_items(vec![
            crate::meals::dto::NewFoodItem {
                name: "almonds".into(),
                grams: Some(1e9),
                calories: None,
                protein: None,
                carbs: None,
                fat: None,
            },
        ]);
        let mut big = meal(0, 0.0);
        big.items = vec![huge[0].clone(), huge[0].clone()];

        let s = summarize(
            date!(2026 - 10 - 19),
            &user(),
            &[big, meal(u32::MAX, 0.0)],
            &[activity(u32::MAX), activity(u32::MAX)],
        );
        assert_eq!(s.total_calories_in, u32::MAX);
        assert_eq!(s.total_calories_out, u32::MAX);
        assert_eq!(s.net_calories, 0);
    }

    #[test]
    fn empty_day() {
        let s = summarize(date!(2026 - 10 - 19), &user(), &[], &[]);
        assert_eq!(s.total_calories_in, 0);
        assert_eq!(s.compliance, 0);
        assert_eq!(s.calorie_target, 2500);
    }
}
