use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::hash::hash_str;

/// Macros for a given quantity of food. Calories are whole kcal, the rest
/// grams at one decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            calories: self.calories.saturating_add(rhs.calories),
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

/// Largest quantity accepted for one food, in grams.
pub const MAX_GRAMS: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Per100g {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

const fn per100(calories: f64, protein: f64, carbs: f64, fat: f64) -> Per100g {
    Per100g {
        calories,
        protein,
        carbs,
        fat,
    }
}

/// Canonical foods, searched top to bottom. Order decides ties: a query that
/// contains several keys resolves to the first one listed ("sweet potato"
/// hits `potato` before `sweet_potato`).
pub const FOOD_TABLE: &[(&str, Per100g)] = &[
    ("chicken", per100(165.0, 31.0, 0.0, 3.6)),
    ("beef", per100(250.0, 26.0, 0.0, 15.0)),
    ("rice", per100(130.0, 2.7, 28.0, 0.3)),
    ("broccoli", per100(34.0, 2.8, 7.0, 0.4)),
    ("egg", per100(155.0, 13.0, 1.1, 11.0)),
    ("salmon", per100(208.0, 20.0, 0.0, 13.0)),
    ("tuna", per100(132.0, 28.0, 0.0, 1.4)),
    ("turkey", per100(135.0, 30.0, 0.0, 1.0)),
    ("pork", per100(242.0, 27.0, 0.0, 14.0)),
    ("oats", per100(389.0, 17.0, 66.0, 7.0)),
    ("banana", per100(89.0, 1.1, 23.0, 0.3)),
    ("apple", per100(52.0, 0.3, 14.0, 0.2)),
    ("bread", per100(265.0, 9.0, 49.0, 3.2)),
    ("milk", per100(42.0, 3.4, 5.0, 1.0)),
    ("cheese", per100(402.0, 25.0, 1.3, 33.0)),
    ("pasta", per100(158.0, 5.8, 31.0, 0.9)),
    ("potato", per100(77.0, 2.0, 17.0, 0.1)),
    ("yogurt", per100(59.0, 10.0, 3.6, 0.4)),
    ("almonds", per100(579.0, 21.0, 22.0, 50.0)),
    ("spinach", per100(23.0, 2.9, 3.6, 0.4)),
    ("sweet_potato", per100(86.0, 1.6, 20.0, 0.1)),
    ("avocado", per100(160.0, 2.0, 9.0, 15.0)),
    ("whey", per100(400.0, 80.0, 7.0, 5.0)),
    ("protein_shake", per100(120.0, 25.0, 5.0, 2.0)),
    ("steak", per100(271.0, 26.0, 0.0, 18.0)),
    ("shrimp", per100(99.0, 24.0, 0.2, 0.3)),
];

/// Lowercases, trims and turns every whitespace or hyphen into `_`.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect()
}

/// First table entry where either side contains the other.
pub fn lookup(normalized: &str) -> Option<(&'static str, Per100g)> {
    FOOD_TABLE
        .iter()
        .find(|(food, _)| normalized.contains(food) || food.contains(normalized))
        .copied()
}

/// Hash-derived per-100g values for foods outside the table.
pub fn fallback_per100(normalized: &str) -> Per100g {
    let h = hash_str(normalized);
    per100(
        f64::from(60 + h % 280),
        f64::from(3 + h % 32),
        f64::from(5 + (h >> 3) % 45),
        f64::from(1 + (h >> 6) % 18),
    )
}

pub fn scale(base: Per100g, grams: f64) -> Macros {
    // NaN.max(0.0) is 0.0, so junk quantities collapse to zero output.
    let factor = grams.max(0.0) / 100.0;
    Macros {
        calories: (base.calories * factor).round() as u32,
        protein: round1(base.protein * factor),
        carbs: round1(base.carbs * factor),
        fat: round1(base.fat * factor),
    }
}

/// Estimated macros for `grams` of a free-text food. Pure and deterministic.
pub fn resolve(name: &str, grams: f64) -> Macros {
    let key = normalize_name(name);
    let base = match lookup(&key) {
        Some((_, base)) => base,
        None => fallback_per100(&key),
    };
    scale(base, grams)
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_expected_shape() {
        assert_eq!(FOOD_TABLE.len(), 26);
        assert_eq!(FOOD_TABLE[0].0, "chicken");
        assert_eq!(FOOD_TABLE[25].0, "shrimp");
    }

    #[test]
    fn normalizes_case_space_and_hyphen() {
        assert_eq!(normalize_name("  Sweet Potato "), "sweet_potato");
        assert_eq!(normalize_name("Protein-Shake"), "protein_shake");
        assert_eq!(normalize_name("a  b"), "a__b");
    }

    #[test]
    fn table_match_scales_linearly() {
        let m = resolve("Chicken Breast", 150.0);
        assert_eq!(m.calories, 248);
        assert_eq!(m.protein, 46.5);
        assert_eq!(m.carbs, 0.0);
        assert_eq!(m.fat, 5.4);
    }

    #[test]
    fn bidirectional_containment() {
        // query inside key
        assert_eq!(lookup("shri").map(|(k, _)| k), Some("shrimp"));
        // key inside query
        assert_eq!(lookup("grilled_salmon_fillet").map(|(k, _)| k), Some("salmon"));
    }

    #[test]
    fn first_match_wins_in_table_order() {
        assert_eq!(lookup("sweet_potato").map(|(k, _)| k), Some("potato"));
        assert_eq!(lookup("beef_and_rice").map(|(k, _)| k), Some("beef"));
        assert_eq!(resolve("Sweet Potato", 100.0).calories, 77);
    }

    #[test]
    fn doubling_grams_doubles_calories_for_table_foods() {
        for (food, _) in FOOD_TABLE {
            let one = resolve(food, 100.0);
            let two = resolve(food, 200.0);
            assert_eq!(two.calories, 2 * one.calories, "{food}");
            assert!((two.protein - 2.0 * one.protein).abs() <= 0.1 + 1e-9, "{food}");
            assert!((two.carbs - 2.0 * one.carbs).abs() <= 0.1 + 1e-9, "{food}");
            assert!((two.fat - 2.0 * one.fat).abs() <= 0.1 + 1e-9, "{food}");
        }
    }

    #[test]
    fn zero_grams_is_all_zero() {
        for name in ["rice", "dragonfruit", ""] {
            assert_eq!(resolve(name, 0.0), Macros::default());
        }
    }

    #[test]
    fn negative_or_nan_grams_never_go_negative() {
        assert_eq!(resolve("rice", -50.0), Macros::default());
        assert_eq!(resolve("rice", f64::NAN), Macros::default());
    }

    #[test]
    fn fallback_is_deterministic() {
        assert!(lookup("dragonfruit").is_none());
        let m = resolve("Dragonfruit", 100.0);
        assert_eq!(m, resolve("dragonfruit", 100.0));
        assert_eq!(m.calories, 212);
        assert_eq!(m.protein, 11.0);
        assert_eq!(m.carbs, 14.0);
        assert_eq!(m.fat, 2.0);

        let big = resolve("kale smoothie", 250.0);
        assert_eq!(big.calories, 808);
        assert_eq!(big.protein, 65.0);
        assert_eq!(big.carbs, 42.5);
        assert_eq!(big.fat, 45.0);
    }

    #[test]
    fn scaling_is_linear_up_to_the_gram_cap() {
        let half = resolve("almonds", MAX_GRAMS / 2.0);
        let full = resolve("almonds", MAX_GRAMS);
        assert_eq!(full.calories, 579_000);
        assert_eq!(full.calories, 2 * half.calories);
    }

    #[test]
    fn huge_quantities_saturate_instead_of_overflowing() {
        let huge = resolve("almonds", 1e9);
        assert_eq!(huge.calories, u32::MAX);
        let sum = huge + huge;
        assert_eq!(sum.calories, u32::MAX);
        assert!(sum.fat > huge.fat);
    }

    #[test]
    fn fallback_stays_in_base_ranges() {
        for name in ["dragonfruit", "kale_smoothie", "xyz", "poutine", "kimchi_jjigae"] {
            let b = fallback_per100(name);
            assert!((60.0..340.0).contains(&b.calories));
            assert!((3.0..35.0).contains(&b.protein));
            assert!((5.0..50.0).contains(&b.carbs));
            assert!((1.0..19.0).contains(&b.fat));
        }
    }
}
