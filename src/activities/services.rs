use serde::{Deserialize, Serialize};

/// Weight used when the profile has none.
pub const DEFAULT_WEIGHT_KG: f64 = 75.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mets {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Mets {
    fn at(&self, intensity: Intensity) -> f64 {
        match intensity {
            Intensity::Low => self.low,
            Intensity::Medium => self.medium,
            Intensity::High => self.high,
        }
    }
}

const fn mets(low: f64, medium: f64, high: f64) -> Mets {
    Mets { low, medium, high }
}

const DEFAULT_METS: Mets = mets(4.0, 6.0, 8.0);

/// Keys are normalized activity names (see [`normalize_activity`]).
const MET_TABLE: &[(&str, Mets)] = &[
    ("boxing", mets(6.0, 9.0, 12.5)),
    ("muay_thai", mets(7.0, 10.0, 13.5)),
    ("mma", mets(7.0, 10.5, 14.0)),
    ("wrestling", mets(6.0, 9.0, 12.0)),
    ("kickboxing", mets(6.5, 9.5, 12.5)),
    ("jiu_jitsu", mets(5.5, 8.0, 11.0)),
    ("running", mets(7.0, 10.0, 13.0)),
    ("sprints", mets(8.0, 12.0, 15.0)),
    ("cycling", mets(5.0, 8.0, 11.0)),
    ("swimming", mets(5.0, 8.0, 10.0)),
    ("gym", mets(4.0, 6.0, 8.0)),
    ("weightlifting", mets(3.5, 5.5, 7.5)),
    ("crossfit", mets(6.0, 9.0, 12.0)),
    ("hiit", mets(7.0, 10.0, 13.0)),
    ("yoga", mets(2.5, 3.5, 4.5)),
    ("walking", mets(2.5, 3.5, 4.5)),
    ("jump_rope", mets(8.0, 11.0, 13.0)),
];

pub const ACTIVITY_TYPES: [&str; 17] = [
    "Boxing",
    "Muay Thai",
    "MMA",
    "Wrestling",
    "Kickboxing",
    "Jiu Jitsu",
    "Running",
    "Sprints",
    "Cycling",
    "Swimming",
    "Gym",
    "Weightlifting",
    "CrossFit",
    "HIIT",
    "Yoga",
    "Walking",
    "Jump Rope",
];

pub fn normalize_activity(activity: &str) -> String {
    activity
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

pub fn lookup_mets(activity: &str) -> Option<Mets> {
    let key = normalize_activity(activity);
    MET_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, m)| *m)
}

pub fn mets_for(activity: &str) -> Mets {
    lookup_mets(activity).unwrap_or(DEFAULT_METS)
}

/// Longest single activity accepted, one full day.
pub const MAX_DURATION_MINUTES: f64 = 1440.0;

/// kcal = MET x kg x hours, rounded.
pub fn calories_burned(activity: &str, duration_minutes: f64, intensity: Intensity, weight_kg: f64) -> u32 {
    let met = mets_for(activity).at(intensity);
    let hours = duration_minutes.max(0.0) / 60.0;
    (met * weight_kg.max(0.0) * hours).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_type_has_a_row() {
        for name in ACTIVITY_TYPES {
            assert!(lookup_mets(name).is_some(), "{name}");
        }
    }

    #[test]
    fn multi_word_names_normalize() {
        assert_eq!(normalize_activity("  Muay   Thai "), "muay_thai");
        assert_eq!(mets_for("Jump Rope").high, 13.0);
    }

    #[test]
    fn burn_formula() {
        // 9.0 MET * 75 kg * 1 h
        assert_eq!(calories_burned("Boxing", 60.0, Intensity::Medium, 75.0), 675);
        // 12.5 * 80 * 0.5 = 500
        assert_eq!(calories_burned("kickboxing", 30.0, Intensity::High, 80.0), 500);
    }

    #[test]
    fn unknown_activity_uses_default_row() {
        assert_eq!(calories_burned("Underwater Basket Weaving", 60.0, Intensity::Low, 75.0), 300);
    }

    #[test]
    fn zero_duration_burns_nothing() {
        assert_eq!(calories_burned("running", 0.0, Intensity::High, 90.0), 0);
    }
}
