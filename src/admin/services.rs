use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{nutrition::services::round1, scan::ScanUsage, users::User};

/// Funnel numbers for the free-scan limit and the waitlist behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStats {
    pub total_users: u32,
    pub total_scans: u64,
    pub avg_scans_per_user: f64,
    pub users_who_hit_limit: u32,
    pub pct_users_hit_limit: u32,
    pub users_who_clicked_early_access: u32,
    pub pct_clicked_early_access: u32,
    pub total_early_access_signups: u32,
}

/// Folds a snapshot of users and their stored usage into [`AdminStats`].
///
/// Admin accounts are left out. A user counts as having hit the limit when
/// their lifetime total has reached the cap or the current week recorded a
/// hit. The early-access share is taken over limit hitters only.
pub fn compute_stats(
    users: &[User],
    usage: &HashMap<Uuid, ScanUsage>,
    signups: usize,
    cap: u32,
) -> AdminStats {
    let mut total_users = 0u32;
    let mut total_scans = 0u64;
    let mut hit_limit = 0u32;
    let mut clicked = 0u32;

    for user in users.iter().filter(|u| !u.is_admin()) {
        total_users += 1;
        let Some(u) = usage.get(&user.id) else {
            continue;
        };
        total_scans += u64::from(u.total_scans);
        if u.total_scans >= cap || u.hit_limit_at.is_some() {
            hit_limit += 1;
            if u.early_access_clicked {
                clicked += 1;
            }
        }
    }

    AdminStats {
        total_users,
        total_scans,
        avg_scans_per_user: if total_users == 0 {
            0.0
        } else {
            round1(total_scans as f64 / f64::from(total_users))
        },
        users_who_hit_limit: hit_limit,
        pct_users_hit_limit: percent(hit_limit, total_users),
        users_who_clicked_early_access: clicked,
        pct_clicked_early_access: percent(clicked, hit_limit),
        total_early_access_signups: signups as u32,
    }
}

fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (f64::from(part) * 100.0 / f64::from(whole)).round() as u32
}
