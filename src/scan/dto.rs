use serde::Serialize;

use super::meter::ScanUsage;
use crate::vision::DetectedFood;

/// Where the client sends a user who ran out of free scans.
pub const UPGRADE_PATH: &str = "/early-access";

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    #[serde(flatten)]
    pub usage: ScanUsage,
    pub cap: u32,
    pub remaining: u32,
    pub can_scan: bool,
}

impl UsageResponse {
    pub fn new(usage: ScanUsage, cap: u32) -> Self {
        Self {
            remaining: usage.remaining(cap),
            can_scan: usage.can_scan(cap),
            usage,
            cap,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    Scanned {
        results: Vec<DetectedFood>,
        usage: UsageResponse,
    },
    LimitReached {
        usage: UsageResponse,
        upgrade_path: &'static str,
    },
}
