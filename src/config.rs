use serde::Deserialize;

pub const DEFAULT_WEEKLY_SCAN_CAP: u32 = 5;
pub const DEFAULT_SCAN_LATENCY_MS: u64 = 800;
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@goatrition.com";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Free scans per user per Monday-started week.
    pub weekly_cap: u32,
    /// Artificial processing delay of the mock vision endpoint.
    pub latency_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            weekly_cap: DEFAULT_WEEKLY_SCAN_CAP,
            latency_ms: DEFAULT_SCAN_LATENCY_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub scan: ScanConfig,
    pub admin_email: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "goatrition".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "goatrition-users".into()),
            ttl_minutes: parse_var("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 7),
        };
        let scan = ScanConfig {
            weekly_cap: parse_var("WEEKLY_SCAN_CAP").unwrap_or(DEFAULT_WEEKLY_SCAN_CAP),
            latency_ms: parse_var("SCAN_LATENCY_MS").unwrap_or(DEFAULT_SCAN_LATENCY_MS),
        };
        let admin_email = std::env::var("ADMIN_EMAIL")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.into());
        Ok(Self {
            database_url,
            jwt,
            scan,
            admin_email,
        })
    }

    /// Config used by tests and local tooling: no database, zero scan latency.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
            },
            scan: ScanConfig {
                weekly_cap: DEFAULT_WEEKLY_SCAN_CAP,
                latency_ms: 0,
            },
            admin_email: DEFAULT_ADMIN_EMAIL.into(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    match std::env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(%key, value = %raw, "invalid value, using default");
                None
            }
        },
        Err(_) => None,
    }
}
