use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,       // cookie lifetime, renewed on every write
    pub store_ttl_days: i64,    // hard ceiling for a stored session row
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub allow_admin_signup: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "sid".into()),
            ttl_minutes: env_parse("SESSION_TTL_MINUTES").unwrap_or(120),
            store_ttl_days: env_parse("SESSION_STORE_TTL_DAYS").unwrap_or(14),
            secure_cookie: env_flag("SESSION_COOKIE_SECURE").unwrap_or(false),
        };
        Ok(Self {
            database_url,
            session,
            allow_admin_signup: env_flag("ALLOW_ADMIN_SIGNUP").unwrap_or(true),
        })
    }
}

fn env_parse(key: &str) -> Option<i64> {
    std::env::var(key).ok().and_then(|v| v.parse::<i64>().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl SessionConfig {
    pub fn ttl(&self) -> time::Duration {
        time::Duration::minutes(self.ttl_minutes)
    }

    pub fn store_ttl(&self) -> time::Duration {
        time::Duration::days(self.store_ttl_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_parsing_accepts_common_truthy_values() {
        std::env::set_var("USERDESK_TEST_FLAG", "Yes");
        assert_eq!(env_flag("USERDESK_TEST_FLAG"), Some(true));
        std::env::set_var("USERDESK_TEST_FLAG", "0");
        assert_eq!(env_flag("USERDESK_TEST_FLAG"), Some(false));
        std::env::remove_var("USERDESK_TEST_FLAG");
        assert_eq!(env_flag("USERDESK_TEST_FLAG"), None);
    }

    #[test]
    fn session_durations_follow_config() {
        let cfg = SessionConfig {
            cookie_name: "sid".into(),
            ttl_minutes: 120,
            store_ttl_days: 14,
            secure_cookie: false,
        };
        assert_eq!(cfg.ttl(), time::Duration::hours(2));
        assert_eq!(cfg.store_ttl(), time::Duration::weeks(2));
    }
}
