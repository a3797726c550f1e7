use std::env;

const BIND_ENV: &str = "TIMETABLE_BIND";
const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Process-level settings; scheduling settings arrive with each request.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup(BIND_ENV)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.bind_addr),
        }
    }
}
