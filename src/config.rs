use std::env;

// ============================================================================
// Configuration
// ============================================================================

const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Database settings, read from the environment:
/// - `DATABASE_URL` (default `sqlite::memory:`)
/// - `DATABASE_MAX_CONNECTIONS` (default 5)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        Self { url, max_connections }
    }

    pub fn with_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// In-memory SQLite gets one connection per pool, otherwise each pooled
    /// connection would see its own empty database.
    pub fn effective_max_connections(&self) -> u32 {
        if self.url.starts_with("sqlite::memory:") || self.url.starts_with("sqlite://:memory:") {
            1
        } else {
            self.max_connections
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
