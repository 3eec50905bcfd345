//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.
//! Database, JWT, and mail settings have their own config types next to the
//! code that consumes them; this one carries the server-level knobs.

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    /// Example: 0.0.0.0:8080
    pub listen_addr: String,

    /// Origins allowed by CORS, comma-separated.
    /// The first entry is also used to build verification links.
    pub allowed_origins: Vec<String>,
}

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ORIGIN: &str = "http://localhost:3000";

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Self {
        let listen_addr =
            std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_ORIGIN.to_string()]);

        Self {
            listen_addr,
            allowed_origins,
        }
    }

    /// Origin used for links embedded in outbound email
    pub fn app_origin(&self) -> &str {
        &self.allowed_origins[0]
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.trim_end_matches('/').to_string())
        .collect()
}
