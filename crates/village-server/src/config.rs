use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default request body limit for the multipart user routes (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory that holds `profiles/` and `backgrounds/`
    pub upload_dir: PathBuf,
    /// Allowed cross-origin callers. Empty means same-origin only.
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            ),
            cors_origins: parse_origins(&env::var("CORS_ORIGINS").unwrap_or_default()),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:5173, https://village.example ,"),
            vec!["http://localhost:5173", "https://village.example"]
        );
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins(" , ").is_empty());
    }

    #[test]
    fn test_bind_addr_uses_port() {
        let config = ServerConfig {
            port: 4100,
            upload_dir: PathBuf::from("./uploads"),
            cors_origins: vec![],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        };
        assert_eq!(config.bind_addr().port(), 4100);
    }
}
