//! Environment-driven configuration.
//!
//! The two secrets (admin password, master key) are required; everything
//! else has a sensible default.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret that unlocks the admin panel.
    pub admin_password: String,
    /// Secret that always grants viewer access, bypassing the token store.
    pub master_key: String,
    /// Location of the token sheet file.
    pub sheet_path: PathBuf,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            admin_password: env::var("ADMIN_PASSWORD")?,
            master_key: env::var("MASTER_KEY")?,
            sheet_path: env::var("TOKEN_SHEET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join("panoview").join("tokens.csv")),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        })
    }
}
