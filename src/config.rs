use std::net::SocketAddr;

use crate::error::AppError;

pub const SHEET_NAME: &str = "Sheet1";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const COMMUNITY_URL: &str = "https://discord.gg/VpavVdSqk";

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

pub const ENV_SHEET_ID: &str = "GOOGLE_SHEETS_SHEET_ID";
pub const ENV_CLIENT_EMAIL: &str = "GOOGLE_SHEETS_CLIENT_EMAIL";
pub const ENV_PRIVATE_KEY: &str = "GOOGLE_SHEETS_PRIVATE_KEY";

/// Service-account credentials and target spreadsheet.
#[derive(Clone)]
pub struct SheetsConfig {
    pub sheet_id: String,
    pub client_email: String,
    pub private_key: String,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("sheet_id", &self.sheet_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl SheetsConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve every required value through `lookup`, failing on the first one that is
    /// absent or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} is not set")))
        };

        Ok(Self {
            sheet_id: required(ENV_SHEET_ID)?,
            client_email: required(ENV_CLIENT_EMAIL)?,
            private_key: normalize_private_key(&required(ENV_PRIVATE_KEY)?),
        })
    }
}

/// PEM keys pasted into env files usually carry literal `\n` sequences.
pub fn normalize_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` when running against the in-memory store.
    pub sheets: Option<SheetsConfig>,
    pub sheet_name: String,
    pub bind: SocketAddr,
}

impl AppConfig {
    pub fn new(sheets: Option<SheetsConfig>, bind: SocketAddr) -> Self {
        Self {
            sheets,
            sheet_name: SHEET_NAME.to_string(),
            bind,
        }
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }
}

pub fn parse_bind(addr: &str) -> Result<SocketAddr, AppError> {
    addr.parse()
        .map_err(|e| AppError::Config(format!("invalid bind address '{addr}': {e}")))
}
