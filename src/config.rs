use std::env;
use std::path::PathBuf;

/// Process configuration, collected once at startup from environment
/// variables (after `dotenvy` has loaded any `.env` file).
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port to listen on (`PORT`, default 3000).
    pub port: u16,

    /// Path of the JSON file backing the row store
    /// (`DATA_FILE`, default `database/sheets.json`).
    pub data_file: PathBuf,

    /// Allow-list of sheet names (`ALLOWED_SHEETS`, comma-separated).
    /// `None` means every sheet is allowed.
    pub allowed_sheets: Option<Vec<String>>,

    /// Sheet holding the credential table
    /// (`CREDENTIALS_SHEET`, default `usuarios`).
    pub credentials_sheet: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3000,
            data_file: PathBuf::from("database/sheets.json"),
            allowed_sheets: None,
            credentials_sheet: "usuarios".to_string(),
        }
    }
}

impl Config {
    /// Read the configuration from the environment, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let data_file = env::var("DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_file);

        let allowed_sheets = env::var("ALLOWED_SHEETS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|names| !names.is_empty());

        let credentials_sheet =
            env::var("CREDENTIALS_SHEET").unwrap_or(defaults.credentials_sheet);

        Config {
            port,
            data_file,
            allowed_sheets,
            credentials_sheet,
        }
    }

    /// Whether record operations on this sheet are permitted.
    pub fn sheet_allowed(&self, name: &str) -> bool {
        match &self.allowed_sheets {
            Some(allowed) => allowed.iter().any(|s| s == name),
            None => true,
        }
    }
}
