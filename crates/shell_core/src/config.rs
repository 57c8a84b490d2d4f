use std::{collections::HashMap, env, fs};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub user_info_url: String,
    pub table_data_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_info_url: "http://127.0.0.1:8000/api/user_info".into(),
            table_data_url: "http://127.0.0.1:8000/api/table".into(),
        }
    }
}

/// Loads settings from defaults, an optional flat-key `shell.toml`, then
/// environment overrides. Never fails; unreadable sources fall through.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("shell.toml") {
        apply_file(&mut settings, &raw);
    }

    if let Ok(v) = env::var("USER_INFO_URL") {
        settings.user_info_url = v;
    }
    if let Ok(v) = env::var("APP__USER_INFO_URL") {
        settings.user_info_url = v;
    }

    if let Ok(v) = env::var("TABLE_DATA_URL") {
        settings.table_data_url = v;
    }
    if let Ok(v) = env::var("APP__TABLE_DATA_URL") {
        settings.table_data_url = v;
    }

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("user_info_url") {
            settings.user_info_url = v.clone();
        }
        if let Some(v) = file_cfg.get("table_data_url") {
            settings.table_data_url = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_api() {
        let settings = Settings::default();
        assert_eq!(settings.user_info_url, "http://127.0.0.1:8000/api/user_info");
        assert_eq!(settings.table_data_url, "http://127.0.0.1:8000/api/table");
    }

    #[test]
    fn file_overrides_known_keys() {
        let mut settings = Settings::default();
        apply_file(
            &mut settings,
            "user_info_url = \"https://example.test/user\"\n",
        );
        assert_eq!(settings.user_info_url, "https://example.test/user");
        assert_eq!(settings.table_data_url, Settings::default().table_data_url);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let mut settings = Settings::default();
        apply_file(&mut settings, "not valid toml ][");
        assert_eq!(settings.user_info_url, Settings::default().user_info_url);
    }
}
