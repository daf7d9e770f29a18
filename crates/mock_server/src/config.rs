use std::{collections::HashMap, fs};

pub const DEFAULT_CONFIG_FILE: &str = "mock_server.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: String,
    pub seed_count: usize,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".into(),
            seed_count: 100,
            fail_reads: false,
            fail_writes: false,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("bind_addr").and_then(|v| v.as_str()) {
        settings.bind = v.to_string();
    }
    if let Some(v) = file_cfg.get("seed_count").and_then(|v| v.as_integer()) {
        if let Ok(count) = usize::try_from(v) {
            settings.seed_count = count;
        }
    }
    if let Some(v) = file_cfg.get("fail_reads").and_then(|v| v.as_bool()) {
        settings.fail_reads = v;
    }
    if let Some(v) = file_cfg.get("fail_writes").and_then(|v| v.as_bool()) {
        settings.fail_writes = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("MOCK_BIND") {
        settings.bind = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.bind = v;
    }

    if let Some(v) = lookup("APP__SEED_COUNT") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.seed_count = parsed;
        }
    }

    if let Some(v) = lookup("APP__FAIL_READS") {
        if let Some(flag) = parse_flag(&v) {
            settings.fail_reads = flag;
        }
    }
    if let Some(v) = lookup("APP__FAIL_WRITES") {
        if let Some(flag) = parse_flag(&v) {
            settings.fail_writes = flag;
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
