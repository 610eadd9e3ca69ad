use std::env;

use crate::models::CLIConfig;

const DEFAULT_URL: &str = "http://localhost:5000";

pub fn parse_config() -> CLIConfig {
    let mut cfg = CLIConfig {
        base_url: env::var("CHAT_RELAY_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_URL.to_string()),
        debug: env_bool("CHAT_RELAY_DEBUG", false),
    };

    let args: Vec<String> = env::args().collect();
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.base_url = value.clone();
                    idx += 1;
                }
            }
            "--debug" => {
                match args.get(idx + 1).and_then(|v| v.parse::<bool>().ok()) {
                    Some(flag) => {
                        cfg.debug = flag;
                        idx += 1;
                    }
                    None => cfg.debug = true,
                }
            }
            _ => {}
        }
        idx += 1;
    }

    cfg
}

fn env_bool(key: &str, fallback: bool) -> bool {
    match env::var(key) {
        Ok(value) => value.parse::<bool>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}
