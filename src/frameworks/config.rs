use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

/// Hub defaults; overridable through the environment for staging setups.
const DEFAULT_HUB_BASE_URL: &str = "https://hub.example.com";
const DEFAULT_HOSTED_GAME_KEY: &str = "arena";

pub fn port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000)
}

/// CORS origin for browser clients; `*` allows any origin.
pub fn client_url() -> String {
    env::var("CLIENT_URL").unwrap_or_else(|_| "*".to_string())
}

pub fn admin_password() -> String {
    env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string())
}

pub fn hub_base_url() -> String {
    env::var("HUB_BASE_URL").unwrap_or_else(|_| DEFAULT_HUB_BASE_URL.to_string())
}

pub fn hosted_game_key() -> String {
    env::var("HOSTED_GAME_KEY").unwrap_or_else(|_| DEFAULT_HOSTED_GAME_KEY.to_string())
}

pub const HUB_TIMEOUT: Duration = Duration::from_secs(5);

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;

pub const TICK_INTERVAL: Duration = Duration::from_millis(16);
