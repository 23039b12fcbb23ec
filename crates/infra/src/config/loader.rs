//! Configuration loader
//!
//! ## Loading Strategy
//! 1. `.env` in the working directory is loaded into the process environment
//! 2. A config file is read from `INFLULINK_CONFIG`, else probed (see
//!    [`probe_config_paths`]); no file means defaults
//! 3. Environment variables override individual keys
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `INFLULINK_HOST`, `INFLULINK_PORT`, `INFLULINK_PUBLIC_URL`
//! - `INFLULINK_DB_PATH`, `INFLULINK_DB_POOL_SIZE`
//! - `INFLULINK_STATE_SECRET`, `INFLULINK_ADMIN_TOKEN`
//! - `YOUTUBE_CLIENT_ID`, `YOUTUBE_CLIENT_SECRET`, `YOUTUBE_API_KEY`
//! - `FACEBOOK_APP_ID`, `FACEBOOK_APP_SECRET`
//! - `TWITCH_CLIENT_ID`, `TWITCH_CLIENT_SECRET`
//! - `TIKTOK_CLIENT_KEY`, `TIKTOK_CLIENT_SECRET`
//! - `PROFILE_SEARCH_URL`, `PROFILE_SEARCH_API_KEY`
//! - `INFLULINK_STATS_TIMEOUT_MS`, `INFLULINK_STATS_CACHE_TTL_SECS`,
//!   `INFLULINK_STATS_FALLBACK`
//! - `INFLULINK_LOG`, `INFLULINK_LOG_JSON`

use std::path::{Path, PathBuf};
use std::str::FromStr;

use influlink_domain::{Config, InfluLinkError, OAuthClientConfig, ProfileSearchConfig, Result};

const FILE_NAMES: [&str; 4] = ["influlink.toml", "influlink.json", "config.toml", "config.json"];

/// Load configuration from `.env`, an optional file and the environment.
///
/// # Errors
/// Returns `InfluLinkError::Config` if a named file is missing, a file is
/// malformed or an override has an invalid value.
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env"),
    }

    let mut config = match std::env::var_os("INFLULINK_CONFIG") {
        Some(path) => load_from_file(Some(PathBuf::from(path)))?,
        None => match probe_config_paths() {
            Some(path) => load_from_file(Some(path))?,
            None => {
                tracing::info!("no config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `InfluLinkError::Config` when the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(InfluLinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            InfluLinkError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| InfluLinkError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content; format follows the extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| InfluLinkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| InfluLinkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(InfluLinkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the working directory, its two parents and the executable's
/// directory for a config file.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Apply environment overrides read through `lookup`.
///
/// # Errors
/// Returns `InfluLinkError::Config` for unparsable numeric values.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(host) = get("INFLULINK_HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("INFLULINK_PORT") {
        config.server.port = parse("INFLULINK_PORT", &port)?;
    }
    if let Some(url) = get("INFLULINK_PUBLIC_URL") {
        config.server.public_base_url = url;
    }

    if let Some(path) = get("INFLULINK_DB_PATH") {
        config.database.path = Some(path);
    }
    if let Some(size) = get("INFLULINK_DB_POOL_SIZE") {
        config.database.pool_size = parse("INFLULINK_DB_POOL_SIZE", &size)?;
    }

    if let Some(secret) = get("INFLULINK_STATE_SECRET") {
        config.security.state_secret = Some(secret);
    }
    if let Some(token) = get("INFLULINK_ADMIN_TOKEN") {
        config.security.admin_token = Some(token);
    }

    override_client(&mut config.providers.youtube, get("YOUTUBE_CLIENT_ID"), get("YOUTUBE_CLIENT_SECRET"));
    override_client(&mut config.providers.facebook, get("FACEBOOK_APP_ID"), get("FACEBOOK_APP_SECRET"));
    override_client(&mut config.providers.twitch, get("TWITCH_CLIENT_ID"), get("TWITCH_CLIENT_SECRET"));
    override_client(&mut config.providers.tiktok, get("TIKTOK_CLIENT_KEY"), get("TIKTOK_CLIENT_SECRET"));

    if let Some(key) = get("YOUTUBE_API_KEY") {
        config.stats.youtube_api_key = Some(key);
    }
    let search_url = get("PROFILE_SEARCH_URL");
    let search_key = get("PROFILE_SEARCH_API_KEY");
    if search_url.is_some() || search_key.is_some() {
        let search = config.stats.profile_search.get_or_insert_with(ProfileSearchConfig::default);
        if let Some(url) = search_url {
            search.base_url = url;
        }
        if let Some(key) = search_key {
            search.api_key = key;
        }
    }
    if let Some(timeout) = get("INFLULINK_STATS_TIMEOUT_MS") {
        config.stats.timeout_ms = parse("INFLULINK_STATS_TIMEOUT_MS", &timeout)?;
    }
    if let Some(ttl) = get("INFLULINK_STATS_CACHE_TTL_SECS") {
        config.stats.cache_ttl_secs = parse("INFLULINK_STATS_CACHE_TTL_SECS", &ttl)?;
    }
    if let Some(value) = get("INFLULINK_STATS_FALLBACK") {
        config.stats.fallback_enabled = parse_bool(&value);
    }

    if let Some(filter) = get("INFLULINK_LOG") {
        config.logging.filter = filter;
    }
    if let Some(value) = get("INFLULINK_LOG_JSON") {
        config.logging.json = parse_bool(&value);
    }

    Ok(())
}

fn override_client(slot: &mut Option<OAuthClientConfig>, id: Option<String>, secret: Option<String>) {
    if id.is_none() && secret.is_none() {
        return;
    }
    let client = slot.get_or_insert_with(OAuthClientConfig::default);
    if let Some(id) = id {
        client.client_id = id;
    }
    if let Some(secret) = secret {
        client.client_secret = secret;
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| InfluLinkError::Config(format!("Invalid value for {key}: {e}")))
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
