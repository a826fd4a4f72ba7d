//! Configuration loading and database path resolution

use std::path::PathBuf;

/// Default number of concurrent upserts dispatched per batch when
/// seeding large collections.
pub const DEFAULT_BATCH_SIZE: usize = 100;

const DATABASE_ENV_VAR: &str = "VELO_DATABASE";
const CONFIG_FILE: &str = "velo.toml";
const DEFAULT_DATABASE: &str = "velo.db";

/// Database path resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `VELO_DATABASE` environment variable
/// 3. `database` key in `velo.toml` (working directory)
/// 4. Compiled default (`velo.db` in the working directory)
pub fn resolve_database_path(cli_arg: Option<PathBuf>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path;
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(contents) = std::fs::read_to_string(CONFIG_FILE) {
        if let Ok(config) = toml::from_str::<toml::Value>(&contents) {
            if let Some(database) = config.get("database").and_then(|v| v.as_str()) {
                return PathBuf::from(database);
            }
        }
    }

    // Priority 4: Compiled default
    PathBuf::from(DEFAULT_DATABASE)
}
