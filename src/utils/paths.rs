use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".budget_buddy";
const DATA_DIR: &str = "data";
const BACKUP_DIR: &str = "backups";
const OUTBOX_DIR: &str = "outbox";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.budget_buddy`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("BUDGET_BUDDY_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding one JSON file per storage key.
pub fn data_dir_in(base: &Path) -> PathBuf {
    base.join(DATA_DIR)
}

/// Directory receiving quarantined copies of unreadable storage files.
pub fn backup_dir_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

/// Directory where simulated e-mail alerts are appended.
pub fn outbox_dir_in(base: &Path) -> PathBuf {
    base.join(OUTBOX_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_at_base() {
        let base = PathBuf::from("/tmp/buddy");
        assert_eq!(data_dir_in(&base), base.join("data"));
        assert_eq!(backup_dir_in(&base), base.join("backups"));
        assert_eq!(outbox_dir_in(&base), base.join("outbox"));
        assert_eq!(config_file_in(&base), base.join("config.json"));
    }
}
