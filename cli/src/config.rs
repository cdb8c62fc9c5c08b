use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub session_path: PathBuf,
    pub users_path: PathBuf,
}

impl Config {
    /// Resolve the data directory. `users` overrides the default user table location.
    pub fn load(users: Option<PathBuf>) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "gluco").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let mut config = Self::in_dir(data_dir);
        if let Some(path) = users {
            config.users_path = path;
        }
        Ok(config)
    }

    pub fn in_dir(data_dir: PathBuf) -> Self {
        Config {
            db_path: data_dir.join("gluco.db"),
            session_path: data_dir.join("session"),
            users_path: data_dir.join("users.csv"),
            data_dir,
        }
    }

    pub fn load_session(&self) -> Result<Option<String>> {
        load_session(&self.session_path)
    }

    pub fn save_session(&self, user_id: &str) -> Result<()> {
        save_session(&self.session_path, user_id)
    }

    pub fn clear_session(&self) -> Result<bool> {
        clear_session(&self.session_path)
    }
}

/// The session file holds a single user id. Missing or blank means logged out.
pub fn load_session(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let id = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;
    let id = id.trim();
    Ok((!id.is_empty()).then(|| id.to_string()))
}

pub fn save_session(path: &Path, user_id: &str) -> Result<()> {
    std::fs::write(path, user_id.trim())
        .with_context(|| format!("Failed to write session file: {}", path.display()))
}

pub fn clear_session(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to remove session file: {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::in_dir(dir.path().to_path_buf());

        assert_eq!(config.load_session().unwrap(), None);

        config.save_session(" 1001\n").unwrap();
        assert_eq!(config.load_session().unwrap().as_deref(), Some("1001"));

        assert!(config.clear_session().unwrap());
        assert_eq!(config.load_session().unwrap(), None);
        assert!(!config.clear_session().unwrap());
    }

    #[test]
    fn test_blank_session_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(load_session(&path).unwrap(), None);
    }

    #[test]
    fn test_paths_live_in_data_dir() {
        let config = Config::in_dir(PathBuf::from("/tmp/gluco-test"));
        assert_eq!(config.db_path, PathBuf::from("/tmp/gluco-test/gluco.db"));
        assert_eq!(config.session_path, PathBuf::from("/tmp/gluco-test/session"));
        assert_eq!(config.users_path, PathBuf::from("/tmp/gluco-test/users.csv"));
    }
}
