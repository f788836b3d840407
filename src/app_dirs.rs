use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("studytrack");
            Some(state_dir.join("sessions.db"))
        } else {
            ProjectDirs::from("", "", "studytrack")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("sessions.db"))
        }
    }

    /// Log file kept next to the database it describes
    pub fn log_path(db_path: &Path) -> PathBuf {
        match db_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join("studytrack.log"),
            _ => PathBuf::from("studytrack.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sits_beside_database() {
        let log = AppDirs::log_path(Path::new("/tmp/study/sessions.db"));
        assert_eq!(log, PathBuf::from("/tmp/study/studytrack.log"));
    }

    #[test]
    fn bare_database_name_logs_to_cwd() {
        assert_eq!(
            AppDirs::log_path(Path::new("sessions.db")),
            PathBuf::from("studytrack.log")
        );
    }
}
