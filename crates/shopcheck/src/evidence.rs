//! Evidence directory layout.
//!
//! ```text
//! Evidence/
//! ├── screenshots/   {name}-{timestamp}.png
//! ├── video/         one directory per recorded test
//! ├── traces/
//! └── runs/{run-id}/
//! ```

use crate::result::TemplateResult;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Screenshot subdirectory
pub const SCREENSHOTS_DIR: &str = "screenshots";

/// Video subdirectory
pub const VIDEO_DIR: &str = "video";

/// Trace subdirectory
pub const TRACES_DIR: &str = "traces";

/// Per-run subdirectory
pub const RUNS_DIR: &str = "runs";

/// Timestamp format for evidence files (ISO-8601 with `:` and `.` made path safe)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

/// File-safe timestamp for `at`
#[must_use]
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// Evidence tree rooted at one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceLayout {
    root: PathBuf,
    run_id: Uuid,
}

impl EvidenceLayout {
    /// Layout under `root` with a fresh run id
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identifier of this test run
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// `{root}/screenshots`
    #[must_use]
    pub fn screenshots_dir(&self) -> PathBuf {
        self.root.join(SCREENSHOTS_DIR)
    }

    /// `{root}/video`
    #[must_use]
    pub fn video_dir(&self) -> PathBuf {
        self.root.join(VIDEO_DIR)
    }

    /// `{root}/traces`
    #[must_use]
    pub fn traces_dir(&self) -> PathBuf {
        self.root.join(TRACES_DIR)
    }

    /// `{root}/runs/{run-id}`
    #[must_use]
    pub fn test_run_dir(&self) -> PathBuf {
        self.root.join(RUNS_DIR).join(self.run_id.to_string())
    }

    /// Create every evidence directory
    pub fn ensure_dirs(&self) -> TemplateResult<()> {
        for dir in [
            self.screenshots_dir(),
            self.video_dir(),
            self.traces_dir(),
            self.test_run_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }
        debug!(root = %self.root.display(), "evidence directories ready");
        Ok(())
    }

    /// Screenshot path for `name` taken at `at`
    #[must_use]
    pub fn screenshot_path_at(&self, name: &str, at: DateTime<Utc>) -> PathBuf {
        self.screenshots_dir()
            .join(format!("{}-{}.png", file_safe(name), file_timestamp(at)))
    }

    /// Screenshot path for `name` taken now
    #[must_use]
    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.screenshot_path_at(name, Utc::now())
    }

    /// Write PNG bytes under the screenshots directory
    pub fn write_screenshot(&self, name: &str, png: &[u8]) -> TemplateResult<PathBuf> {
        fs::create_dir_all(self.screenshots_dir())?;
        let path = self.screenshot_path(name);
        fs::write(&path, png)?;
        debug!(path = %path.display(), bytes = png.len(), "screenshot saved");
        Ok(path)
    }

    /// Remove empty per-test directories under `video/`, returning how many went
    pub fn clean_empty_video_dirs(&self) -> TemplateResult<usize> {
        let video = self.video_dir();
        if !video.exists() {
            debug!(dir = %video.display(), "no video directory, nothing to clean");
            return Ok(0);
        }

        let mut cleaned = 0;
        for entry in fs::read_dir(&video)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path();
            match fs::read_dir(&path).map(|mut contents| contents.next().is_none()) {
                Ok(true) => {
                    fs::remove_dir(&path)?;
                    debug!(dir = %path.display(), "removed empty video directory");
                    cleaned += 1;
                }
                Ok(false) => {}
                Err(e) => warn!(dir = %path.display(), error = %e, "could not inspect video directory"),
            }
        }

        if cleaned > 0 {
            info!(cleaned, "removed empty video directories");
        }
        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    mod naming_tests {
        use super::*;

        #[test]
        fn test_timestamp_format() {
            let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
                + chrono::Duration::milliseconds(42);
            assert_eq!(file_timestamp(at), "2024-03-05T14-07-09-042Z");
        }

        #[test]
        fn test_screenshot_path() {
            let layout = EvidenceLayout::new("Evidence");
            let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let path = layout.screenshot_path_at("login-form-before-fill", at);
            assert_eq!(
                path,
                PathBuf::from("Evidence/screenshots/login-form-before-fill-2024-01-01T00-00-00-000Z.png")
            );
        }

        #[test]
        fn test_unsafe_characters_replaced() {
            let layout = EvidenceLayout::new("e");
            let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let path = layout.screenshot_path_at("list-click-name-A/B", at);
            assert!(path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("list-click-name-A_B-")));
        }

        #[test]
        fn test_run_dirs_are_unique() {
            let a = EvidenceLayout::new("Evidence");
            let b = EvidenceLayout::new("Evidence");
            assert_ne!(a.test_run_dir(), b.test_run_dir());
            assert!(a.test_run_dir().starts_with("Evidence/runs"));
        }
    }

    mod filesystem_tests {
        use super::*;

        #[test]
        fn test_ensure_dirs() {
            let tmp = tempfile::tempdir().unwrap();
            let layout = EvidenceLayout::new(tmp.path().join("Evidence"));
            layout.ensure_dirs().unwrap();
            assert!(layout.screenshots_dir().is_dir());
            assert!(layout.video_dir().is_dir());
            assert!(layout.traces_dir().is_dir());
            assert!(layout.test_run_dir().is_dir());
        }

        #[test]
        fn test_write_screenshot() {
            let tmp = tempfile::tempdir().unwrap();
            let layout = EvidenceLayout::new(tmp.path());
            let path = layout.write_screenshot("home", &[1, 2, 3]).unwrap();
            assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
            assert!(path.starts_with(layout.screenshots_dir()));
        }

        #[test]
        fn test_clean_empty_video_dirs() {
            let tmp = tempfile::tempdir().unwrap();
            let layout = EvidenceLayout::new(tmp.path());
            let video = layout.video_dir();
            fs::create_dir_all(video.join("passed-1")).unwrap();
            fs::create_dir_all(video.join("passed-2")).unwrap();
            fs::create_dir_all(video.join("failed")).unwrap();
            fs::write(video.join("failed").join("video.webm"), b"x").unwrap();
            fs::write(video.join("stray.txt"), b"x").unwrap();

            assert_eq!(layout.clean_empty_video_dirs().unwrap(), 2);
            assert!(video.join("failed").is_dir());
            assert!(!video.join("passed-1").exists());
            assert!(video.join("stray.txt").exists());
        }

        #[test]
        fn test_clean_without_video_dir() {
            let tmp = tempfile::tempdir().unwrap();
            let layout = EvidenceLayout::new(tmp.path().join("missing"));
            assert_eq!(layout.clean_empty_video_dirs().unwrap(), 0);
        }
    }
}
