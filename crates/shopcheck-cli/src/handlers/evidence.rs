//! `evidence` command handlers

use crate::commands::EvidenceArgs;
use crate::error::CliResult;
use crate::output::Reporter;
use shopcheck::EvidenceLayout;

/// Execute `evidence init`
pub fn execute_init(reporter: &Reporter, args: &EvidenceArgs) -> CliResult<EvidenceLayout> {
    let layout = EvidenceLayout::new(&args.root);
    layout.ensure_dirs()?;
    reporter.success(&format!("evidence directories ready under {}", args.root.display()));
    for dir in [layout.screenshots_dir(), layout.video_dir(), layout.traces_dir()] {
        reporter.line(&dir.display().to_string());
    }
    Ok(layout)
}

/// Execute `evidence clean`
pub fn execute_clean(reporter: &Reporter, args: &EvidenceArgs) -> CliResult<usize> {
    let removed = EvidenceLayout::new(&args.root).clean_empty_video_dirs()?;
    if removed == 0 {
        reporter.info(&format!("no empty video directories under {}", args.root.display()));
    }
    reporter.line(&format!("removed {removed} empty video directories"));
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(dir: &TempDir) -> EvidenceArgs {
        EvidenceArgs {
            root: dir.path().join("Evidence"),
        }
    }

    #[test]
    fn test_init_creates_tree() {
        let dir = TempDir::new().unwrap();
        let layout = execute_init(&Reporter::new(false, true), &args(&dir)).unwrap();
        assert!(layout.screenshots_dir().is_dir());
        assert!(layout.video_dir().is_dir());
        assert!(layout.traces_dir().is_dir());
    }

    #[test]
    fn test_clean_counts_removed() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("Evidence").join("video");
        fs::create_dir_all(video.join("a")).unwrap();
        fs::create_dir_all(video.join("b")).unwrap();
        fs::create_dir_all(video.join("c")).unwrap();
        fs::write(video.join("c").join("clip.webm"), b"x").unwrap();

        let removed = execute_clean(&Reporter::new(false, true), &args(&dir)).unwrap();
        assert_eq!(removed, 2);
        assert!(video.join("c").exists());
    }

    #[test]
    fn test_clean_missing_root_is_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(execute_clean(&Reporter::new(false, true), &args(&dir)).unwrap(), 0);
    }
}
