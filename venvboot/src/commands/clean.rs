//! `venvboot clean`: remove the environment directory.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use venvboot_env::EnvLayout;

pub fn cmd_clean(layout: &EnvLayout, dry_run: bool, force: bool) -> Result<()> {
    let root = layout.root();
    if !root.exists() {
        eprintln!("No environment found at {}", root.display());
        return Ok(());
    }
    // Never delete a directory we cannot recognise as an environment.
    if !layout.pyvenv_cfg().exists() && !layout.marker().exists() {
        bail!(
            "{} does not look like a virtual environment (no pyvenv.cfg); refusing to remove it",
            root.display()
        );
    }

    let size = dir_size(root);
    eprintln!("Environment {} ({})", root.display(), format_size(size));

    if dry_run {
        eprintln!("(Dry run, nothing removed. Drop --dry-run to delete.)");
        return Ok(());
    }

    if !force {
        eprint!("Remove this environment? [y/N] ");
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    fs::remove_dir_all(root).with_context(|| format!("Failed to remove {}", root.display()))?;
    tracing::info!(env_dir = %root.display(), freed = %format_size(size), "Removed environment");
    Ok(())
}

/// Total size of a directory, recursively. Symlinks are not followed.
fn dir_size(path: &Path) -> u64 {
    let mut total: u64 = 0;
    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            let Ok(meta) = entry.path().symlink_metadata() else {
                continue;
            };
            if meta.is_dir() {
                total += dir_size(&entry.path());
            } else {
                total += meta.len();
            }
        }
    }
    total
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_dir_size_sums_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("lib")).unwrap();
        fs::write(tmp.path().join("pyvenv.cfg"), vec![0u8; 10]).unwrap();
        fs::write(tmp.path().join("lib").join("x.py"), vec![0u8; 30]).unwrap();
        assert_eq!(dir_size(tmp.path()), 40);
    }

    #[test]
    fn test_clean_refuses_unrecognised_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = EnvLayout::new(tmp.path().join("venv"));
        fs::create_dir_all(layout.root()).unwrap();
        fs::write(layout.root().join("notes.txt"), "keep me").unwrap();

        assert!(cmd_clean(&layout, false, true).is_err());
        assert!(layout.root().join("notes.txt").exists());
    }

    #[test]
    fn test_clean_force_removes_environment() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = EnvLayout::new(tmp.path().join("venv"));
        fs::create_dir_all(layout.root()).unwrap();
        fs::write(layout.pyvenv_cfg(), "home = /usr/bin\n").unwrap();

        cmd_clean(&layout, true, true).unwrap();
        assert!(layout.root().exists());

        cmd_clean(&layout, false, true).unwrap();
        assert!(!layout.root().exists());
    }

    #[test]
    fn test_clean_missing_environment_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = EnvLayout::new(tmp.path().join("venv"));
        cmd_clean(&layout, false, true).unwrap();
    }
}
