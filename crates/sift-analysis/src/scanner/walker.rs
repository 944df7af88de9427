//! Parallel file walker using the `ignore` crate's `WalkParallel`.
//!
//! Supports `.siftignore` (gitignore syntax, hierarchical) on top of the
//! standard gitignore chain and the default ignore directories.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel as channel;
use sift_core::config::ScanConfig;
use sift_core::errors::ScanError;

use super::language_detect::Language;

/// Directory names excluded from every scan.
pub const DEFAULT_IGNORES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "target",
    "coverage",
    "vendor",
    "bin",
    "obj",
    "out",
];

/// A file selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub language: Language,
}

/// Walk a directory tree in parallel, collecting files in supported
/// languages.
///
/// Respects `.gitignore`, `.siftignore`, and the default ignore
/// directories. Returns files sorted by path for deterministic output.
pub fn walk_directory(
    root: &Path,
    config: &ScanConfig,
    cancelled: &AtomicBool,
) -> Result<Vec<DiscoveredFile>, ScanError> {
    let (tx, rx) = channel::unbounded();

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .add_custom_ignore_filename(".siftignore")
        .max_filesize(Some(config.effective_max_file_size()))
        .follow_links(config.follow_symlinks.unwrap_or(false));

    if config.effective_threads() > 0 {
        builder.threads(config.effective_threads());
    }

    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    for pattern in DEFAULT_IGNORES {
        // negated pattern means "exclude this directory"
        let _ = overrides.add(&format!("!{pattern}/**"));
        let _ = overrides.add(&format!("!{pattern}"));
    }
    for pattern in &config.extra_ignore {
        let _ = overrides.add(&format!("!{pattern}"));
    }
    let overrides = overrides.build().map_err(|e| ScanError::Walk {
        path: root.to_path_buf(),
        message: e.to_string(),
    })?;
    builder.overrides(overrides);

    let walker = builder.build_parallel();
    let cancelled = Arc::new(AtomicBool::new(cancelled.load(Ordering::Relaxed)));

    walker.run(|| {
        let tx = tx.clone();
        let cancelled = Arc::clone(&cancelled);
        Box::new(move |entry| {
            if cancelled.load(Ordering::Relaxed) {
                return ignore::WalkState::Quit;
            }

            let entry = match entry {
                Ok(e) => e,
                Err(_) => return ignore::WalkState::Continue,
            };

            match entry.file_type() {
                Some(ft) if ft.is_file() => {}
                _ => return ignore::WalkState::Continue,
            }

            let path = entry.path().to_path_buf();
            let language =
                match Language::from_extension(path.extension().and_then(|e| e.to_str())) {
                    Some(language) => language,
                    None => return ignore::WalkState::Continue,
                };

            let _ = tx.send(DiscoveredFile { path, language });
            ignore::WalkState::Continue
        })
    });
    drop(tx);

    let mut files: Vec<DiscoveredFile> = rx.iter().collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_supported_files_and_skips_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("A.cs"), "class A {}").unwrap();
        fs::write(dir.path().join("B.java"), "class B {}").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        fs::write(dir.path().join("bin").join("C.cs"), "class C {}").unwrap();

        let cancelled = AtomicBool::new(false);
        let files = walk_directory(dir.path(), &ScanConfig::default(), &cancelled).unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.cs".to_string(), "B.java".to_string()]);
        assert_eq!(files[0].language, Language::CSharp);
        assert_eq!(files[1].language, Language::Java);
    }

    #[test]
    fn respects_siftignore() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".siftignore"), "generated/\n").unwrap();
        fs::create_dir(dir.path().join("generated")).unwrap();
        fs::write(dir.path().join("generated").join("G.cs"), "class G {}").unwrap();
        fs::write(dir.path().join("Kept.cs"), "class K {}").unwrap();

        let cancelled = AtomicBool::new(false);
        let files = walk_directory(dir.path(), &ScanConfig::default(), &cancelled).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("Kept.cs"));
    }
}
