use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::RelGraphConfig;
use crate::parser::JS_EXTENSIONS;

/// Directory never descended into, whatever the ignore files say.
const DEPENDENCY_DIR: &str = "node_modules";

/// Collect the JavaScript sources under `root`, sorted.
///
/// `.gitignore` rules apply even outside a git checkout. `node_modules` is
/// pruned at the directory level, and `config.exclude` globs are matched
/// against the absolute path, the root-relative path and each relative
/// path component.
pub fn walk_project(root: &Path, config: &RelGraphConfig) -> anyhow::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let excludes = compile_excludes(config.exclude.as_deref().unwrap_or_default());

    let mut files: Vec<PathBuf> = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != DEPENDENCY_DIR)
        .build()
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("{err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| has_js_extension(path))
        .filter(|path| !is_excluded(root, path, &excludes))
        .inspect(|path| debug!("discovered {}", path.display()))
        .collect();

    files.sort();
    Ok(files)
}

fn has_js_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| JS_EXTENSIONS.contains(&ext))
}

/// Parse exclusion globs once per walk. Invalid patterns are reported and dropped.
fn compile_excludes(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|raw| match glob::Pattern::new(raw) {
            Ok(p) => Some(p),
            Err(err) => {
                warn!("ignoring invalid exclude pattern {raw:?}: {err}");
                None
            }
        })
        .collect()
}

fn is_excluded(root: &Path, path: &Path, excludes: &[glob::Pattern]) -> bool {
    if excludes.is_empty() {
        return false;
    }
    let rel = path.strip_prefix(root).unwrap_or(path);
    let full = path.to_string_lossy();
    let rel_str = rel.to_string_lossy();
    excludes.iter().any(|p| {
        p.matches(&full)
            || p.matches(&rel_str)
            || rel
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .any(|part| p.matches(part))
    })
}
