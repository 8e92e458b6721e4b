use std::path::{Component, Path};

/// Derive the canonical vertex name for a `/`-delimited path.
///
/// Takes the last path segment and cuts it at the first `.`:
/// `"a/b/c.js"` -> `"c"`, `"x.y.js"` -> `"x"`, `"./lib/util"` -> `"util"`.
///
/// Used for both discovered file paths and the string literals inside
/// `require([...])` / `define([...])` dependency arrays, so both sides of a
/// `requires` edge land on the same vertex.
///
/// Trailing slashes are ignored (`"a/b/"` -> `"b"`). A leaf made only of dots
/// yields the empty string.
pub fn canonical_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    // rsplit always yields at least one item.
    let leaf = trimmed.rsplit('/').next().unwrap_or(trimmed);
    leaf.split('.').next().unwrap_or(leaf)
}

/// Render `file` relative to `root` as a `/`-separated string.
///
/// The result has no leading `./` and no trailing slash. Files outside `root`
/// are rendered from their full path with the same separator rules.
pub fn relative_module_path(root: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(root).unwrap_or(file);
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_owned()),
            _ => None,
        })
        .collect();
    parts.join("/")
}
