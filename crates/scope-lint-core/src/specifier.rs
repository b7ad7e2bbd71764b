//! Module specifier helpers.
//!
//! Two specifiers denote the same module when they are equal after
//! stripping a known module file extension.

use std::path::{Component, Path, PathBuf};

/// Known module file extensions. `.d.ts` is listed first so it wins over `.ts`.
pub const KNOWN_EXTENSIONS: &[&str] = &[".d.ts", ".ts", ".tsx", ".js", ".jsx"];

/// Base name of a directory's barrel file.
pub const INDEX_BASENAME: &str = "index";

/// Base name of a directory's namespace file.
pub const NAMESPACE_BASENAME: &str = "namespace";

/// Returns true if the specifier starts with `./` or `../` (or is `.`/`..`).
#[must_use]
pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with(".\\")
        || specifier.starts_with("..\\")
}

fn known_extension(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    KNOWN_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| lower.len() > ext.len() && lower.ends_with(ext))
}

/// Returns true if the name ends with a known module extension.
#[must_use]
pub fn has_known_extension(name: &str) -> bool {
    known_extension(name).is_some()
}

/// Strips a known module extension, if any.
///
/// ```
/// use scope_lint_core::specifier::strip_module_extension;
/// assert_eq!(strip_module_extension("./foo.js"), "./foo");
/// assert_eq!(strip_module_extension("types.d.ts"), "types");
/// assert_eq!(strip_module_extension("./foo.test"), "./foo.test");
/// ```
#[must_use]
pub fn strip_module_extension(name: &str) -> &str {
    match known_extension(name) {
        Some(ext) => &name[..name.len() - ext.len()],
        None => name,
    }
}

/// Normalizes a specifier for comparison: relative specifiers lose their
/// extension, rooted ones are kept as written.
#[must_use]
pub fn normalize(specifier: &str) -> &str {
    if is_relative(specifier) {
        strip_module_extension(specifier)
    } else {
        specifier
    }
}

/// Returns true if both specifiers denote the same module.
#[must_use]
pub fn same_module(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn is_special_file(file_name: &str, basename: &str) -> bool {
    has_known_extension(file_name)
        && strip_module_extension(file_name).eq_ignore_ascii_case(basename)
}

/// Returns true for `index.{ts,tsx,js,jsx,d.ts}`.
#[must_use]
pub fn is_index_file(file_name: &str) -> bool {
    is_special_file(file_name, INDEX_BASENAME)
}

/// Returns true for `namespace.{ts,tsx,js,jsx,d.ts}`.
#[must_use]
pub fn is_namespace_file(file_name: &str) -> bool {
    is_special_file(file_name, NAMESPACE_BASENAME)
}

/// Splits a specifier into path segments on `/` and `\`.
#[must_use]
pub fn segments(specifier: &str) -> Vec<&str> {
    specifier
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolves `.` and `..` components lexically, without touching the filesystem.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// File name without its known module extension.
#[must_use]
pub fn file_stem(path: &Path) -> String {
    path.file_name()
        .map(|n| strip_module_extension(&n.to_string_lossy()).to_owned())
        .unwrap_or_default()
}
