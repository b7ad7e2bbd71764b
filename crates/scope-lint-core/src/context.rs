//! Context types for rule execution.

use std::path::{Path, PathBuf};

/// Context provided to per-file rules.
///
/// Everything here is read-only; a rule sees one consistent view of the
/// file between classification and fix emission.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            relative_path,
        }
    }

    /// File name, e.g. `index.ts`.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory containing the file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(self.path)
    }

    /// Converts a byte offset to a 1-indexed (line, column) pair.
    ///
    /// Offsets past the end clamp to the last position.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.content.len());
        let before = &self.content.as_bytes()[..offset];
        let line = before.iter().filter(|b| **b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);
        (line, offset - line_start + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_strips_root() {
        let ctx = FileContext::new(Path::new("/p/src/ui/a.ts"), "", Path::new("/p"));
        assert_eq!(ctx.relative_path, PathBuf::from("src/ui/a.ts"));
        assert_eq!(ctx.file_name(), "a.ts");
        assert_eq!(ctx.dir(), Path::new("/p/src/ui"));
    }

    #[test]
    fn relative_path_falls_back_to_absolute() {
        let ctx = FileContext::new(Path::new("/elsewhere/a.ts"), "", Path::new("/p"));
        assert_eq!(ctx.relative_path, PathBuf::from("/elsewhere/a.ts"));
    }

    #[test]
    fn line_col_is_one_indexed() {
        let content = "line1\nline2\nline3";
        let ctx = FileContext::new(Path::new("/p/a.ts"), content, Path::new("/p"));

        assert_eq!(ctx.line_col(8), (2, 3));
        assert_eq!(ctx.line_col(0), (1, 1));
        assert_eq!(ctx.line_col(999), (3, 6));
    }
}
