use std::path::Path;

use glob::Pattern;

/// Decides whether a filesystem entry participates in the scan. Pure
/// function of the entry path plus configuration; patterns are compiled
/// once at engine construction.
#[derive(Debug)]
pub struct PathFilter {
    include_hidden: bool,
    patterns: Vec<Pattern>,
}

impl PathFilter {
    pub fn new(
        include_hidden: bool,
        patterns: &[String],
    ) -> Result<Self, glob::PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            include_hidden,
            patterns,
        })
    }

    /// True when the entry must be skipped: hidden name while hidden
    /// inclusion is off, or any exclusion pattern matches the base name
    /// or the full path.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if !self.include_hidden && name.starts_with('.') {
            return true;
        }

        self.patterns
            .iter()
            .any(|pattern| pattern.matches(&name) || pattern.matches(&path.to_string_lossy()))
    }
}
