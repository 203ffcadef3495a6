use crate::ConfigError;
use glob::{MatchOptions, Pattern};

/// `*` and `?` stay within one path segment; `**` crosses segments
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A set of shell-style glob patterns compiled once at configuration time
///
/// A candidate matches the set if it matches any pattern in full.
///
/// # Examples
///
/// ```
/// use spa_snapshot::url::PatternSet;
///
/// let set = PatternSet::compile(&["/admin/**".to_string(), "/draft-*".to_string()]).unwrap();
///
/// assert!(set.matches("/admin/users/42"));
/// assert!(set.matches("/draft-post"));
/// assert!(!set.matches("/draft-post/comments"));
/// assert!(!set.matches("/blog"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compiles every glob in `globs`
    ///
    /// # Returns
    ///
    /// * `Ok(PatternSet)` - All patterns compiled
    /// * `Err(ConfigError::InvalidPattern)` - The first pattern that failed to compile
    pub fn compile<S: AsRef<str>>(globs: &[S]) -> Result<Self, ConfigError> {
        let patterns = globs
            .iter()
            .map(|glob| {
                let glob = glob.as_ref();
                Pattern::new(glob)
                    .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", glob, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Returns true if `candidate` matches any pattern
    pub fn matches(&self, candidate: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(candidate, MATCH_OPTIONS))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// The source globs, in configuration order
    pub fn globs(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }
}
