//! Device include/exclude filtering.

use regex::Regex;

/// Errors raised while building a [`DeviceFilter`].
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Invalid device pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Selects devices by name using regular expressions.
///
/// A device passes when it matches at least one include pattern (or no
/// include patterns are configured) and matches none of the exclude patterns.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl DeviceFilter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, FilterError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn allows(&self, device: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|r| r.is_match(device));
        included && !self.exclude.iter().any(|r| r.is_match(device))
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, FilterError> {
    patterns
        .iter()
        .map(|p| {
            let pattern = p.as_ref();
            Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_everything() {
        let filter = DeviceFilter::default();
        assert!(filter.allows("sda"));
        assert!(filter.allows("nvme0n1p1"));
    }

    #[test]
    fn test_include_and_exclude() {
        let filter = DeviceFilter::new(&["^sd", "^nvme"], &["^sdb"]).unwrap();
        assert!(filter.allows("sda1"));
        assert!(filter.allows("nvme0n1"));
        assert!(!filter.allows("sdb1"));
        assert!(!filter.allows("dm-0"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = DeviceFilter::new(&["sd("], &[]).unwrap_err();
        assert!(err.to_string().contains("sd("));
    }
}
