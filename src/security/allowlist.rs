//! Paths that skip authentication.

use std::collections::HashSet;

/// Exact-match set of request paths reachable without a credential.
#[derive(Debug, Clone, Default)]
pub struct PathAllowlist {
    paths: HashSet<String>,
}

impl PathAllowlist {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }
}
