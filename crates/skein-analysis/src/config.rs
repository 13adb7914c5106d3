//! Build configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use skein_graph::{EnforcementPolicy, Graph};

/// Default cap on the `errors` collection of a build result.
pub const DEFAULT_MAX_ERRORS: usize = 50;

/// Default prefix limit for node descriptions.
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 160;

/// Doc tags that mark a comment block as a module description.
pub const DEFAULT_DESCRIPTION_TAGS: &[&str] = &["@module", "@packageDocumentation"];

/// Extension probe order for module resolution. Declaration-producing
/// TypeScript extensions come first so barrels resolve to the richest file.
pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "js", "jsx", "json", "mjs", "cjs"];

/// Include/exclude globs for the universe scan.
///
/// Globs are POSIX-normalized and match dot-files. Precedence:
/// implicit-deny (`.git`, `node_modules`) > exclude > include > gitignore >
/// default-allow; includes can re-admit `node_modules` paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

/// Module resolver tuning.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Extension probe order (without leading dots).
    pub extensions: Vec<String>,
    /// Additional specifiers treated as runtime builtins.
    pub extra_builtins: Vec<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            extra_builtins: Vec::new(),
        }
    }
}

/// Options for [`crate::build_graph`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Absolute path to the repository root.
    pub cwd: PathBuf,
    /// Universe scan configuration.
    pub config: ScanConfig,
    /// Previous graph for incremental planning.
    pub previous_graph: Option<Graph>,
    /// Hash-implies-size policy (default: warn).
    pub hash_size_enforcement: EnforcementPolicy,
    /// Description prefix limit; 0 disables descriptions.
    pub node_description_limit: usize,
    /// `@`-prefixed doc tags marking description blocks. Entries must match
    /// `^@\w+$`; invalid entries are dropped with a warning.
    pub node_description_tags: Vec<String>,
    /// Cap on the returned `errors` collection.
    pub max_errors: usize,
    /// Resolver tuning.
    pub resolver: ResolverOptions,
}

impl BuildOptions {
    /// Options with spec defaults for the given root.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            config: ScanConfig::default(),
            previous_graph: None,
            hash_size_enforcement: EnforcementPolicy::Warn,
            node_description_limit: DEFAULT_DESCRIPTION_LIMIT,
            node_description_tags: DEFAULT_DESCRIPTION_TAGS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            max_errors: DEFAULT_MAX_ERRORS,
            resolver: ResolverOptions::default(),
        }
    }

    pub fn includes(mut self, globs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.includes.extend(globs.into_iter().map(Into::into));
        self
    }

    pub fn excludes(mut self, globs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.excludes.extend(globs.into_iter().map(Into::into));
        self
    }

    pub fn previous_graph(mut self, graph: Graph) -> Self {
        self.previous_graph = Some(graph);
        self
    }

    pub fn hash_size_enforcement(mut self, policy: EnforcementPolicy) -> Self {
        self.hash_size_enforcement = policy;
        self
    }

    pub fn max_errors(mut self, max: usize) -> Self {
        self.max_errors = max;
        self
    }
}

/// Validate a description tag against `^@\w+$`.
pub(crate) fn is_valid_description_tag(tag: &str) -> bool {
    let Some(rest) = tag.strip_prefix('@') else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let options = BuildOptions::new("/repo");
        assert_eq!(options.max_errors, 50);
        assert_eq!(options.node_description_limit, 160);
        assert_eq!(
            options.node_description_tags,
            vec!["@module".to_string(), "@packageDocumentation".to_string()]
        );
        assert_eq!(options.hash_size_enforcement, EnforcementPolicy::Warn);
    }

    #[test]
    fn tag_validation() {
        assert!(is_valid_description_tag("@module"));
        assert!(is_valid_description_tag("@packageDocumentation"));
        assert!(is_valid_description_tag("@my_tag2"));
        assert!(!is_valid_description_tag("module"));
        assert!(!is_valid_description_tag("@"));
        assert!(!is_valid_description_tag("@has space"));
        assert!(!is_valid_description_tag("@dash-ed"));
    }
}
