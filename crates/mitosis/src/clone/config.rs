//! Cloner configuration.

use std::collections::HashSet;

/// Names of the annotation keys the cloner reads from the catalog.
///
/// Schemas that already use one of the default key names for unrelated
/// metadata can remap any of them here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConfig {
    /// Marks an attribute or relation to be omitted from the copy.
    pub exclude: String,
    /// Selects a generator ("uuid", "now") instead of copying the value.
    pub rebuild: String,
    /// Names an attribute on the parent in the copy chain to inherit from.
    pub follow_parent: String,
    /// Fallback policy ("keep", "blank") when no parent value resolves.
    pub without_parent: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            exclude: "exclude".to_string(),
            rebuild: "rebuild".to_string(),
            follow_parent: "followParent".to_string(),
            without_parent: "withoutParent".to_string(),
        }
    }
}

/// Per-call options for a clone operation.
#[derive(Debug, Clone)]
pub struct CloneOptions {
    /// Relation names skipped without consulting the schema.
    pub excluded_relations: HashSet<String>,
    /// Pass the exclusion set unchanged into every recursive step instead of
    /// resetting it. Only safe when relation names are unique across the
    /// whole schema; see
    /// [`Schema::relation_names_globally_unique`](crate::catalog::Schema::relation_names_globally_unique).
    pub propagate_exclusions: bool,
    /// Commit the store's pending scope once the full copy is materialized.
    pub commit_on_return: bool,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CloneOptions {
    /// Default options: nothing excluded, no propagation, commit on return.
    pub fn new() -> Self {
        Self {
            excluded_relations: HashSet::new(),
            propagate_exclusions: false,
            commit_on_return: true,
        }
    }

    /// Exclude relations by name at the root level.
    pub fn excluding<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_relations
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Pass the exclusion set down the whole copy chain.
    pub fn propagate_exclusions(mut self) -> Self {
        self.propagate_exclusions = true;
        self
    }

    /// Leave the pending scope uncommitted when the call returns.
    pub fn without_commit(mut self) -> Self {
        self.commit_on_return = false;
        self
    }
}
