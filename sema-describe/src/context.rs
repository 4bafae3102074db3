//! Per-build compiler state
//!
//! `BuildContext` owns the mutable state one top-level condition build
//! needs: the join-variable counter, the result variable name, and the
//! sort-key configuration. It is reset at the top of every build and
//! threaded through the recursion by `&mut` - a single context is never
//! shared between concurrent builds.

use crate::sort::SortKeys;

/// Default name of the top-level join variable.
pub const RESULT_VARIABLE: &str = "result";

/// Mutable state scoped to one top-level condition build.
#[derive(Clone, Debug)]
pub struct BuildContext {
    result_variable: String,
    sort_keys: SortKeys,
    counter: u32,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildContext {
    /// Fresh context with the default result variable and no sort keys.
    pub fn new() -> Self {
        Self {
            result_variable: RESULT_VARIABLE.to_string(),
            sort_keys: SortKeys::none(),
            counter: 0,
        }
    }

    /// Set the result variable name, fluent.
    pub fn with_result_variable(mut self, name: impl Into<String>) -> Self {
        self.result_variable = name.into();
        self
    }

    /// Set the sort-key configuration, fluent.
    pub fn with_sort_keys(mut self, sort_keys: SortKeys) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    /// The result variable name.
    pub fn result_variable(&self) -> &str {
        &self.result_variable
    }

    /// The sort-key configuration.
    pub fn sort_keys(&self) -> &SortKeys {
        &self.sort_keys
    }

    /// Allocate the next join variable with the given prefix.
    ///
    /// One monotonic counter is shared across prefixes, so `v1` and `o2`
    /// can never collide within a build.
    pub fn next_variable(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}{}", self.counter)
    }

    /// Reset the counter for a new top-level build.
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortDirection;

    #[test]
    fn test_counter_is_monotonic_and_shared() {
        let mut ctx = BuildContext::new();
        assert_eq!(ctx.next_variable("v"), "v1");
        assert_eq!(ctx.next_variable("o"), "o2");
        assert_eq!(ctx.next_variable("v"), "v3");
    }

    #[test]
    fn test_reset() {
        let mut ctx = BuildContext::new();
        ctx.next_variable("v");
        ctx.next_variable("v");
        ctx.reset();
        assert_eq!(ctx.next_variable("v"), "v1");
    }

    #[test]
    fn test_fluent_config() {
        let ctx = BuildContext::new()
            .with_result_variable("page")
            .with_sort_keys(SortKeys::none().with("", SortDirection::Asc));
        assert_eq!(ctx.result_variable(), "page");
        assert!(ctx.sort_keys().contains(""));
    }
}
