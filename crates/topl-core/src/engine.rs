//! Two-phase placeholder resolution
//!
//! 1. Internal: rewrite every string leaf against the tree itself, pass after
//!    pass, until a pass rewrites nothing. A pass ceiling stands in for cycle
//!    detection: if the last allowed pass still rewrote something, the
//!    references are treated as circular.
//! 2. External: one pass against the caller's parameters.
//!
//! Whatever placeholders remain are collected, deduplicated and sorted.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::config::ResolvedConfig;
use crate::error::{Error, Result};
use crate::params::ParamSource;
use crate::placeholder::{
    contains_placeholder, placeholders, substitute_external, substitute_internal,
};
use crate::value::Value;
use crate::walk::{string_leaves, string_leaves_mut, LeafPath};

/// Internal passes allowed before references are declared circular
pub const DEFAULT_MAX_PASSES: usize = 10;

/// Options for a resolve call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Ceiling on internal passes (values below 1 count as 1)
    pub max_passes: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl ResolveOptions {
    /// Options with the default pass ceiling
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the internal pass ceiling
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }
}

/// Resolve placeholders in `tree` with the default options.
///
/// The caller's tree is never modified; the result owns a resolved copy.
///
/// # Example
///
/// ```rust
/// use topl_core::{from_toml_str, resolve, Params};
///
/// let tree = from_toml_str(r#"
/// name = "world"
/// greeting = "Hello {{name}}!"
/// "#).unwrap();
///
/// let config = resolve(&tree, &Params::new()).unwrap();
/// assert_eq!(config.get_string("greeting").unwrap(), "Hello world!");
/// assert!(!config.has_unresolved());
/// ```
pub fn resolve<P>(tree: &Value, params: &P) -> Result<ResolvedConfig>
where
    P: ParamSource + ?Sized,
{
    resolve_with_options(tree, params, &ResolveOptions::default())
}

/// Resolve placeholders in `tree` with explicit options
pub fn resolve_with_options<P>(
    tree: &Value,
    params: &P,
    options: &ResolveOptions,
) -> Result<ResolvedConfig>
where
    P: ParamSource + ?Sized,
{
    let mut working = tree.clone();

    let passes = resolve_internal(&mut working, options.max_passes.max(1))?;
    resolve_external(&mut working, params);

    let unresolved = collect_unresolved(&working);
    if unresolved.is_empty() {
        debug!("All placeholders resolved successfully");
    } else {
        warn!(
            "Could not resolve {} placeholder(s): {}",
            unresolved.len(),
            unresolved.join(", ")
        );
    }

    Ok(ResolvedConfig::new(working, unresolved, passes))
}

/// Run internal passes over `working` until one rewrites nothing.
///
/// Leaves are rewritten in place as the pass goes, so later leaves in the
/// same pass already see earlier rewrites. A pass counts as changed when any
/// placeholder was replaced, even if the text came out identical (a value
/// that reproduces its own placeholder never settles).
///
/// Returns the number of passes run, including the final quiet one.
pub fn resolve_internal(working: &mut Value, max_passes: usize) -> Result<usize> {
    // Rewriting only touches string contents, so locations stay valid
    let leaves: Vec<LeafPath> = string_leaves(working).map(|(path, _)| path).collect();
    debug!(
        "Starting internal placeholder resolution over {} string leaves",
        leaves.len()
    );

    let mut pass = 0;
    loop {
        pass += 1;
        let rewritten = internal_pass(working, &leaves);

        if rewritten.is_empty() {
            debug!("Internal resolution stabilized after {} passes", pass);
            return Ok(pass);
        }

        if pass >= max_passes {
            let pending: Vec<String> = rewritten.iter().map(ToString::to_string).collect();
            return Err(Error::circular_reference(max_passes, &pending));
        }
    }
}

fn internal_pass<'p>(working: &mut Value, leaves: &'p [LeafPath]) -> Vec<&'p LeafPath> {
    let mut rewritten = Vec::new();

    for path in leaves {
        let Some(current) = working.string_at(path) else {
            continue;
        };
        if !contains_placeholder(current) {
            continue;
        }

        let substitution = substitute_internal(current, working);
        if !substitution.is_changed() {
            continue;
        }
        let resolved = substitution.text.into_owned();
        debug!("Resolved internal {}: {} -> {}", path, current, resolved);

        if let Some(slot) = working.string_at_mut(path) {
            *slot = resolved;
        }
        rewritten.push(path);
    }

    rewritten
}

/// Apply `params` to every string leaf once; returns how many leaves changed
pub fn resolve_external<P>(working: &mut Value, params: &P) -> usize
where
    P: ParamSource + ?Sized,
{
    debug!(
        "Starting external placeholder resolution with {} parameters",
        params.param_count()
    );
    if params.is_empty() {
        return 0;
    }

    let mut changed = 0;
    for (path, leaf) in string_leaves_mut(working) {
        let substitution = substitute_external(leaf, params);
        if !substitution.is_changed() {
            continue;
        }
        let resolved = substitution.text.into_owned();
        debug!("Resolved external {}: {} -> {}", path, leaf, resolved);
        *leaf = resolved;
        changed += 1;
    }
    changed
}

/// Every placeholder still present in `value`, deduplicated and sorted
pub fn collect_unresolved(value: &Value) -> Vec<String> {
    string_leaves(value)
        .flat_map(|(_, leaf)| placeholders(leaf).map(|p| p.literal.to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
