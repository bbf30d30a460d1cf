//! Naming aliases between the BMAD and MADACE ecosystems.
//!
//! Two independent two-way tables: module short names (`bmm` ↔ `mam`,
//! `bmb` ↔ `mab`; `cis` and `core` map to themselves) and framework names
//! (`bmad` ↔ `madace`). Lookups are case-insensitive on input.

/// Module short-name pairs, both directions.
const MODULE_ALIASES: &[(&str, &str)] = &[
    ("bmm", "mam"),
    ("bmb", "mab"),
    ("mam", "bmm"),
    ("mab", "bmb"),
];

/// Framework name pairs, both directions.
const FRAMEWORK_ALIASES: &[(&str, &str)] = &[("bmad", "madace"), ("madace", "bmad")];

fn lookup(table: &[(&str, &str)], key: &str) -> Option<String> {
    table
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| to.to_string())
}

/// Resolve a module name to its counterpart in the other ecosystem.
/// Names with no alias (e.g. `cis`, `core`) resolve to themselves.
pub fn resolve_module_alias(module: &str) -> String {
    let normalized = module.to_lowercase();
    lookup(MODULE_ALIASES, &normalized).unwrap_or(normalized)
}

/// Resolve a framework name to its counterpart (`bmad` ↔ `madace`).
pub fn resolve_framework_alias(framework: &str) -> String {
    let normalized = framework.to_lowercase();
    lookup(FRAMEWORK_ALIASES, &normalized).unwrap_or(normalized)
}

/// All names a module may be filed under: `[normalized, alias]`, or just
/// `[normalized]` when no alias exists.
pub fn get_module_variants(module: &str) -> Vec<String> {
    let normalized = module.to_lowercase();
    match lookup(MODULE_ALIASES, &normalized) {
        Some(alias) => vec![normalized, alias],
        None => vec![normalized],
    }
}

/// All names a framework may be filed under.
pub fn get_framework_variants(framework: &str) -> Vec<String> {
    let normalized = framework.to_lowercase();
    match lookup(FRAMEWORK_ALIASES, &normalized) {
        Some(alias) => vec![normalized, alias],
        None => vec![normalized],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_alias_symmetry() {
        for module in ["bmm", "bmb", "mam", "mab"] {
            assert_eq!(resolve_module_alias(&resolve_module_alias(module)), module);
        }
    }

    #[test]
    fn test_unaliased_modules_self_map() {
        assert_eq!(resolve_module_alias("cis"), "cis");
        assert_eq!(resolve_module_alias("core"), "core");
        assert_eq!(get_module_variants("cis"), vec!["cis"]);
    }

    #[test]
    fn test_case_insensitive_input() {
        assert_eq!(resolve_module_alias("BMM"), "mam");
        assert_eq!(get_framework_variants("BMAD"), vec!["bmad", "madace"]);
    }

    #[test]
    fn test_framework_variants() {
        assert_eq!(get_framework_variants("madace"), vec!["madace", "bmad"]);
        assert_eq!(resolve_framework_alias("bmad"), "madace");
    }

    #[test]
    fn test_module_variants_ordering() {
        // Input-normalized form always comes first.
        assert_eq!(get_module_variants("mam"), vec!["mam", "bmm"]);
        assert_eq!(get_module_variants("bmm"), vec!["bmm", "mam"]);
    }
}
