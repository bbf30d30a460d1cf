//! Directory and workflow discovery across both naming conventions.
//!
//! Every lookup builds its full candidate-path list up front (framework
//! variants × module variants) and then probes it through an injected
//! existence predicate, so the probing order is unit-testable without a
//! real filesystem. An agent or workflow filed under either convention is
//! discoverable without the caller knowing which one was used.

use std::path::{Path, PathBuf};

use crate::interop::aliases::get_module_variants;

/// Modules searched when no specific module is given.
pub const ALL_MODULES: &[&str] = &["mam", "mab", "cis", "core"];

/// Frameworks probed, in priority order.
const FRAMEWORKS: &[&str] = &["madace", "bmad"];

/// A predicate deciding whether a candidate path exists.
pub type ExistsFn<'a> = &'a dyn Fn(&Path) -> bool;

/// Candidate `<root>/<framework>/<module>/<kind>` directories for one
/// module, covering every framework × module-variant combination.
pub fn candidate_dirs(root: &Path, module: &str, kind: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for framework in FRAMEWORKS {
        for variant in get_module_variants(module) {
            candidates.push(root.join(framework).join(variant).join(kind));
        }
    }
    candidates
}

/// Candidate workflow directories across all known modules.
pub fn all_workflow_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for module in ALL_MODULES {
        dirs.extend(candidate_dirs(root, module, "workflows"));
    }
    dirs
}

/// Resolve the agents directory for a module, or `None` when no candidate
/// exists under either convention.
pub fn resolve_agent_directory(root: &Path, module: &str, exists: ExistsFn) -> Option<PathBuf> {
    candidate_dirs(root, module, "agents")
        .into_iter()
        .find(|dir| exists(dir))
}

/// Resolve the workflows directory for a module.
pub fn resolve_workflow_directory(root: &Path, module: &str, exists: ExistsFn) -> Option<PathBuf> {
    candidate_dirs(root, module, "workflows")
        .into_iter()
        .find(|dir| exists(dir))
}

/// Candidate file paths for a named workflow within one directory.
///
/// Covers the MADACE flat layout (`<name>.workflow.yaml`, `<name>.yaml`,
/// a literal file name) and the BMAD nested layout
/// (`<name>/workflow.yaml`).
pub fn workflow_file_candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![
        dir.join(format!("{}.workflow.yaml", name)),
        dir.join(format!("{}.yaml", name)),
        dir.join(name),
        dir.join(name).join("workflow.yaml"),
    ]
}

/// Find a workflow by name, probing every workflow directory under both
/// conventions before giving up.
pub fn find_workflow(root: &Path, name: &str, exists: ExistsFn) -> Option<PathBuf> {
    for dir in all_workflow_dirs(root) {
        for candidate in workflow_file_candidates(&dir, name) {
            if exists(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Filesystem-backed `find_workflow` that additionally scans one level of
/// grouping directories for the deep BMAD layout
/// (`workflows/<group>/<name>/workflow.yaml`).
pub fn find_workflow_fs(root: &Path, name: &str) -> Option<PathBuf> {
    if let Some(found) = find_workflow(root, name, &|p| p.is_file()) {
        return Some(found);
    }

    for dir in all_workflow_dirs(root) {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let group = entry.path();
            if !group.is_dir() {
                continue;
            }
            let nested = group.join(name).join("workflow.yaml");
            if nested.is_file() {
                return Some(nested);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_dirs_cover_both_conventions() {
        let dirs = candidate_dirs(Path::new("/p"), "mam", "agents");
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/p/madace/mam/agents"),
                PathBuf::from("/p/madace/bmm/agents"),
                PathBuf::from("/p/bmad/mam/agents"),
                PathBuf::from("/p/bmad/bmm/agents"),
            ]
        );
    }

    #[test]
    fn test_resolve_agent_directory_without_filesystem() {
        let target = PathBuf::from("/p/bmad/bmm/agents");
        let found = resolve_agent_directory(Path::new("/p"), "mam", &|p| p == target);
        assert_eq!(found, Some(target));
    }

    #[test]
    fn test_resolve_agent_directory_none_when_no_candidate() {
        assert_eq!(
            resolve_agent_directory(Path::new("/p"), "mam", &|_| false),
            None
        );
    }

    #[test]
    fn test_find_workflow_flat_name() {
        let target = PathBuf::from("/p/madace/mam/workflows/plan.workflow.yaml");
        let found = find_workflow(Path::new("/p"), "plan", &|p| p == target);
        assert_eq!(found, Some(target));
    }

    #[test]
    fn test_find_workflow_nested_name() {
        let target = PathBuf::from("/p/bmad/bmm/workflows/prd/workflow.yaml");
        let found = find_workflow(Path::new("/p"), "prd", &|p| p == target);
        assert_eq!(found, Some(target));
    }

    #[test]
    fn test_find_workflow_not_found() {
        assert_eq!(find_workflow(Path::new("/p"), "ghost", &|_| false), None);
    }

    #[test]
    fn test_find_workflow_fs_grouping_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir
            .path()
            .join("bmad/bmm/workflows/2-plan-workflows/prd");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("workflow.yaml"), "workflow: {}").unwrap();

        let found = find_workflow_fs(dir.path(), "prd").unwrap();
        assert!(found.ends_with("2-plan-workflows/prd/workflow.yaml"));
    }
}
