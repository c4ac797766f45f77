//! Component Tree Model
//!
//! Read-only views over the recursive component hierarchy: depth-first
//! flattening, id lookup, aggregate statistics, and a folder/file tree for
//! directory-style browsing. Everything here is derived data; the
//! underlying components are never mutated.
//!
//! The hierarchy comes from the backend and is not trusted blindly: the
//! traversal carries a depth cap and [`check_integrity`] rejects duplicate
//! ids before anything expensive (such as an export) runs on the tree.

pub mod path_tree;

use std::collections::HashSet;

use crate::types::{BridgeError, CodeComponent, ComponentType, Result};

/// Maximum nesting depth the traversal will follow. Source nesting is
/// practically class -> method; anything deeper than this is treated as
/// corrupt data.
pub const MAX_TREE_DEPTH: usize = 32;

/// Lazily walk every component in the tree, depth-first, parent before
/// children. The iterator is finite even on malformed input: descent stops
/// at [`MAX_TREE_DEPTH`].
pub fn flatten(components: &[CodeComponent]) -> Flatten<'_> {
    Flatten {
        stack: vec![components.iter()],
    }
}

/// Iterator returned by [`flatten`]
pub struct Flatten<'a> {
    stack: Vec<std::slice::Iter<'a, CodeComponent>>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a CodeComponent;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(component) => {
                    if !component.method_components.is_empty()
                        && self.stack.len() < MAX_TREE_DEPTH
                    {
                        self.stack.push(component.method_components.iter());
                    }
                    return Some(component);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Depth-first search for a component id, descending into
/// `method_components`. Returns the first match.
pub fn find_by_id<'a>(components: &'a [CodeComponent], id: &str) -> Option<&'a CodeComponent> {
    flatten(components).find(|c| c.id == id)
}

/// Verify the tree is safe to traverse exhaustively: unique ids everywhere
/// and nesting within [`MAX_TREE_DEPTH`]. Violations indicate corrupt
/// backend data and are reported to the user instead of looping or
/// overflowing.
pub fn check_integrity(components: &[CodeComponent]) -> Result<()> {
    fn walk<'a>(
        components: &'a [CodeComponent],
        depth: usize,
        seen: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if depth > MAX_TREE_DEPTH {
            return Err(BridgeError::TreeIntegrity(format!(
                "component nesting exceeds the maximum depth of {MAX_TREE_DEPTH}"
            )));
        }
        for component in components {
            if !seen.insert(component.id.as_str()) {
                return Err(BridgeError::TreeIntegrity(format!(
                    "duplicate component id: {}",
                    component.id
                )));
            }
            walk(&component.method_components, depth + 1, seen)?;
        }
        Ok(())
    }

    walk(components, 1, &mut HashSet::new())
}

/// Aggregate counts over the flattened tree, as shown on the overview
/// dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentStats {
    pub total_components: usize,
    pub classes: usize,
    /// Functions, methods and constructors together
    pub callables: usize,
    pub total_files: usize,
    pub total_folders: usize,
}

impl ComponentStats {
    pub fn collect(components: &[CodeComponent]) -> Self {
        let mut stats = Self::default();
        let mut files: HashSet<&str> = HashSet::new();
        let mut folders: HashSet<String> = HashSet::new();

        for component in flatten(components) {
            stats.total_components += 1;
            match component.component_type {
                ComponentType::Class => stats.classes += 1,
                ComponentType::Function | ComponentType::Method | ComponentType::Constructor => {
                    stats.callables += 1
                }
            }
            files.insert(component.relative_path.as_str());
            let segments = path_tree::split_path(&component.relative_path);
            if segments.len() > 1 {
                folders.insert(segments[..segments.len() - 1].join("/"));
            } else {
                folders.insert("root".to_string());
            }
        }

        stats.total_files = files.len();
        stats.total_folders = folders.len();
        stats
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn component(id: &str, path: &str) -> CodeComponent {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "component_type": "function",
            "relative_path": path,
            "start_line": 1,
            "end_line": 2
        }))
        .unwrap()
    }

    fn class_with_methods(id: &str, path: &str, methods: &[&str]) -> CodeComponent {
        let mut class = component(id, path);
        class.component_type = ComponentType::Class;
        class.method_components = methods
            .iter()
            .map(|m| {
                let mut method = component(&format!("{id}.{m}"), path);
                method.component_type = ComponentType::Method;
                method
            })
            .collect();
        class
    }

    fn sample_tree() -> Vec<CodeComponent> {
        vec![
            class_with_methods("pkg.Store", "pkg/store.py", &["get", "put"]),
            component("pkg.run", "pkg/main.py"),
            class_with_methods("pkg.Cache", "pkg/cache.py", &["evict"]),
        ]
    }

    #[test]
    fn test_flatten_counts_and_order() {
        let tree = sample_tree();
        let ids: Vec<&str> = flatten(&tree).map(|c| c.id.as_str()).collect();
        // N top-level + sum of methods, parent always before its methods
        assert_eq!(
            ids,
            vec![
                "pkg.Store",
                "pkg.Store.get",
                "pkg.Store.put",
                "pkg.run",
                "pkg.Cache",
                "pkg.Cache.evict",
            ]
        );
    }

    #[test]
    fn test_flatten_is_restartable() {
        let tree = sample_tree();
        assert_eq!(flatten(&tree).count(), 6);
        assert_eq!(flatten(&tree).count(), 6);
    }

    #[test]
    fn test_find_by_id_nested_and_absent() {
        let tree = sample_tree();
        assert_eq!(find_by_id(&tree, "pkg.Cache.evict").unwrap().id, "pkg.Cache.evict");
        assert_eq!(find_by_id(&tree, "pkg.run").unwrap().id, "pkg.run");
        assert!(find_by_id(&tree, "pkg.missing").is_none());
    }

    #[test]
    fn test_integrity_accepts_valid_tree() {
        assert!(check_integrity(&sample_tree()).is_ok());
    }

    #[test]
    fn test_integrity_rejects_duplicate_ids() {
        let mut tree = sample_tree();
        tree.push(component("pkg.run", "pkg/other.py"));
        let err = check_integrity(&tree).unwrap_err();
        assert!(err.to_string().contains("pkg.run"));
    }

    #[test]
    fn test_integrity_rejects_excessive_depth() {
        let mut node = component("leaf", "deep.py");
        for i in 0..(MAX_TREE_DEPTH + 1) {
            let mut parent = component(&format!("level{i}"), "deep.py");
            parent.method_components = vec![node];
            node = parent;
        }
        assert!(check_integrity(std::slice::from_ref(&node)).is_err());
    }

    #[test]
    fn test_flatten_depth_cap_terminates() {
        let mut node = component("leaf", "deep.py");
        for i in 0..(MAX_TREE_DEPTH * 2) {
            let mut parent = component(&format!("level{i}"), "deep.py");
            parent.method_components = vec![node];
            node = parent;
        }
        let tree = vec![node];
        // Must terminate; entries beyond the cap are simply not visited.
        assert!(flatten(&tree).count() <= MAX_TREE_DEPTH + 1);
    }

    #[test]
    fn test_stats_collect() {
        let stats = ComponentStats::collect(&sample_tree());
        assert_eq!(stats.total_components, 6);
        assert_eq!(stats.classes, 2);
        assert_eq!(stats.callables, 4);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_folders, 1);
    }
}
