//! Path Tree
//!
//! Builds a nested folder/file tree from component `relative_path` values
//! for directory-style browsing. The backend may emit either `/` or `\`
//! separated paths depending on where the analysis ran; both are accepted.

use std::collections::BTreeMap;

use crate::types::CodeComponent;

/// One node of the directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    Folder {
        children: BTreeMap<String, PathNode>,
    },
    /// Leaf referencing the original `relative_path` it was built from
    File { path: String },
}

impl PathNode {
    pub fn is_folder(&self) -> bool {
        matches!(self, PathNode::Folder { .. })
    }

    /// Number of file leaves beneath this node
    pub fn file_count(&self) -> usize {
        match self {
            PathNode::File { .. } => 1,
            PathNode::Folder { children } => children.values().map(PathNode::file_count).sum(),
        }
    }
}

/// Split a relative path on either separator, dropping empty segments
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty()).collect()
}

/// Build the directory tree from the top-level components' paths.
///
/// A segment is a folder unless it is the final segment of the path; the
/// same file referenced by several components appears once.
pub fn build(components: &[CodeComponent]) -> BTreeMap<String, PathNode> {
    let mut root: BTreeMap<String, PathNode> = BTreeMap::new();

    for component in components {
        let segments = split_path(&component.relative_path);
        let Some((file_name, folders)) = segments.split_last() else {
            continue;
        };

        let mut current = &mut root;
        for folder in folders {
            // A file already claimed this segment name; leave it alone
            // and stop descending for this path.
            if matches!(current.get(*folder), Some(PathNode::File { .. })) {
                break;
            }
            let PathNode::Folder { children } = current
                .entry((*folder).to_string())
                .or_insert_with(|| PathNode::Folder {
                    children: BTreeMap::new(),
                })
            else {
                // Guarded above: a freshly inserted or existing entry here
                // is always a folder.
                unreachable!("non-folder entry after file guard")
            };
            current = children;
        }

        current
            .entry((*file_name).to_string())
            .or_insert_with(|| PathNode::File {
                path: component.relative_path.clone(),
            });
    }

    root
}

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

    #[test]
    fn test_builds_nested_folders() {
        let components = vec![
            component("a", "src/core/engine.py"),
            component("b", "src/core/utils.py"),
            component("c", "src/app.py"),
            component("d", "readme.py"),
        ];
        let tree = build(&components);

        let PathNode::Folder { children: src } = &tree["src"] else {
            panic!("src should be a folder");
        };
        assert!(src["core"].is_folder());
        assert!(!src["app.py"].is_folder());
        assert_eq!(tree["src"].file_count(), 3);
        assert_eq!(tree["readme.py"], PathNode::File { path: "readme.py".to_string() });
    }

    #[test]
    fn test_backslash_paths() {
        let components = vec![component("a", r"pkg\sub\mod.py")];
        let tree = build(&components);
        let PathNode::Folder { children } = &tree["pkg"] else {
            panic!("pkg should be a folder");
        };
        assert!(children.contains_key("sub"));
    }

    #[test]
    fn test_same_file_listed_once() {
        let components = vec![
            component("a", "pkg/mod.py"),
            component("b", "pkg/mod.py"),
        ];
        let tree = build(&components);
        assert_eq!(tree["pkg"].file_count(), 1);
    }

    #[test]
    fn test_split_path_drops_empty_segments() {
        assert_eq!(split_path("a//b/c.py"), vec!["a", "b", "c.py"]);
        assert_eq!(split_path(""), Vec::<&str>::new());
    }
}
