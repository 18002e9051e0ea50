//! Breadth-first traversal over the dependency capability.
//!
//! Traversal order is the backbone of the whole naming scheme: node ids are
//! BFS positions and canonical paths are the first-discovered (hence
//! shortest) root-to-node paths. Dependencies are expanded in exactly the
//! order each object reports them, which makes repeated traversals of an
//! unchanged graph bit-for-bit identical.

use std::collections::VecDeque;

use crate::errors::GraphViewError;
use crate::node::{IdentityMap, ObjectKey, TrackableHandle, TrackableReference};

/// Result of one breadth-first walk from the root.
pub(crate) struct Traversal {
    /// Every reachable object, root first, in BFS discovery order.
    pub bfs_sorted: Vec<TrackableHandle>,
    /// Canonical (shortest, first-discovered) path from the root per object.
    pub path_to_root: IdentityMap<Vec<TrackableReference>>,
}

impl super::ObjectGraphView {
    /// Finds shortest paths to all dependencies of the root.
    ///
    /// A node is enqueued only the first time it is discovered, so the
    /// recorded path is hop-count minimal with ties broken by the order the
    /// owning object enumerated its dependencies. A node reachable under two
    /// different local names keeps the first one for naming purposes; the
    /// second edge still appears in the graph record.
    pub(crate) fn breadth_first_traversal(&self) -> Result<Traversal, GraphViewError> {
        let root = self.root()?;

        let mut bfs_sorted = Vec::new();
        let mut to_visit: VecDeque<TrackableHandle> = VecDeque::from([root.clone()]);
        let mut path_to_root: IdentityMap<Vec<TrackableReference>> = IdentityMap::default();
        path_to_root.insert(ObjectKey::of(&root), Vec::new());

        while let Some(current) = to_visit.pop_front() {
            let current_key = ObjectKey::of(&current);
            for reference in self.list_dependencies(&current)? {
                let dependency_key = ObjectKey::of(&reference.target);
                if !path_to_root.contains_key(&dependency_key) {
                    let mut path = path_to_root[&current_key].clone();
                    path.push(reference.clone());
                    path_to_root.insert(dependency_key, path);
                    to_visit.push_back(reference.target.clone());
                }
            }
            bfs_sorted.push(current);
        }

        tracing::debug!(nodes = bfs_sorted.len(), "traversed object graph");
        Ok(Traversal {
            bfs_sorted,
            path_to_root,
        })
    }
}
