use crate::model::tree::{NodeId, NodeMap};

#[derive(Copy, Clone, Debug)]
pub enum TreeEvent {
    AddedToForest(NodeId),
    AddedToParent(NodeId),
    RemovingFromParent(NodeId),
    RemovedFromForest(NodeId),
}

/// Per-node "currently focused child" pointers.
///
/// Following these from the root yields the focus chain: the active output,
/// then its active workspace, then down to the focused leaf.
#[derive(Default)]
pub struct Selection {
    nodes: slotmap::SecondaryMap<NodeId, NodeId>,
}

impl Selection {
    /// The child of `node` that currently holds focus, if any.
    pub fn focused(&self, node: NodeId) -> Option<NodeId> { self.nodes.get(node).copied() }

    /// Walks the focus chain starting at `root` and returns the last node on it.
    pub fn focus_leaf(&self, root: NodeId) -> NodeId {
        let mut node = root;
        while let Some(&child) = self.nodes.get(node) {
            node = child;
        }
        node
    }

    /// Iterates over the focus chain below `root`, not including `root` itself.
    pub fn chain(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = self.focused(root);
        std::iter::from_fn(move || {
            let node = next?;
            next = self.focused(node);
            Some(node)
        })
    }

    /// Points every ancestor of `target` at the path leading to it.
    pub fn focus(&mut self, map: &NodeMap, target: NodeId) {
        let mut node = target;
        while let Some(parent) = node.parent(map) {
            self.nodes.insert(parent, node);
            node = parent;
        }
    }

    /// Like [`focus`](Self::focus), but leaves everything above `stop` alone.
    pub fn focus_up_to(&mut self, map: &NodeMap, target: NodeId, stop: NodeId) {
        let mut node = target;
        while node != stop
            && let Some(parent) = node.parent(map)
        {
            self.nodes.insert(parent, node);
            node = parent;
        }
    }

    pub fn set_focused(&mut self, parent: NodeId, child: Option<NodeId>) {
        match child {
            Some(child) => {
                self.nodes.insert(parent, child);
            }
            None => {
                self.nodes.remove(parent);
            }
        }
    }

    pub fn handle_event(&mut self, map: &NodeMap, event: TreeEvent) {
        use TreeEvent::*;
        match event {
            AddedToForest(_) | AddedToParent(_) => {}
            RemovingFromParent(node) => {
                let Some(parent) = node.parent(map) else {
                    return;
                };
                if self.nodes.get(parent) == Some(&node) {
                    if let Some(new_focus) = node.next_sibling(map).or(node.prev_sibling(map)) {
                        self.nodes.insert(parent, new_focus);
                    } else {
                        self.nodes.remove(parent);
                    }
                }
            }
            RemovedFromForest(node) => {
                self.nodes.remove(node);
            }
        }
    }
}
