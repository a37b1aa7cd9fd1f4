use slotmap::SlotMap;

/// Arena of container nodes.
///
/// Only the links between nodes live here. Everything a node carries is kept
/// by the observer `O`, which hears about each node entering or leaving the
/// arena and each change of parent.
pub struct Tree<O> {
    pub map: NodeMap,
    pub data: O,
}

impl<O: Observer> Tree<O> {
    pub fn with_observer(data: O) -> Self { Tree { map: NodeMap::default(), data } }

    pub fn mk_node(&mut self) -> UnattachedNode<'_, O> {
        let id = self.map.nodes.insert(Links::default());
        self.data.added_to_forest(&self.map, id);
        UnattachedNode { id, tree: self }
    }

    /// Drops a node that has already been unlinked. Its children must have
    /// been released before it.
    #[track_caller]
    pub(crate) fn free(&mut self, id: NodeId) {
        debug_assert!(id.parent(&self.map).is_none(), "freeing linked node {id:?}");
        if self.map.contains(id) {
            self.data.removed_from_forest(&self.map, id);
            self.map.nodes.remove(id);
        }
    }
}

slotmap::new_key_type! {
    /// Handle to a node in the arena. Stale handles resolve to nothing.
    pub struct NodeId;
}

/// Parent, sibling and child links of every node.
#[derive(Default)]
pub struct NodeMap {
    nodes: SlotMap<NodeId, Links>,
}

#[derive(Default, Debug, Clone, Copy)]
struct Links {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    /// Attached to `parent` but outside its ordered children.
    floating: bool,
}

impl NodeMap {
    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn contains(&self, id: NodeId) -> bool { self.nodes.contains_key(id) }

    fn update(&mut self, id: NodeId, f: impl FnOnce(&mut Links)) {
        if let Some(links) = self.nodes.get_mut(id) {
            f(links);
        }
    }

    /// Places `id` between `prev` and `next` in the children of `parent`.
    /// `id` must not be linked anywhere.
    fn splice(&mut self, id: NodeId, parent: NodeId, prev: Option<NodeId>, next: Option<NodeId>) {
        self.update(id, |l| {
            l.parent = Some(parent);
            l.prev_sibling = prev;
            l.next_sibling = next;
        });
        match prev {
            Some(prev) => self.update(prev, |l| l.next_sibling = Some(id)),
            None => self.update(parent, |l| l.first_child = Some(id)),
        }
        match next {
            Some(next) => self.update(next, |l| l.prev_sibling = Some(id)),
            None => self.update(parent, |l| l.last_child = Some(id)),
        }
    }

    fn link_back(&mut self, id: NodeId, parent: NodeId) {
        if id == parent || !self.contains(id) || !self.contains(parent) {
            return;
        }
        let last = parent.last_child(self);
        self.splice(id, parent, last, None);
    }

    #[track_caller]
    fn link_before(&mut self, id: NodeId, next: NodeId) {
        if id == next || !self.contains(id) {
            return;
        }
        let parent = next.parent(self).expect("sibling of a parentless node");
        let prev = next.prev_sibling(self);
        self.splice(id, parent, prev, Some(next));
    }

    #[track_caller]
    fn link_after(&mut self, id: NodeId, prev: NodeId) {
        if id == prev || !self.contains(id) {
            return;
        }
        let parent = prev.parent(self).expect("sibling of a parentless node");
        let next = prev.next_sibling(self);
        self.splice(id, parent, Some(prev), next);
    }

    fn link_floating(&mut self, id: NodeId, parent: NodeId) {
        if id == parent || !self.contains(parent) {
            return;
        }
        self.update(id, |l| {
            l.parent = Some(parent);
            l.floating = true;
        });
    }

    /// Takes `id` out of its parent. Its own children stay with it.
    fn unlink(&mut self, id: NodeId) {
        let Some(&Links { parent, prev_sibling, next_sibling, .. }) = self.nodes.get(id) else {
            return;
        };
        if let Some(prev) = prev_sibling {
            self.update(prev, |l| l.next_sibling = next_sibling);
        }
        if let Some(next) = next_sibling {
            self.update(next, |l| l.prev_sibling = prev_sibling);
        }
        if let Some(parent) = parent {
            self.update(parent, |l| {
                if l.first_child == Some(id) {
                    l.first_child = next_sibling;
                }
                if l.last_child == Some(id) {
                    l.last_child = prev_sibling;
                }
            });
        }
        self.update(id, |l| {
            l.parent = None;
            l.prev_sibling = None;
            l.next_sibling = None;
            l.floating = false;
        });
    }
}

impl NodeId {
    #[track_caller]
    pub fn detach<'a, O: Observer>(self, tree: &'a mut Tree<O>) -> DetachedNode<'a, O> {
        DetachedNode { id: self, tree }
    }

    fn links(self, map: &NodeMap) -> Option<&Links> { map.nodes.get(self) }

    pub fn parent(self, map: &NodeMap) -> Option<NodeId> { self.links(map)?.parent }

    pub fn first_child(self, map: &NodeMap) -> Option<NodeId> { self.links(map)?.first_child }

    fn last_child(self, map: &NodeMap) -> Option<NodeId> { self.links(map)?.last_child }

    pub fn next_sibling(self, map: &NodeMap) -> Option<NodeId> { self.links(map)?.next_sibling }

    pub fn prev_sibling(self, map: &NodeMap) -> Option<NodeId> { self.links(map)?.prev_sibling }

    /// Ordered children; floating members are not included.
    pub fn children(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.first_child(map), move |&n| n.next_sibling(map))
    }

    /// The node itself, then each parent up to the top of its tree.
    pub fn ancestors(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(self), move |&n| n.parent(map))
    }

    pub fn is_empty(self, map: &NodeMap) -> bool { self.first_child(map).is_none() }

    pub fn child_count(self, map: &NodeMap) -> usize { self.children(map).count() }

    pub fn is_floating_member(self, map: &NodeMap) -> bool {
        self.links(map).is_some_and(|l| l.floating)
    }
}

pub trait Observer
where Self: Sized {
    fn added_to_forest(&mut self, map: &NodeMap, node: NodeId);
    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId);
    /// Called while the node is still linked to its parent.
    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId);
}

/// A freshly created node with no parent yet.
#[must_use = "Unattached nodes should be inserted into the tree or kept as a root"]
pub struct UnattachedNode<'a, O> {
    id: NodeId,
    tree: &'a mut Tree<O>,
}

impl<'a, O: Observer> UnattachedNode<'a, O> {
    /// Keeps the node as a parentless root.
    pub fn into_id(self) -> NodeId { self.id }

    pub(crate) fn push_back(self, parent: NodeId) -> NodeId {
        self.attach(|map, id| map.link_back(id, parent))
    }

    #[track_caller]
    pub(crate) fn insert_before(self, sibling: NodeId) -> NodeId {
        self.attach(|map, id| map.link_before(id, sibling))
    }

    #[track_caller]
    pub(crate) fn insert_after(self, sibling: NodeId) -> NodeId {
        self.attach(|map, id| map.link_after(id, sibling))
    }

    /// Attaches the node to `parent` without placing it in the ordered children.
    pub(crate) fn float_under(self, parent: NodeId) -> NodeId {
        self.attach(|map, id| map.link_floating(id, parent))
    }

    fn attach(self, link: impl FnOnce(&mut NodeMap, NodeId)) -> NodeId {
        link(&mut self.tree.map, self.id);
        self.tree.data.added_to_parent(&self.tree.map, self.id);
        self.id
    }
}

/// An existing node about to be moved or unlinked.
#[must_use = "Detached nodes should be reattached to the tree or unlinked"]
pub struct DetachedNode<'a, O> {
    id: NodeId,
    tree: &'a mut Tree<O>,
}

impl<'a, O: Observer> DetachedNode<'a, O> {
    /// Moves the node to the end of `parent`'s children. Observers only hear
    /// about it when the parent actually changes.
    pub(crate) fn push_back(self, parent: NodeId) -> NodeId {
        let DetachedNode { id, tree } = self;
        let old_parent = id.parent(&tree.map);
        let moved = old_parent != Some(parent);
        if moved && old_parent.is_some() {
            tree.data.removing_from_parent(&tree.map, id);
        }
        tree.map.unlink(id);
        tree.map.link_back(id, parent);
        if moved {
            tree.data.added_to_parent(&tree.map, id);
        }
        id
    }

    /// Removes the node from its parent, leaving it as a root of the arena.
    pub(crate) fn unlink(self) -> NodeId {
        if self.id.parent(&self.tree.map).is_some() {
            self.tree.data.removing_from_parent(&self.tree.map, self.id);
            self.tree.map.unlink(self.id);
        }
        self.id
    }
}
