use slotmap::SecondaryMap;
use tracing::{debug, info, trace, warn};

use super::LayoutError;
use crate::common::config::{Config, OutputConfig};
use crate::model::container::{Con, ConKind, Layout, NodeType};
use crate::model::selection::{Selection, TreeEvent};
use crate::model::tree::{NodeId, NodeMap, Observer, Tree};
use crate::sys::backend::{Backend, OutputHandle, ViewHandle, ViewState};
use crate::sys::geometry::Rect;

/// Node data kept beside the tree structure.
#[derive(Default)]
pub(super) struct Components {
    pub(super) selection: Selection,
    pub(super) cons: SecondaryMap<NodeId, Con>,
}

impl Components {
    fn dispatch_event(&mut self, map: &NodeMap, event: TreeEvent) {
        self.selection.handle_event(map, event);
        if let TreeEvent::RemovedFromForest(node) = event {
            self.cons.remove(node);
        }
    }
}

impl Observer for Components {
    fn added_to_forest(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::AddedToForest(node))
    }

    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::AddedToParent(node))
    }

    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::RemovingFromParent(node))
    }

    fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId) {
        self.dispatch_event(map, TreeEvent::RemovedFromForest(node))
    }
}

/// The container tree: Root, then outputs, workspaces, containers and views.
///
/// All mutation goes through the lifecycle operations here, which either
/// complete the whole edit or leave the tree as it was. Destruction happens in
/// two phases: the node is first unlinked, which redirects any focus pointer
/// that referred to it, and only then is its subtree released.
pub struct LayoutEngine {
    pub(super) config: Config,
    pub(super) root: NodeId,
    pub(super) tree: Tree<Components>,
}

impl LayoutEngine {
    pub fn new(config: Config) -> Self {
        let mut tree = Tree::with_observer(Components::default());
        let root = tree.mk_node().into_id();
        let mut con = Con::root().with_name("root");
        con.visible = true;
        tree.data.cons.insert(root, con);
        LayoutEngine { config, root, tree }
    }

    pub fn root(&self) -> NodeId { self.root }

    pub fn config(&self) -> &Config { &self.config }

    /// Replaces the configuration and reapplies the gap settings to the tree.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.reset_gaps();
    }

    pub fn map(&self) -> &NodeMap { &self.tree.map }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize { self.tree.map.len() }

    pub fn is_empty(&self) -> bool { self.tree.map.is_empty() }

    pub fn get(&self, node: NodeId) -> Option<&Con> { self.tree.data.cons.get(node) }

    pub(super) fn get_mut(&mut self, node: NodeId) -> Option<&mut Con> {
        self.tree.data.cons.get_mut(node)
    }

    pub fn node_type(&self, node: NodeId) -> Option<NodeType> { self.get(node).map(Con::node_type) }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> { node.parent(&self.tree.map) }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.tree.map)
    }

    /// The floating set of a workspace; empty for every other kind of node.
    pub fn floating(&self, node: NodeId) -> &[NodeId] {
        self.get(node).and_then(Con::floating).unwrap_or(&[])
    }

    /// The child currently holding focus within `node`.
    pub fn focused(&self, node: NodeId) -> Option<NodeId> {
        self.tree.data.selection.focused(node)
    }

    pub fn outputs(&self) -> impl Iterator<Item = NodeId> + '_ { self.children(self.root) }

    pub fn workspaces(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.outputs().flat_map(|output| self.children(output))
    }

    pub fn is_workspace_empty(&self, workspace: NodeId) -> bool {
        workspace.is_empty(&self.tree.map) && self.floating(workspace).is_empty()
    }

    fn expect_kind(
        &self,
        node: NodeId,
        ty: NodeType,
        msg: &'static str,
    ) -> Result<&Con, LayoutError> {
        match self.get(node) {
            Some(con) if con.is(ty) => Ok(con),
            _ => Err(LayoutError::InvalidParent(msg)),
        }
    }

    /// Appends a node under `parent`, giving it focus there if nothing had it.
    fn attach_back(&mut self, parent: NodeId, con: Con) -> NodeId {
        let node = self.tree.mk_node().push_back(parent);
        self.tree.data.cons.insert(node, con);
        if self.tree.data.selection.focused(parent).is_none() {
            self.tree.data.selection.set_focused(parent, Some(node));
        }
        node
    }

    pub fn create_output(&mut self, backend: &mut dyn Backend, handle: OutputHandle) -> Option<NodeId> {
        let name = backend.output_name(handle);
        let reported = backend.output_resolution(handle);
        debug!(%handle, ?name, "Added output");

        let oc: Option<OutputConfig> =
            name.as_deref().and_then(|n| self.config.output_config(n)).cloned();
        if let Some(oc) = &oc {
            debug!("Matched output config for {}", oc.name);
            if !oc.enabled {
                info!(%handle, "Output {} is disabled, not managing it", oc.name);
                return None;
            }
        }

        let size = match oc.as_ref().and_then(OutputConfig::size) {
            Some(size) => {
                backend.set_output_resolution(handle, size);
                size
            }
            None => reported,
        };

        let (x, y) = match oc.as_ref().and_then(OutputConfig::position) {
            Some((x, y)) => {
                debug!("Set {:?} position to {x}, {y}", name);
                (x, y)
            }
            None => {
                let x = self
                    .outputs()
                    .filter_map(|o| self.get(o))
                    .map(|c| c.rect.max_x())
                    .fold(0, i32::max);
                (x, 0)
            }
        };

        let mut con = Con::new(ConKind::Output { handle });
        con.name = name.clone();
        con.rect = Rect::new(x, y, size.width, size.height);
        con.gaps = self.config.gaps.outer + self.config.gaps.inner / 2;
        con.visible = true;
        let output = self.attach_back(self.root, con);

        let ws_name = name
            .as_deref()
            .and_then(|n| self.mapped_workspace_name(n))
            .unwrap_or_else(|| self.next_name());
        if let Err(e) = self.create_workspace(output, &ws_name) {
            warn!("Could not create default workspace for output: {e}");
        }
        self.sync_focus_flags();
        Some(output)
    }

    /// The workspace the configuration assigns to an output, unless its name is taken.
    fn mapped_workspace_name(&self, output_name: &str) -> Option<String> {
        let workspace = self.config.workspaces_for_output(output_name).next()?;
        debug!("Matched workspace to output: {workspace} for {output_name}");
        if self.workspace_by_name(workspace).is_some() {
            debug!("But it's already taken");
            return None;
        }
        debug!("So we're going to use it");
        Some(workspace.to_owned())
    }

    pub fn create_workspace(&mut self, output: NodeId, name: &str) -> Result<NodeId, LayoutError> {
        let oc = self.expect_kind(output, NodeType::Output, "workspace needs an output")?;
        debug!("Added workspace {name} for output {:?}", oc.output_handle());

        let mut con = Con::new(ConKind::Workspace { floating: Vec::new() }).with_name(name);
        con.layout = self.config.default_layout;
        con.rect = oc.rect;
        con.visible = true;
        let workspace = self.attach_back(output, con);
        self.sync_focus_flags();
        Ok(workspace)
    }

    /// Puts a new container with `layout` in place of `target`.
    ///
    /// A workspace keeps its place and hands all of its children to the new
    /// container, which becomes its only child. Wrapping a workspace with no
    /// tiled children leaves an empty container that is not collapsed;
    /// callers wanting only a layout change use `set_layout` instead.
    pub fn wrap_in_container(&mut self, target: NodeId, layout: Layout) -> Result<NodeId, LayoutError> {
        let con = self.get(target).ok_or(LayoutError::InvalidParent("no such node"))?;
        if con.is_floating || target.is_floating_member(&self.tree.map) {
            return Err(LayoutError::InvalidParent(
                "cannot create container around floating window",
            ));
        }
        if matches!(con.node_type(), NodeType::Root | NodeType::Output) {
            return Err(LayoutError::InvalidParent(
                "cannot create container around root or output",
            ));
        }

        let mut cont = Con::new(ConKind::Container);
        cont.layout = layout;
        cont.rect = con.rect;
        cont.visible = con.visible;
        debug!(?target, %layout, "creating container around node");

        let node = if con.is(NodeType::Workspace) {
            self.wrap_workspace(target, cont)
        } else {
            self.wrap_node(target, cont)?
        };
        self.sync_focus_flags();
        Ok(node)
    }

    fn wrap_workspace(&mut self, workspace: NodeId, mut cont: Con) -> NodeId {
        let old_focus = self.focused(workspace);
        let floating_focused = old_focus.is_some_and(|f| f.is_floating_member(&self.tree.map));

        if let Some(ws) = self.get_mut(workspace) {
            std::mem::swap(&mut ws.layout, &mut cont.layout);
        }

        let children: Vec<NodeId> = self.children(workspace).collect();
        let node = self.tree.mk_node().into_id();
        self.tree.data.cons.insert(node, cont);
        for child in children {
            child.detach(&mut self.tree).push_back(node);
        }
        node.detach(&mut self.tree).push_back(workspace);

        let inner = match old_focus {
            Some(f) if !floating_focused => Some(f),
            _ => node.first_child(&self.tree.map),
        };
        let selection = &mut self.tree.data.selection;
        selection.set_focused(node, inner);
        selection.set_focused(workspace, if floating_focused { old_focus } else { Some(node) });
        node
    }

    fn wrap_node(&mut self, target: NodeId, cont: Con) -> Result<NodeId, LayoutError> {
        let parent = self.parent(target).ok_or(LayoutError::InvalidParent("node has no parent"))?;
        let parent_focused = self.focused(parent) == Some(target);

        let node = self.tree.mk_node().insert_before(target);
        self.tree.data.cons.insert(node, cont);
        target.detach(&mut self.tree).push_back(node);

        let selection = &mut self.tree.data.selection;
        selection.set_focused(node, Some(target));
        if parent_focused {
            selection.set_focused(parent, Some(node));
        }
        Ok(node)
    }

    /// Adds a tiled view for `handle` next to `anchor`, or as the last child
    /// when `anchor` is a workspace. The new view takes focus within its
    /// workspace.
    pub fn create_view(
        &mut self,
        backend: &mut dyn Backend,
        anchor: NodeId,
        handle: ViewHandle,
    ) -> Result<NodeId, LayoutError> {
        let anchor_con = self.get(anchor).ok_or(LayoutError::InvalidParent("no such anchor"))?;
        let anchor_type = anchor_con.node_type();
        if matches!(anchor_type, NodeType::Root | NodeType::Output) {
            return Err(LayoutError::InvalidParent("views belong inside a workspace"));
        }
        if anchor.is_floating_member(&self.tree.map) {
            return Err(LayoutError::InvalidParent("cannot tile next to a floating view"));
        }
        let workspace = self
            .active_workspace_for(anchor)
            .ok_or(LayoutError::InvalidParent("anchor is not inside a workspace"))?;

        let title = backend.view_title(handle);
        let geometry = backend.view_geometry(handle);
        debug!(%handle, ?title, ?anchor, %anchor_type, "Adding new view");

        let mut con = Con::new(ConKind::View { handle, desired: geometry.size() });
        con.name = title;
        con.visible = true;
        con.is_focused = true;
        con.gaps = self.config.gaps.inner;

        let view = if anchor_type == NodeType::Workspace {
            self.tree.mk_node().push_back(anchor)
        } else {
            self.tree.mk_node().insert_after(anchor)
        };
        self.tree.data.cons.insert(view, con);
        self.tree.data.selection.focus_up_to(&self.tree.map, view, workspace);
        self.sync_focus_flags();
        Ok(view)
    }

    /// Adds a floating view to the active workspace, centered at its requested size.
    pub fn create_floating_view(
        &mut self,
        backend: &mut dyn Backend,
        handle: ViewHandle,
    ) -> Result<NodeId, LayoutError> {
        let workspace = self
            .active_workspace()
            .ok_or(LayoutError::InvalidParent("no active workspace"))?;
        let area = self.get(workspace).map(|c| c.rect).unwrap_or_default();

        let title = backend.view_title(handle);
        let size = backend.view_geometry(handle).size();
        debug!(%handle, ?title, "Adding new view as a floating view");

        let mut con = Con::new(ConKind::View { handle, desired: size });
        con.name = title;
        con.visible = true;
        con.is_floating = true;
        con.rect = area.centered(size);

        let view = self.tree.mk_node().float_under(workspace);
        self.tree.data.cons.insert(view, con);
        if let Some(floating) = self.get_mut(workspace).and_then(Con::floating_mut) {
            floating.push(view);
        }
        if self.focused(workspace).is_none() {
            self.tree.data.selection.set_focused(workspace, Some(view));
        }
        self.sync_focus_flags();
        Ok(view)
    }

    /// Removes an output and everything under it.
    ///
    /// Workspaces that still hold views move to the active surviving output,
    /// hidden; empty ones go away with the output. Returns the root.
    pub fn destroy_output(
        &mut self,
        backend: &mut dyn Backend,
        output: NodeId,
    ) -> Result<NodeId, LayoutError> {
        let con = self.expect_kind(output, NodeType::Output, "not an output")?;
        debug!(handle = ?con.output_handle(), "OUTPUT: Destroying output");

        let was_active = self.active_output() == Some(output);
        let survivor = self
            .active_output()
            .filter(|&o| o != output)
            .or_else(|| self.outputs().find(|&o| o != output));

        if let Some(survivor) = survivor {
            let area = self.get(survivor).map(|c| c.rect).unwrap_or_default();
            let workspaces: Vec<NodeId> = self.children(output).collect();
            for ws in workspaces {
                if self.is_workspace_empty(ws) {
                    continue;
                }
                info!(workspace = ?self.get(ws).and_then(|c| c.name.as_deref()), "Moving workspace to surviving output");
                ws.detach(&mut self.tree).push_back(survivor);
                if let Some(con) = self.get_mut(ws) {
                    con.rect = area;
                }
                self.apply_visibility(backend, ws, false);
            }
        }

        self.unlink(output);
        self.release(output);

        if was_active && let Some(ws) = self.active_workspace() {
            self.update_visibility(backend, ws);
        }
        self.sync_focus_flags();
        Ok(self.root)
    }

    /// Removes an empty workspace that is not the last one on its output.
    /// Returns the output it belonged to.
    pub fn destroy_workspace(&mut self, workspace: NodeId) -> Result<NodeId, LayoutError> {
        let con = self.expect_kind(workspace, NodeType::Workspace, "not a workspace")?;
        let name = con.name.clone();
        let output = self.parent_by_type(workspace, NodeType::Output);
        if let Some(output) = output
            && output.child_count(&self.tree.map) == 1
        {
            return Err(LayoutError::StructuralRefusal("last workspace on its output"));
        }
        if !self.is_workspace_empty(workspace) {
            return Err(LayoutError::StructuralRefusal("workspace is not empty"));
        }

        debug!(?name, "Destroying workspace");
        let parent = self.unlink(workspace);
        self.release(workspace);
        self.sync_focus_flags();
        parent.ok_or(LayoutError::InvalidParent("workspace was not attached"))
    }

    /// Collapses `container` and every ancestor container that is left empty.
    /// Returns the first ancestor that survives.
    pub fn destroy_container(&mut self, container: NodeId) -> Result<NodeId, LayoutError> {
        if self.get(container).is_none() {
            return Err(LayoutError::InvalidParent("no such container"));
        }
        let mut node = container;
        while self.get(node).is_some_and(|c| c.is(NodeType::Container))
            && node.is_empty(&self.tree.map)
        {
            debug!(?node, "Container: Destroying container");
            let Some(parent) = self.unlink(node) else {
                break;
            };
            self.release(node);
            node = parent;
        }
        self.sync_focus_flags();
        Ok(node)
    }

    /// Removes a view, then collapses its parent container if it became empty.
    pub fn destroy_view(&mut self, view: NodeId) -> Result<NodeId, LayoutError> {
        self.expect_kind(view, NodeType::View, "not a view")?;
        debug!(?view, "Destroying view");
        let parent = self
            .unlink(view)
            .ok_or(LayoutError::InvalidParent("view was not attached"))?;
        self.release(view);

        if self.get(parent).is_some_and(|c| c.is(NodeType::Container)) {
            return self.destroy_container(parent);
        }
        self.sync_focus_flags();
        Ok(parent)
    }

    /// First destroy phase: takes `node` out of its parent and redirects
    /// focus away from it. Returns the former parent.
    fn unlink(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        if node.is_floating_member(&self.tree.map)
            && let Some(floating) = self.get_mut(parent).and_then(Con::floating_mut)
        {
            floating.retain(|&n| n != node);
        }
        let _ = node.detach(&mut self.tree).unlink();
        self.repair_focus(parent);
        Some(parent)
    }

    /// A workspace that lost its focused child falls back to its first child,
    /// then to the topmost floating view.
    fn repair_focus(&mut self, parent: NodeId) {
        if self.focused(parent).is_some()
            || !self.get(parent).is_some_and(|c| c.is(NodeType::Workspace))
        {
            return;
        }
        let fallback = parent
            .first_child(&self.tree.map)
            .or_else(|| self.floating(parent).last().copied());
        self.tree.data.selection.set_focused(parent, fallback);
    }

    /// Second destroy phase: frees an unlinked node and its whole subtree.
    fn release(&mut self, node: NodeId) {
        let mut members = self.floating(node).to_vec();
        members.extend(node.children(&self.tree.map));
        for member in members {
            let member = member.detach(&mut self.tree).unlink();
            self.release(member);
        }
        trace!(?node, "released node");
        self.tree.free(node);
    }

    /// Gives focus to `node` by pointing each of its ancestors down the path
    /// to it. Visibility follows when the active workspace changes.
    pub fn set_focused(&mut self, backend: &mut dyn Backend, node: NodeId) -> Result<(), LayoutError> {
        if self.get(node).is_none() {
            return Err(LayoutError::InvalidParent("no such node"));
        }
        let old_workspace = self.active_workspace();
        self.tree.data.selection.focus(&self.tree.map, node);
        let new_workspace = self.active_workspace();
        self.sync_focus_flags();

        if old_workspace != new_workspace {
            if let Some(ws) = old_workspace.filter(|&ws| self.get(ws).is_some()) {
                self.update_visibility(backend, ws);
            }
            if let Some(ws) = new_workspace {
                self.update_visibility(backend, ws);
            }
        }
        Ok(())
    }

    /// Marks each node whose parent's focus pointer refers to it.
    fn sync_focus_flags(&mut self) {
        let order = self.map_order(self.root);
        let Tree { map, data } = &mut self.tree;
        for node in order {
            let focused = node.parent(map).is_some_and(|p| data.selection.focused(p) == Some(node));
            if let Some(con) = data.cons.get_mut(node) {
                con.is_focused = focused;
            }
        }
    }

    pub fn active_output(&self) -> Option<NodeId> { self.focused(self.root) }

    pub fn active_workspace(&self) -> Option<NodeId> {
        self.active_output().and_then(|output| self.focused(output))
    }

    /// The view at the end of the focus chain of the active workspace.
    pub fn active_view(&self) -> Option<NodeId> {
        let workspace = self.active_workspace()?;
        let leaf = self.tree.data.selection.focus_leaf(workspace);
        self.get(leaf).filter(|c| c.is(NodeType::View)).map(|_| leaf)
    }

    /// The last node on the focus chain from the root.
    pub fn focused_leaf(&self) -> NodeId { self.tree.data.selection.focus_leaf(self.root) }

    /// Changes the layout of a workspace or container.
    pub fn set_layout(&mut self, node: NodeId, layout: Layout) -> Result<(), LayoutError> {
        let con = self.get_mut(node).ok_or(LayoutError::InvalidParent("no such node"))?;
        if !matches!(con.node_type(), NodeType::Workspace | NodeType::Container) {
            return Err(LayoutError::InvalidParent("only workspaces and containers have a layout"));
        }
        debug!(?node, %layout, "Changing layout");
        con.layout = layout;
        Ok(())
    }

    /// The workspace that owns `node`. For the root and outputs, this is the
    /// workspace they currently focus.
    pub fn active_workspace_for(&self, node: NodeId) -> Option<NodeId> {
        match self.get(node)?.node_type() {
            NodeType::Root => self.focused(node).and_then(|output| self.focused(output)),
            NodeType::Output => self.focused(node),
            NodeType::Workspace => Some(node),
            NodeType::Container | NodeType::View => {
                self.parent_by_type(node, NodeType::Workspace)
            }
        }
    }

    /// Depth-first search below `start` for the first node passing `test`.
    ///
    /// At a workspace the floating set is checked before the tiled children.
    pub fn find(&self, start: NodeId, test: impl Fn(NodeId, &Con) -> bool) -> Option<NodeId> {
        self.find_inner(start, &test)
    }

    fn find_inner(&self, node: NodeId, test: &dyn Fn(NodeId, &Con) -> bool) -> Option<NodeId> {
        let passes = |n: NodeId| self.get(n).is_some_and(|c| test(n, c));
        if let Some(&member) = self.floating(node).iter().find(|&&m| passes(m)) {
            return Some(member);
        }
        for child in self.children(node) {
            if passes(child) {
                return Some(child);
            }
            if let Some(found) = self.find_inner(child, test) {
                return Some(found);
            }
        }
        None
    }

    /// Nearest strict ancestor of the given kind.
    pub fn parent_by_type(&self, node: NodeId, ty: NodeType) -> Option<NodeId> {
        node.ancestors(&self.tree.map)
            .skip(1)
            .find(|&a| self.get(a).is_some_and(|c| c.is(ty)))
    }

    /// Nearest strict ancestor with the given layout.
    pub fn parent_by_layout(&self, node: NodeId, layout: Layout) -> Option<NodeId> {
        node.ancestors(&self.tree.map)
            .skip(1)
            .find(|&a| self.get(a).is_some_and(|c| c.layout == layout))
    }

    /// First node of the given kind along the focus chain below `node`.
    pub fn focus_by_type(&self, node: NodeId, ty: NodeType) -> Option<NodeId> {
        self.tree
            .data
            .selection
            .chain(node)
            .find(|&n| self.get(n).is_some_and(|c| c.is(ty)))
    }

    /// First node with the given layout along the focus chain below `node`.
    pub fn focus_by_layout(&self, node: NodeId, layout: Layout) -> Option<NodeId> {
        self.tree
            .data
            .selection
            .chain(node)
            .find(|&n| self.get(n).is_some_and(|c| c.layout == layout))
    }

    pub fn by_handle(&self, handle: ViewHandle) -> Option<NodeId> {
        self.find(self.root, |_, c| c.view_handle() == Some(handle))
    }

    pub fn output_by_handle(&self, handle: OutputHandle) -> Option<NodeId> {
        self.outputs().find(|&o| self.get(o).and_then(Con::output_handle) == Some(handle))
    }

    /// Every node below `node`: tiled children depth-first, then the floating set.
    pub(super) fn map_order(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_map_order(node, &mut out);
        out
    }

    fn collect_map_order(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node) {
            out.push(child);
            self.collect_map_order(child, out);
        }
        for &member in self.floating(node) {
            out.push(member);
            self.collect_map_order(member, out);
        }
    }

    /// Calls `f` on every node below `node`, floating members included.
    pub fn container_map(&mut self, node: NodeId, mut f: impl FnMut(NodeId, &mut Con)) {
        for n in self.map_order(node) {
            if let Some(con) = self.tree.data.cons.get_mut(n) {
                f(n, con);
            }
        }
    }

    pub fn is_fullscreen(&self, backend: &dyn Backend, view: NodeId) -> bool {
        self.view_state(backend, view).contains(ViewState::FULLSCREEN)
    }

    pub fn is_active(&self, backend: &dyn Backend, view: NodeId) -> bool {
        self.view_state(backend, view).contains(ViewState::ACTIVATED)
    }

    fn view_state(&self, backend: &dyn Backend, view: NodeId) -> ViewState {
        self.get(view)
            .and_then(Con::view_handle)
            .map(|h| backend.view_state(h))
            .unwrap_or_default()
    }

    pub fn draw_tree(&self) -> String {
        let tree = self.get_ascii_tree(self.root);
        let mut out = String::new();
        if ascii_tree::write_tree(&mut out, &tree).is_err() {
            return String::new();
        }
        out
    }

    fn get_ascii_tree(&self, node: NodeId) -> ascii_tree::Tree {
        let status = match self.parent(node) {
            None => "",
            Some(parent) if self.focused(parent) == Some(node) => "☒ ",
            _ => "☐ ",
        };
        let desc = match self.get(node) {
            Some(con) => {
                let mut desc = format!("{status}{} {node:?}", con.node_type());
                if let Some(name) = &con.name {
                    desc.push_str(&format!(" {name:?}"));
                }
                if con.layout != Layout::None {
                    desc.push_str(&format!(" [{}]", con.layout));
                }
                if con.is_floating {
                    desc.push_str(" (floating)");
                }
                if !con.visible {
                    desc.push_str(" (hidden)");
                }
                desc
            }
            None => format!("{status}{node:?}"),
        };
        let children: Vec<_> = self
            .children(node)
            .chain(self.floating(node).iter().copied())
            .map(|c| self.get_ascii_tree(c))
            .collect();
        if children.is_empty() {
            ascii_tree::Tree::Leaf(vec![desc])
        } else {
            ascii_tree::Tree::Node(desc, children)
        }
    }

    pub fn debug_tree(&self, desc: &str) {
        debug!("Tree {desc}\n{}", self.draw_tree().trim());
    }
}
