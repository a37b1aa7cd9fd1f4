//! Showing and hiding whole workspaces.

use tracing::debug;

use super::LayoutEngine;
use crate::model::container::{Con, NodeType};
use crate::model::tree::NodeId;
use crate::sys::backend::{Backend, ViewMask};

impl LayoutEngine {
    /// Recomputes the visibility of the workspace owning `node`.
    ///
    /// A workspace is visible when its output focuses it. Every node under it,
    /// floating ones included, takes on that value. Returns the value applied.
    pub fn update_visibility(&mut self, backend: &mut dyn Backend, node: NodeId) -> Option<bool> {
        let workspace = self.active_workspace_for(node)?;
        let output = self.parent(workspace)?;
        let visible = self.focused(output) == Some(workspace);
        debug!(?node, visible, "Setting visibility of container");
        self.apply_visibility(backend, workspace, visible);
        Some(visible)
    }

    pub(super) fn apply_visibility(
        &mut self,
        backend: &mut dyn Backend,
        workspace: NodeId,
        visible: bool,
    ) {
        for node in self.map_order(workspace) {
            self.set_view_visibility(backend, node, visible);
        }
    }

    /// Sets one node's `visible` flag. Views are also moved to their output,
    /// masked and restacked on the backend.
    pub fn set_view_visibility(&mut self, backend: &mut dyn Backend, node: NodeId, visible: bool) {
        let output = self
            .parent_by_type(node, NodeType::Output)
            .and_then(|o| self.get(o))
            .and_then(Con::output_handle);
        let Some(con) = self.get_mut(node) else {
            return;
        };
        if let Some(handle) = con.view_handle() {
            if let Some(output) = output {
                backend.set_view_output(handle, output);
            }
            backend.set_view_mask(handle, if visible { ViewMask::VISIBLE } else { ViewMask::empty() });
            if visible {
                backend.bring_view_to_front(handle);
            } else {
                backend.send_view_to_back(handle);
            }
        }
        con.visible = visible;
        debug!(
            ?node,
            "Container is now {}",
            if visible { "visible" } else { "invisible" }
        );
    }

    /// Resets outputs to the outer gap and views to the inner gap.
    pub fn reset_gaps(&mut self) {
        let gaps = self.config.gaps;
        self.container_map(self.root, |_, con| match con.node_type() {
            NodeType::Output => con.gaps = gaps.outer,
            NodeType::View => con.gaps = gaps.inner,
            _ => {}
        });
    }
}
