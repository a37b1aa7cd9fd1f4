use tracing::{debug, info};

use super::{LayoutEngine, LayoutError};
use crate::model::container::NodeType;
use crate::model::tree::NodeId;
use crate::sys::backend::Backend;

impl LayoutEngine {
    /// Looks a workspace up by name anywhere in the tree, ignoring case.
    pub fn workspace_by_name(&self, name: &str) -> Option<NodeId> {
        self.find(self.root, |_, c| {
            c.is(NodeType::Workspace) && c.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }

    /// The smallest positive number not already used as a workspace name.
    pub fn next_name(&self) -> String {
        let taken: Vec<u32> = self
            .workspaces()
            .filter_map(|ws| self.get(ws)?.name.as_deref()?.parse().ok())
            .collect();
        let next = (1..).find(|n| !taken.contains(n)).unwrap_or(1);
        next.to_string()
    }

    /// Switches to the workspace called `name`, creating it on the active
    /// output if it does not exist yet. The workspace left behind is removed
    /// when it is empty.
    pub fn switch_to_workspace(
        &mut self,
        backend: &mut dyn Backend,
        name: &str,
    ) -> Result<NodeId, LayoutError> {
        let previous = self.active_workspace();
        let target = match self.workspace_by_name(name) {
            Some(ws) => ws,
            None => {
                let output = self
                    .active_output()
                    .ok_or(LayoutError::InvalidParent("no active output"))?;
                self.create_workspace(output, name)?
            }
        };
        if previous == Some(target) {
            return Ok(target);
        }
        info!(name, "Switching to workspace");

        self.set_focused(backend, target)?;

        if let Some(previous) = previous
            && self.is_workspace_empty(previous)
        {
            match self.destroy_workspace(previous) {
                Ok(output) => {
                    debug!("Destroyed empty workspace after switching away");
                    // The output now shows whichever sibling took over its focus.
                    if let Some(revealed) = self.focused(output) {
                        self.update_visibility(backend, revealed);
                    }
                }
                Err(e) => debug!("Keeping previous workspace: {e}"),
            }
        }
        Ok(target)
    }
}
