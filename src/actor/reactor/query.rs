use serde::Serialize;
use slotmap::Key;
use tracing::{error, warn};

use super::events::command::CommandEventHandler;
use crate::actor::reactor::Reactor;
use crate::ipc::protocol::{CommandOutcome, Message, MessageType, VersionReply};
use crate::model::container::NodeType;
use crate::model::server::{OutputData, TreeData, WorkspaceData, workspace_number};
use crate::model::tree::NodeId;
use crate::sys::backend::Backend;

fn to_payload<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|e| {
        error!("Failed to serialize IPC reply: {e}");
        br#"{"success":false,"error":"failed to serialize reply"}"#.to_vec()
    })
}

impl<B: Backend> Reactor<B> {
    /// Answers one IPC request. The reply always carries the request's type.
    pub(super) fn handle_ipc(&mut self, request: Message) -> Message {
        let payload = match request.message_type() {
            Ok(MessageType::RunCommand) => {
                let outcomes =
                    CommandEventHandler::handle_run_command(self, &request.payload_str());
                to_payload(&outcomes)
            }
            Ok(MessageType::GetWorkspaces) => to_payload(&self.handle_workspaces_query()),
            Ok(MessageType::GetOutputs) => to_payload(&self.handle_outputs_query()),
            Ok(MessageType::GetTree) => to_payload(&self.handle_tree_query()),
            Ok(MessageType::GetVersion) => to_payload(&VersionReply::current()),
            Err(e) => {
                warn!("Rejecting IPC request: {e}");
                to_payload(&CommandOutcome::failed(e.to_string()))
            }
        };
        Message { kind: request.kind, payload }
    }

    /// A workspace is visible when its output focuses it.
    fn is_workspace_visible(&self, workspace: NodeId) -> bool {
        let engine = &self.layout_engine;
        engine.parent(workspace).is_some_and(|o| engine.focused(o) == Some(workspace))
    }

    fn output_name(&self, output: NodeId) -> String {
        let con = self.layout_engine.get(output);
        match (con.and_then(|c| c.name.clone()), con.and_then(|c| c.output_handle())) {
            (Some(name), _) => name,
            (None, Some(handle)) => format!("output-{handle}"),
            (None, None) => String::new(),
        }
    }

    pub fn handle_workspaces_query(&self) -> Vec<WorkspaceData> {
        let engine = &self.layout_engine;
        let active = engine.active_workspace();
        let mut workspaces = Vec::new();
        for output in engine.outputs() {
            let output_name = self.output_name(output);
            for ws in engine.children(output) {
                let Some(con) = engine.get(ws) else { continue };
                let name = con.name_or_empty().to_string();
                workspaces.push(WorkspaceData {
                    num: workspace_number(&name),
                    name,
                    visible: self.is_workspace_visible(ws),
                    focused: active == Some(ws),
                    urgent: con.urgent,
                    output: output_name.clone(),
                    rect: con.rect,
                });
            }
        }
        workspaces
    }

    pub fn handle_outputs_query(&self) -> Vec<OutputData> {
        let engine = &self.layout_engine;
        engine
            .outputs()
            .filter_map(|output| {
                let con = engine.get(output)?;
                let current_workspace = engine
                    .focused(output)
                    .and_then(|ws| engine.get(ws))
                    .and_then(|c| c.name.clone());
                Some(OutputData {
                    name: self.output_name(output),
                    active: true,
                    current_workspace,
                    rect: con.rect,
                })
            })
            .collect()
    }

    pub fn handle_tree_query(&self) -> Option<TreeData> {
        let focused = self.layout_engine.focused_leaf();
        self.tree_data(self.layout_engine.root(), focused)
    }

    fn tree_data(&self, node: NodeId, focused: NodeId) -> Option<TreeData> {
        let engine = &self.layout_engine;
        let con = engine.get(node)?;
        let visible = match con.node_type() {
            NodeType::Workspace => self.is_workspace_visible(node),
            _ => con.visible,
        };
        Some(TreeData {
            id: node.data().as_ffi(),
            node_type: con.node_type(),
            name: con.name.clone(),
            layout: con.layout,
            rect: con.rect,
            focused: node == focused,
            visible,
            nodes: engine.children(node).filter_map(|c| self.tree_data(c, focused)).collect(),
            floating_nodes: engine
                .floating(node)
                .iter()
                .filter_map(|&c| self.tree_data(c, focused))
                .collect(),
        })
    }
}
