//! Shapes of the data handed out over IPC.

use serde::{Deserialize, Serialize};

use crate::model::container::{Layout, NodeType};
use crate::sys::geometry::Rect;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceData {
    /// Leading number of the name, or -1 when it does not start with one.
    pub num: i32,
    pub name: String,
    pub visible: bool,
    pub focused: bool,
    pub urgent: bool,
    pub output: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputData {
    pub name: String,
    pub active: bool,
    pub current_workspace: Option<String>,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeData {
    pub id: u64,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: Option<String>,
    pub layout: Layout,
    pub rect: Rect,
    pub focused: bool,
    pub visible: bool,
    pub nodes: Vec<TreeData>,
    pub floating_nodes: Vec<TreeData>,
}

/// The number a workspace name starts with, as used for ordering by status bars.
pub fn workspace_number(name: &str) -> i32 {
    let digits: &str = name
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(name, |(i, _)| &name[..i]);
    digits.parse().unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_numbers() {
        assert_eq!(3, workspace_number("3"));
        assert_eq!(10, workspace_number("10:web"));
        assert_eq!(-1, workspace_number("web"));
        assert_eq!(-1, workspace_number(""));
    }

    #[test]
    fn tree_node_type_is_serialized_as_type() {
        let node = TreeData {
            id: 1,
            node_type: NodeType::Workspace,
            name: Some("1".into()),
            layout: Layout::Horizontal,
            rect: Rect::default(),
            focused: false,
            visible: true,
            nodes: vec![],
            floating_nodes: vec![],
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!("workspace", value["type"]);
        assert_eq!("horizontal", value["layout"]);
        assert!(value["nodes"].as_array().unwrap().is_empty());
    }
}
