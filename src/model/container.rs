//! Per-node data for the container tree.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::model::tree::NodeId;
use crate::sys::backend::{OutputHandle, ViewHandle};
use crate::sys::geometry::{Rect, Size};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Layout {
    None,
    #[default]
    Horizontal,
    Vertical,
    Stacked,
    Tabbed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, IntoStaticStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeType {
    Root,
    Output,
    Workspace,
    Container,
    View,
}

/// Kind-specific payload of a node.
#[derive(Clone, Debug, PartialEq)]
pub enum ConKind {
    Root,
    Output {
        handle: OutputHandle,
    },
    Workspace {
        /// Floating members in stacking order. Each one is attached to the
        /// workspace in the tree but takes no slot among its children.
        floating: Vec<NodeId>,
    },
    Container,
    View {
        handle: ViewHandle,
        /// Size the client asked for before any layout was applied.
        desired: Size,
    },
}

impl ConKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            ConKind::Root => NodeType::Root,
            ConKind::Output { .. } => NodeType::Output,
            ConKind::Workspace { .. } => NodeType::Workspace,
            ConKind::Container => NodeType::Container,
            ConKind::View { .. } => NodeType::View,
        }
    }
}

/// A node of the container tree: root, output, workspace, split container or view.
#[derive(Clone, Debug, PartialEq)]
pub struct Con {
    pub kind: ConKind,
    pub name: Option<String>,
    pub rect: Rect,
    pub layout: Layout,
    pub gaps: i32,
    pub visible: bool,
    pub is_focused: bool,
    pub is_floating: bool,
    pub urgent: bool,
}

impl Con {
    pub fn new(kind: ConKind) -> Con {
        Con {
            kind,
            name: None,
            rect: Rect::default(),
            layout: Layout::None,
            gaps: 0,
            visible: false,
            is_focused: false,
            is_floating: false,
            urgent: false,
        }
    }

    pub fn root() -> Con { Con::new(ConKind::Root) }

    pub fn with_name(mut self, name: impl Into<String>) -> Con {
        self.name = Some(name.into());
        self
    }

    pub fn node_type(&self) -> NodeType { self.kind.node_type() }

    pub fn is(&self, ty: NodeType) -> bool { self.node_type() == ty }

    pub fn output_handle(&self) -> Option<OutputHandle> {
        match self.kind {
            ConKind::Output { handle } => Some(handle),
            _ => None,
        }
    }

    pub fn view_handle(&self) -> Option<ViewHandle> {
        match self.kind {
            ConKind::View { handle, .. } => Some(handle),
            _ => None,
        }
    }

    pub fn desired_size(&self) -> Option<Size> {
        match self.kind {
            ConKind::View { desired, .. } => Some(desired),
            _ => None,
        }
    }

    /// The floating set, for workspaces only.
    pub fn floating(&self) -> Option<&[NodeId]> {
        match &self.kind {
            ConKind::Workspace { floating } => Some(floating),
            _ => None,
        }
    }

    pub fn floating_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            ConKind::Workspace { floating } => Some(floating),
            _ => None,
        }
    }

    pub fn name_or_empty(&self) -> &str { self.name.as_deref().unwrap_or("") }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn layout_parses_case_insensitively() {
        assert_eq!(Ok(Layout::Tabbed), Layout::from_str("Tabbed"));
        assert_eq!(Ok(Layout::Vertical), Layout::from_str("vertical"));
        assert!(Layout::from_str("diagonal").is_err());
        assert_eq!("stacked", Layout::Stacked.to_string());
    }

    #[test]
    fn kind_specific_accessors() {
        let view = Con::new(ConKind::View {
            handle: ViewHandle(4),
            desired: Size::new(10, 20),
        });
        assert_eq!(Some(ViewHandle(4)), view.view_handle());
        assert_eq!(None, view.output_handle());
        assert_eq!(None, view.floating());
        assert_eq!(Some(Size::new(10, 20)), view.desired_size());

        let mut ws = Con::new(ConKind::Workspace { floating: vec![] }).with_name("1");
        assert_eq!(Some(&[][..]), ws.floating());
        assert!(ws.floating_mut().is_some());
        assert!(ws.is(NodeType::Workspace));
        assert_eq!("1", ws.name_or_empty());
        assert_eq!("workspace", <&str>::from(ws.node_type()));
    }
}
