//! The display/compositor backend as seen from the tree.
//!
//! The backend reports outputs and windows and accepts visibility, stacking
//! and resolution commands. [`HeadlessBackend`] keeps everything in memory and
//! records the commands it receives.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::common::collections::HashMap;
use crate::sys::geometry::{Rect, Size};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewHandle(pub u64);

impl fmt::Display for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl fmt::Display for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

bitflags! {
    /// Input/compositing mask applied to a view.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ViewMask: u32 {
        const VISIBLE = 1;
    }
}

bitflags! {
    /// State bits the backend reports for a view.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ViewState: u32 {
        const MAXIMIZED = 1;
        const FULLSCREEN = 1 << 1;
        const RESIZING = 1 << 2;
        const MOVING = 1 << 3;
        const ACTIVATED = 1 << 4;
    }
}

pub trait Backend {
    fn output_name(&self, output: OutputHandle) -> Option<String>;
    fn output_resolution(&self, output: OutputHandle) -> Size;
    fn set_output_resolution(&mut self, output: OutputHandle, size: Size);

    fn view_title(&self, view: ViewHandle) -> Option<String>;
    /// Geometry the client asked for when it mapped the window.
    fn view_geometry(&self, view: ViewHandle) -> Rect;
    fn view_state(&self, view: ViewHandle) -> ViewState;

    fn set_view_output(&mut self, view: ViewHandle, output: OutputHandle);
    fn set_view_mask(&mut self, view: ViewHandle, mask: ViewMask);
    fn bring_view_to_front(&mut self, view: ViewHandle);
    fn send_view_to_back(&mut self, view: ViewHandle);
}

/// A command the tree issued to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendCommand {
    SetOutputResolution(OutputHandle, Size),
    SetViewOutput(ViewHandle, OutputHandle),
    SetViewMask(ViewHandle, ViewMask),
    BringToFront(ViewHandle),
    SendToBack(ViewHandle),
}

impl BackendCommand {
    pub fn is_stacking(&self) -> bool {
        matches!(self, BackendCommand::BringToFront(_) | BackendCommand::SendToBack(_))
    }
}

#[derive(Clone, Debug)]
struct HeadlessOutput {
    name: Option<String>,
    resolution: Size,
}

#[derive(Clone, Debug)]
struct HeadlessView {
    title: Option<String>,
    geometry: Rect,
    state: ViewState,
    output: Option<OutputHandle>,
    mask: ViewMask,
}

/// In-memory backend without any real display behind it.
#[derive(Default, Debug)]
pub struct HeadlessBackend {
    outputs: HashMap<OutputHandle, HeadlessOutput>,
    views: HashMap<ViewHandle, HeadlessView>,
    /// Bottom to top.
    stacking: Vec<ViewHandle>,
    commands: Vec<BackendCommand>,
}

impl HeadlessBackend {
    pub fn new() -> Self { Self::default() }

    pub fn add_output(&mut self, output: OutputHandle, name: Option<&str>, resolution: Size) {
        self.outputs.insert(output, HeadlessOutput {
            name: name.map(str::to_owned),
            resolution,
        });
    }

    pub fn remove_output(&mut self, output: OutputHandle) { self.outputs.remove(&output); }

    pub fn add_view(&mut self, view: ViewHandle, title: Option<&str>, geometry: Rect) {
        self.views.insert(view, HeadlessView {
            title: title.map(str::to_owned),
            geometry,
            state: ViewState::empty(),
            output: None,
            mask: ViewMask::empty(),
        });
        self.stacking.push(view);
    }

    pub fn remove_view(&mut self, view: ViewHandle) {
        self.views.remove(&view);
        self.stacking.retain(|v| *v != view);
    }

    pub fn set_view_state(&mut self, view: ViewHandle, state: ViewState) {
        if let Some(v) = self.views.get_mut(&view) {
            v.state = state;
        }
    }

    pub fn view_mask(&self, view: ViewHandle) -> Option<ViewMask> {
        self.views.get(&view).map(|v| v.mask)
    }

    pub fn view_output(&self, view: ViewHandle) -> Option<OutputHandle> {
        self.views.get(&view).and_then(|v| v.output)
    }

    pub fn stacking_order(&self) -> &[ViewHandle] { &self.stacking }

    pub fn commands(&self) -> &[BackendCommand] { &self.commands }

    pub fn take_commands(&mut self) -> Vec<BackendCommand> { std::mem::take(&mut self.commands) }

    fn record(&mut self, command: BackendCommand) {
        trace!(?command, "backend command");
        self.commands.push(command);
    }
}

impl Backend for HeadlessBackend {
    fn output_name(&self, output: OutputHandle) -> Option<String> {
        self.outputs.get(&output).and_then(|o| o.name.clone())
    }

    fn output_resolution(&self, output: OutputHandle) -> Size {
        self.outputs.get(&output).map(|o| o.resolution).unwrap_or_default()
    }

    fn set_output_resolution(&mut self, output: OutputHandle, size: Size) {
        if let Some(o) = self.outputs.get_mut(&output) {
            o.resolution = size;
        }
        self.record(BackendCommand::SetOutputResolution(output, size));
    }

    fn view_title(&self, view: ViewHandle) -> Option<String> {
        self.views.get(&view).and_then(|v| v.title.clone())
    }

    fn view_geometry(&self, view: ViewHandle) -> Rect {
        self.views.get(&view).map(|v| v.geometry).unwrap_or_default()
    }

    fn view_state(&self, view: ViewHandle) -> ViewState {
        self.views.get(&view).map(|v| v.state).unwrap_or_default()
    }

    fn set_view_output(&mut self, view: ViewHandle, output: OutputHandle) {
        if let Some(v) = self.views.get_mut(&view) {
            v.output = Some(output);
        }
        self.record(BackendCommand::SetViewOutput(view, output));
    }

    fn set_view_mask(&mut self, view: ViewHandle, mask: ViewMask) {
        if let Some(v) = self.views.get_mut(&view) {
            v.mask = mask;
        }
        self.record(BackendCommand::SetViewMask(view, mask));
    }

    fn bring_view_to_front(&mut self, view: ViewHandle) {
        if self.views.contains_key(&view) {
            self.stacking.retain(|v| *v != view);
            self.stacking.push(view);
        }
        self.record(BackendCommand::BringToFront(view));
    }

    fn send_view_to_back(&mut self, view: ViewHandle) {
        if self.views.contains_key(&view) {
            self.stacking.retain(|v| *v != view);
            self.stacking.insert(0, view);
        }
        self.record(BackendCommand::SendToBack(view));
    }
}
