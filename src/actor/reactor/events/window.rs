use tracing::{debug, warn};

use crate::actor::reactor::Reactor;
use crate::layout_engine::LayoutError;
use crate::sys::backend::{Backend, ViewHandle};

pub struct WindowEventHandler;

impl WindowEventHandler {
    /// Places a newly mapped view and gives it focus.
    pub fn handle_view_created<B: Backend>(
        reactor: &mut Reactor<B>,
        handle: ViewHandle,
        floating: bool,
    ) {
        if reactor.layout_engine.by_handle(handle).is_some() {
            debug!(%handle, "View is already managed");
            return;
        }
        let anchor = reactor.tiling_anchor();
        let engine = &mut reactor.layout_engine;
        let backend = &mut reactor.backend;

        let created = if floating {
            engine.create_floating_view(backend, handle)
        } else {
            anchor
                .ok_or(LayoutError::InvalidParent("no active workspace"))
                .and_then(|anchor| engine.create_view(backend, anchor, handle))
        };
        let view = match created {
            Ok(view) => view,
            Err(e) => {
                warn!(%handle, "Could not manage view: {e}");
                return;
            }
        };

        engine.set_view_visibility(backend, view, true);
        if let Err(e) = engine.set_focused(backend, view) {
            warn!(%handle, "Could not focus new view: {e}");
        }
    }

    pub fn handle_view_destroyed<B: Backend>(reactor: &mut Reactor<B>, handle: ViewHandle) {
        let Some(view) = reactor.layout_engine.by_handle(handle) else {
            debug!(%handle, "Destroyed view was not managed");
            return;
        };
        if let Err(e) = reactor.layout_engine.destroy_view(view) {
            warn!(%handle, "Could not destroy view: {e}");
        }
    }

    pub fn handle_view_focused<B: Backend>(reactor: &mut Reactor<B>, handle: ViewHandle) {
        let Some(view) = reactor.layout_engine.by_handle(handle) else {
            debug!(%handle, "Focused view is not managed");
            return;
        };
        if let Err(e) = reactor.layout_engine.set_focused(&mut reactor.backend, view) {
            warn!(%handle, "Could not focus view: {e}");
        }
    }
}
