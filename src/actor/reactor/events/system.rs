use tracing::{debug, info, warn};

use crate::actor::reactor::Reactor;
use crate::common::config::Config;
use crate::sys::backend::{Backend, OutputHandle};

pub struct SystemEventHandler;

impl SystemEventHandler {
    pub fn handle_output_created<B: Backend>(reactor: &mut Reactor<B>, handle: OutputHandle) {
        if reactor.layout_engine.output_by_handle(handle).is_some() {
            debug!(%handle, "Output is already managed");
            return;
        }
        match reactor.layout_engine.create_output(&mut reactor.backend, handle) {
            Some(output) => debug!(%handle, ?output, "Output managed"),
            None => info!(%handle, "Output not managed"),
        }
    }

    pub fn handle_output_destroyed<B: Backend>(reactor: &mut Reactor<B>, handle: OutputHandle) {
        let Some(output) = reactor.layout_engine.output_by_handle(handle) else {
            debug!(%handle, "Destroyed output was not managed");
            return;
        };
        if let Err(e) = reactor.layout_engine.destroy_output(&mut reactor.backend, output) {
            warn!(%handle, "Could not destroy output: {e}");
        }
    }

    pub fn handle_config_updated<B: Backend>(reactor: &mut Reactor<B>, config: Config) {
        let issues = config.validate();
        if !issues.is_empty() {
            warn!("Ignoring invalid config: {}", issues.join("; "));
            return;
        }
        info!("Applying new config");
        reactor.layout_engine.set_config(config);
    }
}
