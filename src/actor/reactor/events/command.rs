use std::str::FromStr;

use tracing::{info, warn};

use crate::actor::reactor::{Reactor, ReactorError};
use crate::common::config::Config;
use crate::ipc::protocol::CommandOutcome;
use crate::model::container::{Layout, NodeType};
use crate::sys::backend::Backend;

/// A command accepted by `RUN_COMMAND`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Workspace(String),
    /// Wrap the focused node in a new container with this layout.
    Split(Layout),
    /// Change the layout of the focused node's parent.
    Layout(Layout),
    Reload,
}

fn split_direction(arg: &str) -> Option<Layout> {
    match arg.to_ascii_lowercase().as_str() {
        "h" | "horizontal" => Some(Layout::Horizontal),
        "v" | "vertical" => Some(Layout::Vertical),
        _ => None,
    }
}

fn layout_name(arg: &str) -> Option<Layout> {
    match arg.to_ascii_lowercase().as_str() {
        "splith" => Some(Layout::Horizontal),
        "splitv" => Some(Layout::Vertical),
        "stacking" => Some(Layout::Stacked),
        "tabbed" => Some(Layout::Tabbed),
        _ => None,
    }
}

impl FromStr for Command {
    type Err = ReactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        match (verb.as_str(), args.as_slice()) {
            ("workspace", []) => Err(ReactorError::InvalidArgument {
                command: "workspace",
                expected: "a workspace name",
            }),
            ("workspace", name) => Ok(Command::Workspace(name.join(" "))),
            ("split", [dir]) => split_direction(dir).map(Command::Split).ok_or(
                ReactorError::InvalidArgument {
                    command: "split",
                    expected: "h, v, horizontal or vertical",
                },
            ),
            ("split", _) => Err(ReactorError::InvalidArgument {
                command: "split",
                expected: "one direction",
            }),
            ("splith", []) => Ok(Command::Split(Layout::Horizontal)),
            ("splitv", []) => Ok(Command::Split(Layout::Vertical)),
            ("layout", [name]) => layout_name(name).map(Command::Layout).ok_or(
                ReactorError::InvalidArgument {
                    command: "layout",
                    expected: "splith, splitv, stacking or tabbed",
                },
            ),
            ("layout", _) => Err(ReactorError::InvalidArgument {
                command: "layout",
                expected: "one layout name",
            }),
            ("reload", []) => Ok(Command::Reload),
            _ => Err(ReactorError::UnknownCommand(s.trim().to_string())),
        }
    }
}

/// Splits a `RUN_COMMAND` payload into its individual commands.
pub fn split_commands(payload: &str) -> impl Iterator<Item = &str> {
    payload.split([';', ',', '\n']).map(str::trim).filter(|c| !c.is_empty())
}

pub struct CommandEventHandler;

impl CommandEventHandler {
    /// Runs every command in `payload` in order. One outcome per command.
    pub fn handle_run_command<B: Backend>(
        reactor: &mut Reactor<B>,
        payload: &str,
    ) -> Vec<CommandOutcome> {
        let outcomes: Vec<CommandOutcome> = split_commands(payload)
            .map(|text| {
                match text.parse::<Command>().and_then(|cmd| Self::handle_command(reactor, cmd)) {
                    Ok(()) => CommandOutcome::ok(),
                    Err(e) => {
                        warn!(command = text, "Command failed: {e}");
                        CommandOutcome::failed(e.to_string())
                    }
                }
            })
            .collect();
        if outcomes.is_empty() {
            return vec![CommandOutcome::failed("no command given")];
        }
        outcomes
    }

    pub fn handle_command<B: Backend>(
        reactor: &mut Reactor<B>,
        cmd: Command,
    ) -> Result<(), ReactorError> {
        info!(?cmd);
        match cmd {
            Command::Workspace(name) => {
                reactor.layout_engine.switch_to_workspace(&mut reactor.backend, &name)?;
            }
            Command::Split(layout) => {
                let anchor = reactor.tiling_anchor().ok_or(ReactorError::NoActiveWorkspace)?;
                let engine = &mut reactor.layout_engine;
                if engine.node_type(anchor) == Some(NodeType::Workspace) {
                    // Nothing tiled to wrap yet.
                    engine.set_layout(anchor, layout)?;
                } else {
                    engine.wrap_in_container(anchor, layout)?;
                }
            }
            Command::Layout(layout) => {
                let anchor = reactor.tiling_anchor().ok_or(ReactorError::NoActiveWorkspace)?;
                let engine = &mut reactor.layout_engine;
                let target = match engine.node_type(anchor) {
                    Some(NodeType::Workspace) => anchor,
                    _ => engine.parent(anchor).ok_or(ReactorError::NoActiveWorkspace)?,
                };
                engine.set_layout(target, layout)?;
            }
            Command::Reload => {
                let path = reactor.config_path();
                let config = Config::read_or_default(&path)
                    .map_err(|e| ReactorError::Config(format!("{}: {e}", path.display())))?;
                let issues = config.validate();
                if !issues.is_empty() {
                    return Err(ReactorError::Config(issues.join("; ")));
                }
                info!(path = %path.display(), "Reloaded config");
                reactor.layout_engine.set_config(config);
            }
        }
        Ok(())
    }
}
