use std::path::PathBuf;
use std::process;

use anyhow::{Context, anyhow};
use clap::Parser;
use serde_json::Value;
use spire_wm::ipc::client::{IpcClient, running_socket_path};
use spire_wm::ipc::protocol::MessageType;

#[derive(Parser)]
#[command(name = "spire-msg", version, about = "Send messages to a running spire instance")]
struct Cli {
    /// Socket to connect to instead of $SPIRESOCK.
    #[arg(short, long, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Message type, by name (get_tree) or number (4).
    #[arg(short = 't', long = "type", default_value = "run_command")]
    kind: String,

    /// Print the reply as received instead of pretty-printing it.
    #[arg(short, long)]
    raw: bool,

    /// Payload, joined with spaces.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    message: Vec<String>,
}

fn message_type(name: &str) -> Option<u32> {
    if let Ok(n) = name.parse::<u32>() {
        return Some(n);
    }
    match name.to_ascii_lowercase().as_str() {
        "command" => Some(MessageType::RunCommand.into()),
        other => other.parse::<MessageType>().ok().map(Into::into),
    }
}

/// Whether the reply reports a failed request or command.
fn reports_failure(reply: &Value) -> bool {
    let failed = |v: &Value| v.get("success") == Some(&Value::Bool(false));
    match reply {
        Value::Array(items) => items.iter().any(failed),
        other => failed(other),
    }
}

fn run(opt: Cli) -> anyhow::Result<bool> {
    let kind = message_type(&opt.kind).ok_or_else(|| anyhow!("unknown message type {:?}", opt.kind))?;
    let path = match opt.socket {
        Some(path) => path,
        None => running_socket_path().context("is spire running?")?,
    };

    let mut client = IpcClient::connect(&path)
        .with_context(|| format!("failed to connect to {}", path.display()))?;
    let payload = opt.message.join(" ");
    let reply = client.request(kind, payload.as_bytes())?;

    let value: Value = serde_json::from_slice(&reply.payload).context("malformed reply")?;
    if opt.raw {
        println!("{}", reply.payload_str());
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(!reports_failure(&value))
}

fn main() {
    sigpipe::reset();
    match run(Cli::parse()) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("spire-msg: request failed");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("spire-msg: {e:#}");
            process::exit(1);
        }
    }
}
