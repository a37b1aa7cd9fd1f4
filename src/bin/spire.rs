use std::path::PathBuf;
use std::process;

use clap::Parser;
use spire_wm::actor::reactor::{self, Event, Reactor};
use spire_wm::common::config::{Config, config_file};
use spire_wm::common::log;
use spire_wm::ipc::{self, IpcServer, SOCKET_ENV};
use spire_wm::sys::backend::{HeadlessBackend, OutputHandle};
use spire_wm::sys::geometry::Size;
use tracing::{error, info, warn};

const HEADLESS_SIZE: Size = Size::new(1920, 1080);

#[derive(Parser)]
#[command(name = "spire", version, about = "Tiling window manager container tree")]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Check whether the configuration file is valid without starting.
    #[arg(long)]
    validate: bool,

    /// Log at debug level.
    #[arg(short, long)]
    debug: bool,

    /// Log at info level.
    #[arg(short, long)]
    verbose: bool,

    /// Print the socket path of the running instance and exit.
    #[arg(long)]
    get_socketpath: bool,

    /// Number of headless outputs to start with when none are configured.
    #[arg(long, default_value_t = 1)]
    outputs: u64,
}

fn main() {
    sigpipe::reset();
    let opt = Cli::parse();

    if opt.get_socketpath {
        match std::env::var(SOCKET_ENV) {
            Ok(path) if !path.is_empty() => {
                println!("{path}");
                process::exit(0);
            }
            _ => {
                eprintln!("spire socket not detected.");
                process::exit(1);
            }
        }
    }

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: We are single threaded at this point.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    log::init_logging(log::level_for(opt.debug, opt.verbose || opt.validate));
    install_panic_hook();

    let config_path = opt.config.clone().unwrap_or_else(config_file);

    if opt.validate {
        let config = match Config::read(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {e}", config_path.display());
                process::exit(1);
            }
        };
        let issues = config.validate();
        if issues.is_empty() {
            println!("Config validation passed");
        } else {
            for issue in issues {
                eprintln!("{}", issue);
            }
            process::exit(1);
        }
        return;
    }

    let config = match Config::read_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {e}", config_path.display());
            process::exit(1);
        }
    };
    for issue in config.validate() {
        warn!("config: {issue}");
    }

    let socket = ipc::socket_path();
    // SAFETY: We are single threaded at this point.
    unsafe { std::env::set_var(SOCKET_ENV, &socket) };

    let (backend, outputs) = headless_backend(&config, opt.outputs);
    let (events_tx, events_rx) = reactor::channel();
    for output in outputs {
        events_tx.send(Event::OutputCreated(output));
    }

    let server = match IpcServer::bind(&socket) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to bind {}: {e}", socket.display());
            process::exit(1);
        }
    };
    if let Err(e) = server.spawn(events_tx.clone()) {
        eprintln!("Failed to start IPC server: {e}");
        process::exit(1);
    }

    let events_tx_for_signal = events_tx.clone();
    if let Err(e) = ctrlc::set_handler(move || events_tx_for_signal.send(Event::Shutdown)) {
        warn!("Error setting Ctrl+C handler: {e}");
    }

    let reactor = Reactor::new(config, backend).with_config_path(config_path);
    match reactor.spawn(events_rx) {
        Ok(handle) => {
            info!(socket = %socket.display(), "spire running");
            if handle.join().is_err() {
                error!("Reactor thread panicked");
            }
        }
        Err(e) => error!("Failed to spawn reactor: {e}"),
    }
    ipc::server::remove_socket(&socket);
}

/// Builds the in-memory backend: one output per enabled configured output,
/// or `count` anonymous ones when the configuration names none.
fn headless_backend(config: &Config, count: u64) -> (HeadlessBackend, Vec<OutputHandle>) {
    let mut backend = HeadlessBackend::new();
    let mut outputs = Vec::new();
    if config.outputs.is_empty() {
        for i in 1..=count {
            let handle = OutputHandle(i);
            backend.add_output(handle, Some(&format!("HEADLESS-{i}")), HEADLESS_SIZE);
            outputs.push(handle);
        }
    } else {
        for (i, oc) in config.outputs.iter().enumerate() {
            let handle = OutputHandle(i as u64 + 1);
            backend.add_output(handle, Some(&oc.name), oc.size().unwrap_or(HEADLESS_SIZE));
            outputs.push(handle);
        }
    }
    (backend, outputs)
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of leaving the process running without a reactor.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
