#![forbid(unsafe_code)]

//! rawpad binary entry point.

use std::env;
use std::process;

use rawpad::app::App;
use rawpad_tty::TtySession;

const HELP_TEXT: &str = "\
rawpad — a minimal full-screen terminal pad

USAGE:
    rawpad [OPTIONS]

OPTIONS:
    --help, -h       Show this help message
    --version, -V    Show version

KEYBINDINGS:
    Ctrl+Q    Quit

ENVIRONMENT VARIABLES:
    RAWPAD_LOG    Log file path (builds with the `tracing` feature only;
                  filtered by RUST_LOG)";

fn main() {
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{HELP_TEXT}");
                return;
            }
            "--version" | "-V" => {
                println!("rawpad {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            other => {
                eprintln!("rawpad: unknown option '{other}' (try --help)");
                process::exit(2);
            }
        }
    }

    #[cfg(feature = "tracing")]
    init_tracing();

    if let Err(err) = run() {
        // The session guard has already reset the screen and restored the
        // terminal by the time this prints.
        eprintln!("rawpad: {err}");
        process::exit(1);
    }
}

fn run() -> rawpad_core::Result<()> {
    let mut session = TtySession::open()?;
    let geometry = session.resolve_geometry()?;
    App::new(geometry).run(&mut session)
}

/// Log to the file named by RAWPAD_LOG, never the terminal raw mode owns.
#[cfg(feature = "tracing")]
fn init_tracing() {
    let Ok(path) = env::var("RAWPAD_LOG") else {
        return;
    };
    match std::fs::File::create(&path) {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
        Err(err) => eprintln!("rawpad: cannot open log file {path}: {err}"),
    }
}
