//! Version information display.

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::sim::MAX_TURN;

/// Print version information.
pub fn run(args: &VersionArgs) {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => {
            println!("{name} {version} (max turns: {MAX_TURN})");
        }
        OutputFormat::Json => {
            println!(r#"{{"name":"{name}","version":"{version}","max_turns":{MAX_TURN}}}"#);
        }
    }
}
