//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = routewright_cli::run() {
        eprintln!("routewright: {err}");
        std::process::exit(1);
    }
}
