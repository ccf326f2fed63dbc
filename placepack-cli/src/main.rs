//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = placepack_cli::run() {
        eprintln!("placepack: {err}");
        std::process::exit(1);
    }
}
