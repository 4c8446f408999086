//! Reframing Room CLI binary entrypoint.

fn main() {
    if let Err(err) = reframe_cli::app::run() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
