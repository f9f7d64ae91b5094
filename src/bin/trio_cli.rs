use trio_budget::cli::run_cli;

// Tracing is installed by the shell once the config's log filter is known.
fn main() {
    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
