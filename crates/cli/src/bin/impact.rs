fn main() {
    if let Err(err) = impact_cli::main_entry() {
        eprintln!("Error: {err:#}");
        std::process::exit(impact_cli::exit_code(&err));
    }
}
