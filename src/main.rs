use shape_mapper::cli::CommandLineInterface;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = CommandLineInterface::load();
    let default_level = if cli.verbose() { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = cli.run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
