use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = include_smasher::cli::parse();
    let code = include_smasher::app::run_cli(cli);
    if code != 0 {
        std::process::exit(code);
    }
}
