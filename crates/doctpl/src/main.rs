use clap::Parser;
use doctpl::cli::Cli;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    if let Err(err) = doctpl::run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
