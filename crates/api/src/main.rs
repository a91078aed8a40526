#![forbid(unsafe_code)]

use mop_api::cli::{self, CliCommand, envelope_error, envelope_ok};
use mop_api::config::DEFAULT_LOG_FILTER;
use mop_api::{Api, AppConfig, CommandGenerator};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let invocation = match cli::parse_args(&args, AppConfig::from_env()) {
        Ok(invocation) => invocation,
        Err(message) => {
            println!("{}", envelope_error("USAGE", &message));
            std::process::exit(2);
        }
    };
    if invocation.command == CliCommand::Help {
        print!("{}", cli::usage());
        return;
    }

    let config = invocation.config;
    init_tracing(&config.log_filter);

    let generator = CommandGenerator::new(&config.generator);
    let outcome =
        Api::open(&config, generator).and_then(|mut api| cli::run(&mut api, invocation.command));
    match outcome {
        Ok(result) => println!("{}", envelope_ok(result)),
        Err(err) => {
            tracing::error!(code = err.code(), error = %err, "command failed");
            println!("{}", envelope_error(err.code(), &err.to_string()));
            std::process::exit(1);
        }
    }
}
