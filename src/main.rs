use std::{net::SocketAddr, sync::Arc};

use clap::Command;
use glossforge::{
    generator::OpenAiGenerator,
    server::{router, AppState},
};

#[tokio::main]
async fn main() {
    let command = Command::new("glossforge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Conlang generation server")
        .author("Glossforge Developers")
        .arg(
            clap::Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on (falls back to PORT, then 3000)")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            clap::Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .help("Set the level of verbosity")
                .action(clap::ArgAction::Count),
        );

    let args = command.get_matches();
    env_logger::Builder::new()
        .filter_level(match args.get_count("verbosity") {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    // Credentials and overrides may live in a local .env file
    dotenvy::dotenv().ok();

    let port = args
        .get_one::<u16>("port")
        .copied()
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(3000);

    let state = AppState {
        generator: Arc::new(OpenAiGenerator::from_env()),
    };
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    log::info!("Server running at http://{addr}");
    axum::serve(listener, app).await.expect("Server error");
}
