use std::env;

use debtplan::api::{self, ServerConfig, cli};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        let config = match ServerConfig::from_env(port) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        };
        if let Err(e) = api::run_http_server(config).await {
            log::error!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    match cli::run(cli::parse_args(raw_args)) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
