use ffmpeg_agent::config::AgentConfig;
use ffmpeg_agent::error::AgentError;
use ffmpeg_agent::supervisor;

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let config = match AgentConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err:#}");
            std::process::exit(2);
        }
    };

    init_logging();

    match supervisor::run(config).await {
        Ok(()) => std::process::exit(0),
        Err(AgentError::InitialConnect(_)) | Err(AgentError::Transport(_)) => {
            std::process::exit(1);
        }
        Err(AgentError::Config(_)) => {
            // Unreachable in practice: config errors are caught by
            // AgentConfig::load() before the supervisor ever runs.
            std::process::exit(2);
        }
    }
}
