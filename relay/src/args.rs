use std::path::PathBuf;

use clap::Parser;

/// Streaming chat relay
#[derive(Debug, Parser)]
#[command(name = "relay", about = "Streaming relay for the Groq chat-completions API")]
pub struct Args {
    /// Path to configuration file; defaults plus the GROQ_API_KEY
    /// environment variable are used when omitted
    #[arg(short, long, env = "RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "RELAY_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
