//! CLI argument definitions for the Ecofusion binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Eco Fusion website backend and chat client
#[derive(Parser, Debug)]
#[command(name = "ecofusion")]
#[command(about = "Ecofusion: contact, newsletter and chat services for the Eco Fusion website")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the backend HTTP server
    Serve(ServeArgs),
    /// Check health of a running backend
    Health(HealthArgs),
    /// Chat with the conversational server from the terminal
    Chat(ChatArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8787, env = "PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "ECOFUSION_HOST")]
    pub host: String,

    /// Deployment environment name
    #[arg(long, default_value = "development", env = "NODE_ENV")]
    pub environment: String,

    /// Mailjet API key
    #[arg(long, default_value = "", env = "MJ_API_KEY", hide_env_values = true)]
    pub mj_api_key: String,

    /// Mailjet API secret
    #[arg(long, default_value = "", env = "MJ_API_SECRET", hide_env_values = true)]
    pub mj_api_secret: String,

    /// Verified sender address for outgoing mail
    #[arg(long, env = "MJ_SENDER")]
    pub sender: Option<String>,

    /// Recipient of contact form submissions (defaults to the sender)
    #[arg(long, env = "CONTACT_TO_EMAIL")]
    pub contact_to: Option<String>,

    /// Mailjet list id for newsletter signups
    #[arg(long, env = "MJ_LIST_ID")]
    pub list_id: Option<u64>,

    /// Newsletter requests allowed per client per minute
    #[arg(long, default_value_t = 10, env = "ECOFUSION_NEWSLETTER_LIMIT")]
    pub newsletter_limit: u32,

    /// Contact requests allowed per client per minute
    #[arg(long, default_value_t = 3, env = "ECOFUSION_CONTACT_LIMIT")]
    pub contact_limit: u32,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the backend to check
    #[arg(long, default_value = "http://127.0.0.1:8787", env = "ECOFUSION_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the chat command
#[derive(clap::Args, Debug)]
pub struct ChatArgs {
    /// Base URL of the conversational server
    #[arg(long, default_value = "http://localhost:5005", env = "RASA_SERVER_URL")]
    pub server_url: String,

    /// File holding the chat history and session id
    #[arg(long, default_value = "ecofusion-chat.json", env = "ECOFUSION_CHAT_STORE")]
    pub store: PathBuf,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Skip the welcome message on an empty history
    #[arg(long)]
    pub no_welcome: bool,
}
