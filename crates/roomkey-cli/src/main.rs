mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "roomkey", version, about = "Room access token tooling")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mint a token for a user, optionally scoped to a room.
    Mint {
        /// User the token authorizes
        #[arg(long = "user-id")]
        user_id: String,

        /// Room the token grants access to (omit for an identity-only token)
        #[arg(long = "room-id")]
        room_id: Option<String>,

        /// Application id the token is minted for
        #[arg(long = "app-id", env = "ROOMKEY_APP_ID")]
        app_id: u64,

        /// Server secret, or a path to a file containing it
        #[arg(long, env = "ROOMKEY_SERVER_SECRET", hide_env_values = true)]
        secret: String,

        /// Wire format: "sealed" or "signed"
        #[arg(long, env = "ROOMKEY_TOKEN_SCHEME", default_value = "sealed")]
        scheme: String,

        /// Write the token to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show what can be read from a token without the secret.
    Inspect {
        /// Token string, or a path to a file containing one
        token: String,
    },

    /// Verify a token and print its claims.
    Verify {
        /// Token string, or a path to a file containing one
        token: String,

        /// Application id the token was minted for
        #[arg(long = "app-id", env = "ROOMKEY_APP_ID")]
        app_id: u64,

        /// Server secret, or a path to a file containing it
        #[arg(long, env = "ROOMKEY_SERVER_SECRET", hide_env_values = true)]
        secret: String,

        /// Wire format: "sealed" or "signed"
        #[arg(long, env = "ROOMKEY_TOKEN_SCHEME", default_value = "sealed")]
        scheme: String,
    },

    /// Generate a fresh server secret.
    Secret {
        /// Write the secret to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Mint {
            user_id,
            room_id,
            app_id,
            secret,
            scheme,
            output,
        } => commands::token::mint(scheme, app_id, secret, user_id, room_id, output),
        Command::Inspect { token } => commands::token::inspect(token),
        Command::Verify {
            token,
            app_id,
            secret,
            scheme,
        } => commands::token::verify(token, scheme, app_id, secret),
        Command::Secret { output } => commands::secret::generate(output),
    }
}
