//! Secret management commands.
//!
//! `roomkey secret` - Generate a fresh server secret.

use roomkey_token::ServerSecret;
use std::fs;
use std::path::PathBuf;

/// Generate a new 32-byte server secret.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let secret = ServerSecret::generate();

    if let Some(output_path) = output {
        fs::write(&output_path, secret.to_hex())?;

        println!("✔ Secret written to: {}", output_path.display());
        println!();
        println!("⚠️  Keep this secret secure! Never commit it to version control.");
        println!();
        println!("Set as an environment variable:");
        println!(
            "  export ROOMKEY_SERVER_SECRET=$(cat {})",
            output_path.display()
        );
    } else {
        // Print to stdout
        println!("{}", secret.to_hex());
    }

    Ok(())
}
