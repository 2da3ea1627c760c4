//! Command-line entry points
//!
//! - `serve`: run the HTTP service
//! - `migrate`: apply pending schema migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Key portal - display-once API key issuance with monthly token caps
#[derive(Parser)]
#[command(name = "keyportal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve,

    /// Apply pending database migrations and exit
    Migrate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["keyportal", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));

        let cli = Cli::try_parse_from(["keyportal", "migrate"]).unwrap();
        assert!(matches!(cli.command, Command::Migrate));

        assert!(Cli::try_parse_from(["keyportal"]).is_err());
    }
}
