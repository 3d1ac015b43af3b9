//! # Command Line Interface

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "vaultgate")]
#[command(about = "HTTP gateway for reading secrets from Vault")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file path (yaml, toml or json)
    #[arg(short, long, env = "VAULTGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (overrides logging.level)
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_config_flag() {
        let cli = Cli::parse_from(["vaultgate", "--config", "/etc/vaultgate.yaml", "-v"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/vaultgate.yaml")));
        assert!(cli.verbose);
    }
}
