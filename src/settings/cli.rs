use super::Parser;

/// Token session service for the record API.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Path to a settings file; defaults to settings/dev.toml or settings/release.toml.
    #[arg(long)]
    pub settings: Option<String>,
}
