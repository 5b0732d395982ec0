mod app;
pub use app::App;

use std::path::PathBuf;

use anyhow::Context;
use arcade_session::SessionConfig;
use clap::Parser;

/// Reaction, reflex, fixation and optokinetic mini-games in one session.
#[derive(Debug, Parser)]
#[command(name = "reflex-arcade", version)]
pub struct Args {
    /// JSON session config; missing keys keep their defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// TTF/OTF font for on-screen text (a system font is tried otherwise)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Seed for target placement and stripe widths
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run in a window instead of borderless fullscreen
    #[arg(long)]
    pub windowed: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading session config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let app = App::new(config, &args)?;
    app.run()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "reflex-arcade",
            "--config",
            "session.json",
            "--seed",
            "7",
            "--windowed",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("session.json")));
        assert_eq!(args.seed, Some(7));
        assert!(args.windowed);
        assert!(args.font.is_none());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["reflex-arcade"]);
        assert!(args.config.is_none());
        assert!(args.seed.is_none());
        assert!(!args.windowed);
    }
}
