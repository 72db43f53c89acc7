use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "trend-monitor",
    version,
    about = "Tracks trending keywords and generates a product for each"
)]
pub struct Cli {
    /// Keywords to add and generate immediately
    pub keywords: Vec<String>,

    /// Settings file (defaults to $TREND_MONITOR_CONFIG or trend_monitor.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_keywords_are_positional() {
        let cli = Cli::try_parse_from(["trend-monitor", "cat mug", "horror movie svg"]).unwrap();
        assert_eq!(cli.keywords, vec!["cat mug", "horror movie svg"]);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_no_arguments_only_shows_dashboard() {
        let cli = Cli::try_parse_from(["trend-monitor"]).unwrap();
        assert!(cli.keywords.is_empty());
    }

    #[test]
    fn test_config_override() {
        let cli =
            Cli::try_parse_from(["trend-monitor", "--config", "alt.toml", "cat mug"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert_eq!(cli.keywords, vec!["cat mug"]);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["trend-monitor", "--verbose"]).is_err());
    }
}
