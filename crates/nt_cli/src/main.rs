use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use nt_core::{HttpClient, ReqwestClient};
use nt_inference::{create_model, Analyzer};
use nt_news::logging::init_logging;
use nt_news::{handle_command, NewsArgs, NewsConfig, NewsManager};
use nt_storage::{create_storage, StorageKind};
use nt_web::AppState;
use tracing::info;

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3600),
        'd' => Some(86400),
        _ => None,
    }
}

/// Parses `1h15m30s`-style durations; a trailing bare number is seconds.
impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let overflow = || format!("Duration too large: {}", s);
        let mut total: u64 = 0;
        let mut pending: Option<u64> = None;

        for c in s.chars().filter(|c| !c.is_whitespace()) {
            if let Some(digit) = c.to_digit(10) {
                let value = pending
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u64::from(digit)))
                    .ok_or_else(overflow)?;
                pending = Some(value);
                continue;
            }

            let multiplier = unit_seconds(c).ok_or_else(|| format!("Invalid duration unit: {}", c))?;
            let value = pending
                .take()
                .ok_or_else(|| format!("Unit {} must follow a number", c))?;
            total = value
                .checked_mul(multiplier)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(overflow)?;
        }

        let (total, seen) = match pending {
            Some(secs) => (total.checked_add(secs).ok_or_else(overflow)?, true),
            None => (total, !s.trim().is_empty()),
        };
        if !seen {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "News aggregation and article analysis", long_about = None)]
pub struct Cli {
    /// Curated article store: memory or sqlite
    #[arg(long, default_value = "memory")]
    storage: StorageKind,
    /// SQLite database file (sqlite storage only)
    #[arg(long)]
    database_path: Option<PathBuf>,
    #[arg(long, env = "GNEWS_API_KEY", hide_env_values = true)]
    gnews_api_key: Option<String>,
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    openrouter_api_key: Option<String>,
    #[arg(long, env = "GOOGLE_FACTCHECK_API_KEY", hide_env_values = true)]
    factcheck_api_key: Option<String>,
    #[arg(
        long,
        default_value = "openrouter",
        help = "Model provider for analysis. Available providers: openrouter (default), dummy"
    )]
    model: String,
    #[arg(long, env = "NT_PRIMARY_MODEL", default_value = "deepseek/deepseek-r1:free")]
    primary_model: String,
    #[arg(long, env = "NT_SECONDARY_MODEL", default_value = "mistralai/mistral-7b-instruct:free")]
    secondary_model: String,
    /// How long an unfiltered news listing stays fresh (e.g. 30m, 1h15m)
    #[arg(long, default_value = "30m")]
    cache_ttl: HumanDuration,
    #[arg(long, env = "NT_LOG_LEVEL", default_value = "info")]
    log_level: tracing::Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "NT_BIND", default_value = "0.0.0.0:8000")]
        bind: String,
    },
    /// List news and manage curated articles
    News(NewsArgs),
    /// Analyze an article and print the report as JSON
    Analyze {
        /// Article text; use --file to read it from disk instead
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

impl Cli {
    fn news_config(&self) -> NewsConfig {
        NewsConfig {
            api_key: self.gnews_api_key.clone(),
            cache_ttl: self.cache_ttl.0,
            ..NewsConfig::default()
        }
    }

    fn inference_config(&self) -> nt_inference::Config {
        nt_inference::Config {
            api_key: self.openrouter_api_key.clone(),
            primary_model: self.primary_model.clone(),
            secondary_model: self.secondary_model.clone(),
            factcheck_api_key: self.factcheck_api_key.clone(),
            ..nt_inference::Config::default()
        }
    }
}

async fn build_news(cli: &Cli, http: Arc<dyn HttpClient>) -> anyhow::Result<NewsManager> {
    let kind = cli.storage.clone().with_path(cli.database_path.clone());
    let storage = create_storage(&kind)
        .await
        .with_context(|| format!("opening {} storage", kind))?;
    info!("💾 Storage initialized (using {})", kind);

    if cli.gnews_api_key.is_none() {
        tracing::warn!("GNEWS_API_KEY is not set; upstream headlines will fail");
    }
    Ok(NewsManager::from_config(cli.news_config(), http, storage))
}

fn build_analyzer(cli: &Cli, http: Arc<dyn HttpClient>) -> anyhow::Result<Analyzer> {
    let config = cli.inference_config();
    let model = create_model(&cli.model, &config, http.clone())
        .with_context(|| format!("creating {} model", cli.model))?;
    info!("🧠 Inference model initialized (using {})", model.name());
    Ok(Analyzer::from_config(&config, http, model))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new());

    match &cli.command {
        Commands::Serve { bind } => {
            let news = build_news(&cli, http.clone()).await?;
            let analyzer = build_analyzer(&cli, http)?;
            nt_web::serve(AppState::new(news, analyzer), bind).await?;
        }
        Commands::News(args) => {
            let news = build_news(&cli, http).await?;
            handle_command(args.clone(), &news).await?;
        }
        Commands::Analyze { text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text.clone(),
                (None, Some(path)) => tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => anyhow::bail!("Provide article text or --file"),
            };
            let analyzer = build_analyzer(&cli, http)?;
            let report = analyzer.report(&text).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("30m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(1800));
        assert_eq!("1h15m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4530));
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert!("10x".parse::<HumanDuration>().is_err());
        assert!("".parse::<HumanDuration>().is_err());
        assert!("m".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        assert!("99999999999999999999d".parse::<HumanDuration>().is_err());
        assert!("213503982334602d".parse::<HumanDuration>().is_err());
        assert!(format!("{}s1s", u64::MAX).parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["nt", "--cache-ttl", "5m", "news", "list", "-q", "budget"]).unwrap();
        assert_eq!(cli.cache_ttl.0, Duration::from_secs(300));
        assert!(matches!(cli.command, Commands::News(_)));

        let cli = Cli::try_parse_from(["nt", "analyze", "--file", "article.txt"]).unwrap();
        assert!(matches!(cli.command, Commands::Analyze { text: None, file: Some(_) }));
        assert!(Cli::try_parse_from(["nt", "analyze"]).is_err());
    }
}
