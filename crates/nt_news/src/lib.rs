pub mod cache;
pub mod cli;
pub mod config;
pub mod curated;
pub mod logging;
pub mod manager;
pub mod scrapers;
pub mod sources;

pub use cache::NewsCache;
pub use cli::{handle_command, NewsArgs, NewsCommands};
pub use config::NewsConfig;
pub use manager::NewsManager;
pub use scrapers::{ImageScraper, Scraper};
pub use sources::{GNewsSource, NewsAggregator, NewsSource};

pub mod prelude {
    pub use super::{NewsConfig, NewsManager};
    pub use nt_core::{Article, Error, Result};
}
