use {
    anyhow::Result,
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    std::{
        fs,
        time::Duration,
    },
};

mod server;

#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub enum Options {
    /// Run the auction engine service.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub config: ConfigOptions,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file with the auction parameters.
    #[arg(long = "config")]
    #[arg(env = "AUCTION_ENGINE_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub auction: AuctionConfig,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AuctionConfig {
    /// How often the lifecycle sweep closes expired auctions.
    #[serde(with = "humantime_serde", default = "default_sweep_interval")]
    pub sweep_interval: Duration,

    /// Lifetime of a new auction when the creation request carries no end
    /// time.
    #[serde(with = "humantime_serde", default = "default_auction_duration")]
    pub auction_duration: Duration,

    /// Reserve price applied to new auctions that do not specify one, in
    /// minor currency units.
    #[serde(default)]
    pub default_reserve_price: u64,
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_auction_duration() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        let yaml_content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&yaml_content)?;
        Ok(config)
    }
}
