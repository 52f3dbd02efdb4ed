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

pub use server::Options as ServerOptions;

#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub enum Options {
    /// Run the auction server service.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub config: ConfigOptions,

    /// Postgres connection string for the auction and bid tables.
    #[arg(long = "database-url")]
    #[arg(env = "DATABASE_URL")]
    pub database_url: String,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file containing the bidding policy
    #[arg(long = "config")]
    #[arg(env = "AUCTION_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Which of the optional bid validation rules are enforced.
    #[serde(default)]
    pub bid_policy: BidPolicy,

    /// How long a bid placement may wait for the per-auction lock before
    /// giving up with a busy response.
    #[serde(with = "humantime_serde", default = "default_lock_timeout")]
    pub lock_timeout: Duration,

    /// How many times an accepted bid is re-validated and re-submitted after
    /// a commit conflict before giving up with a busy response.
    #[serde(default = "default_commit_retries")]
    pub commit_retries: u32,
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        let yaml_content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&yaml_content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bid_policy:     BidPolicy::default(),
            lock_timeout:   default_lock_timeout(),
            commit_retries: default_commit_retries(),
        }
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct BidPolicy {
    /// Reject bids above the vehicle's maximum acceptable price, when the
    /// vehicle has one. Historical deployments disagreed on this rule, so it
    /// is a toggle rather than a fixed behavior.
    #[serde(default)]
    pub enforce_vehicle_ceiling: bool,

    /// Allow the current highest bidder to raise their own bid.
    #[serde(default = "default_true")]
    pub allow_self_outbid: bool,
}

impl Default for BidPolicy {
    fn default() -> Self {
        Self {
            enforce_vehicle_ceiling: false,
            allow_self_outbid:       true,
        }
    }
}

fn default_lock_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_commit_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}
