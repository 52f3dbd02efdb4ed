use {
    super::repository::{
        Database,
        Repository,
    },
    crate::config::BidPolicy,
    std::{
        ops::Deref,
        sync::Arc,
        time::Duration,
    },
};

pub mod add_auction;
pub mod delete_auction;
pub mod get_auction;
pub mod get_bids;
pub mod place_bid;
pub mod update_auction;
pub mod verification;

#[derive(Clone, Debug)]
pub struct Config {
    pub bid_policy:     BidPolicy,
    /// How long a placement may wait for its auction's lock before giving up.
    pub lock_timeout:   Duration,
    /// How many times a placement retries after a commit-time conflict.
    pub commit_retries: u32,
}

#[derive(Debug)]
pub struct ServiceInner<D: Database> {
    config: Config,
    repo:   Repository<D>,
}

pub struct Service<D: Database>(Arc<ServiceInner<D>>);

impl<D: Database> Service<D> {
    pub fn new(db: D, config: Config) -> Self {
        Self(Arc::new(ServiceInner {
            config,
            repo: Repository::new(db),
        }))
    }
}

impl<D: Database> Clone for Service<D> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<D: Database> Deref for Service<D> {
    type Target = ServiceInner<D>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
