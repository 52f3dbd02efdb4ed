use {
    super::{
        models,
        CommitBid,
        Database,
        Repository,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl<D: Database> Repository<D> {
    // NOTE: Do not call this function directly. Instead call `place_bid` from
    // `Service`, which serializes placements per auction.
    pub async fn add_bid(&self, bid: &entities::Bid) -> Result<CommitBid, RestError> {
        self.db.commit_bid(&models::Bid::new(bid)).await
    }
}
