use {
    super::{
        Database,
        Repository,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl<D: Database> Repository<D> {
    /// Returns false when the auction was not updated because bids already
    /// exist for it.
    pub async fn update_auction(&self, auction: &entities::Auction) -> Result<bool, RestError> {
        self.db.update_auction(auction).await
    }
}
