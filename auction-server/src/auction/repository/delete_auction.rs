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
    pub async fn delete_auction(&self, auction_id: entities::AuctionId) -> Result<(), RestError> {
        self.db.delete_auction(auction_id).await
    }
}
