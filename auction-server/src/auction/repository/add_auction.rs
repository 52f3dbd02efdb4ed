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
    pub async fn add_auction(&self, auction: &entities::Auction) -> Result<(), RestError> {
        self.db.add_auction(auction).await
    }
}
