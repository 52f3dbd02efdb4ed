use {
    super::Service,
    crate::{
        api::RestError,
        auction::{
            entities,
            repository::Database,
        },
    },
};

pub struct DeleteAuctionInput {
    pub auction_id: entities::AuctionId,
}

impl<D: Database> Service<D> {
    /// Removes an auction together with its bid history.
    pub async fn delete_auction(&self, input: DeleteAuctionInput) -> Result<(), RestError> {
        self.repo.delete_auction(input.auction_id).await
    }
}
