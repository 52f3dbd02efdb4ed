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

pub struct GetAuctionInput {
    pub auction_id: entities::AuctionId,
}

impl<D: Database> Service<D> {
    pub async fn get_auction(
        &self,
        input: GetAuctionInput,
    ) -> Result<entities::Auction, RestError> {
        self.repo.get_auction(input.auction_id).await
    }
}
