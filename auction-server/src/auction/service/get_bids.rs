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

pub struct GetBidsInput {
    pub auction_id: entities::AuctionId,
}

impl<D: Database> Service<D> {
    /// Returns the auction's bid history in submission order.
    pub async fn get_bids(&self, input: GetBidsInput) -> Result<Vec<entities::Bid>, RestError> {
        // Distinguishes an unknown auction from one with no bids yet.
        self.repo.get_auction(input.auction_id).await?;
        self.repo.get_bids(input.auction_id).await
    }
}
