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
    /// Bids come back in submission order, oldest first.
    pub async fn get_bids(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<Vec<entities::Bid>, RestError> {
        let bids = self.db.get_bids(auction_id).await?;
        Ok(bids.iter().map(|bid| bid.get_entity()).collect())
    }
}
