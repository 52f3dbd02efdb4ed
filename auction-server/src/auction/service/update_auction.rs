use {
    super::Service,
    crate::{
        api::RestError,
        auction::{
            entities,
            repository::Database,
        },
    },
    sqlx::types::BigDecimal,
    time::OffsetDateTime,
};

#[derive(Clone, Debug)]
pub struct UpdateAuctionInput {
    pub auction_id:     entities::AuctionId,
    pub starting_price: Option<BigDecimal>,
    pub start_time:     Option<OffsetDateTime>,
    pub end_time:       Option<OffsetDateTime>,
}

impl<D: Database> Service<D> {
    /// Reschedules or reprices an auction. Only allowed while no bids exist;
    /// once bidding has started the terms are frozen.
    pub async fn update_auction(
        &self,
        input: UpdateAuctionInput,
    ) -> Result<entities::Auction, RestError> {
        let mut auction = self.repo.get_auction(input.auction_id).await?;
        if auction.has_bids() {
            return Err(RestError::BadParameters(
                "auction already has bids and can no longer be changed".to_string(),
            ));
        }

        if let Some(starting_price) = input.starting_price {
            auction.starting_price = starting_price;
        }
        if let Some(start_time) = input.start_time {
            auction.start_time = start_time;
        }
        if let Some(end_time) = input.end_time {
            auction.end_time = end_time;
        }

        if auction.starting_price <= BigDecimal::from(0) {
            return Err(RestError::BadParameters(
                "starting price must be positive".to_string(),
            ));
        }
        if auction.start_time >= auction.end_time {
            return Err(RestError::BadParameters(
                "start time must be before end time".to_string(),
            ));
        }

        let updated = self.repo.update_auction(&auction).await?;
        if !updated {
            // Guard miss: either a bid landed between our read and the write,
            // or the auction was deleted. Re-fetch to tell them apart.
            self.repo.get_auction(input.auction_id).await?;
            return Err(RestError::BadParameters(
                "auction already has bids and can no longer be changed".to_string(),
            ));
        }
        Ok(auction)
    }
}
