#[cfg(test)]
use mockall::automock;
use {
    super::entities,
    crate::{
        api::RestError,
        kernel::{
            db::DB,
            entities::{
                BidderId,
                DealerId,
                VehicleId,
            },
        },
    },
    axum::async_trait,
    sqlx::{
        types::BigDecimal,
        FromRow,
    },
    std::fmt::Debug,
    time::OffsetDateTime,
    tracing::instrument,
    uuid::Uuid,
};

#[derive(Clone, FromRow, Debug)]
pub struct Auction {
    pub id:             entities::AuctionId,
    pub vehicle_id:     VehicleId,
    pub starting_price: BigDecimal,
    pub start_time:     OffsetDateTime,
    pub end_time:       OffsetDateTime,
    pub highest_bid:    BigDecimal,
    pub highest_bidder: Option<Uuid>,
}

impl Auction {
    pub fn new(auction: &entities::Auction) -> Self {
        Self {
            id:             auction.id,
            vehicle_id:     auction.vehicle_id,
            starting_price: auction.starting_price.clone(),
            start_time:     auction.start_time,
            end_time:       auction.end_time,
            highest_bid:    auction.highest_bid.clone(),
            highest_bidder: auction.highest_bidder,
        }
    }

    pub fn get_entity(&self) -> entities::Auction {
        entities::Auction {
            id:             self.id,
            vehicle_id:     self.vehicle_id,
            starting_price: self.starting_price.clone(),
            start_time:     self.start_time,
            end_time:       self.end_time,
            highest_bid:    self.highest_bid.clone(),
            highest_bidder: self.highest_bidder,
        }
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct Bid {
    pub id:              entities::BidId,
    pub auction_id:      entities::AuctionId,
    pub bidder:          BidderId,
    pub bid_amount:      BigDecimal,
    pub submission_time: OffsetDateTime,
}

impl Bid {
    pub fn new(bid: &entities::Bid) -> Self {
        Self {
            id:              bid.id,
            auction_id:      bid.auction_id,
            bidder:          bid.bidder,
            bid_amount:      bid.bid_amount.clone(),
            submission_time: bid.submission_time,
        }
    }

    pub fn get_entity(&self) -> entities::Bid {
        entities::Bid {
            id:              self.id,
            auction_id:      self.auction_id,
            bidder:          self.bidder,
            bid_amount:      self.bid_amount.clone(),
            submission_time: self.submission_time,
        }
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct Vehicle {
    pub id:        VehicleId,
    pub dealer_id: Option<DealerId>,
    pub make:      String,
    pub model:     String,
    pub year:      i32,
    pub max_price: Option<BigDecimal>,
}

impl Vehicle {
    pub fn get_entity(&self) -> entities::Vehicle {
        entities::Vehicle {
            id:        self.id,
            dealer_id: self.dealer_id,
            make:      self.make.clone(),
            model:     self.model.clone(),
            year:      self.year,
            max_price: self.max_price.clone(),
        }
    }
}

/// Outcome of the transactional commit of an accepted bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitBid {
    /// The bid row was inserted and the auction's winning state advanced.
    Committed,
    /// The guard clause matched no row: the stored highest bid moved past
    /// this amount after validation. Nothing was written.
    Conflict,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    async fn add_auction(&self, auction: &entities::Auction) -> Result<(), RestError>;
    async fn get_auction(&self, auction_id: entities::AuctionId) -> Result<Auction, RestError>;
    async fn update_auction(&self, auction: &entities::Auction) -> Result<bool, RestError>;
    async fn delete_auction(&self, auction_id: entities::AuctionId) -> Result<(), RestError>;
    async fn get_vehicle(&self, vehicle_id: VehicleId) -> Result<Vehicle, RestError>;
    async fn get_bids(&self, auction_id: entities::AuctionId) -> Result<Vec<Bid>, RestError>;
    async fn commit_bid(&self, bid: &Bid) -> Result<CommitBid, RestError>;
}

#[async_trait]
impl Database for DB {
    #[instrument(
        target = "metrics",
        name = "db_add_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_auction(&self, auction: &entities::Auction) -> Result<(), RestError> {
        sqlx::query(
            "INSERT INTO auction (id, vehicle_id, starting_price, start_time, end_time, highest_bid, highest_bidder) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(auction.id)
        .bind(auction.vehicle_id)
        .bind(auction.starting_price.clone())
        .bind(auction.start_time)
        .bind(auction.end_time)
        .bind(auction.highest_bid.clone())
        .bind(auction.highest_bidder)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), auction = ?auction, "DB: Failed to insert auction");
            RestError::TemporarilyUnavailable
        })?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_auction(&self, auction_id: entities::AuctionId) -> Result<Auction, RestError> {
        sqlx::query_as("SELECT * FROM auction WHERE id = $1")
            .bind(auction_id)
            .fetch_one(self)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => RestError::AuctionNotFound,
                _ => {
                    tracing::Span::current().record("result", "error");
                    tracing::error!(
                        error = e.to_string(),
                        auction_id = auction_id.to_string(),
                        "Failed to get auction from db"
                    );
                    RestError::TemporarilyUnavailable
                }
            })
    }

    #[instrument(
        target = "metrics",
        name = "db_update_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "update_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn update_auction(&self, auction: &entities::Auction) -> Result<bool, RestError> {
        // The NOT EXISTS guard keeps the schedule frozen once bids are in.
        let result = sqlx::query(
            "UPDATE auction SET starting_price = $1, start_time = $2, end_time = $3 WHERE id = $4 AND NOT EXISTS (SELECT 1 FROM bid WHERE bid.auction_id = auction.id)",
        )
        .bind(auction.starting_price.clone())
        .bind(auction.start_time)
        .bind(auction.end_time)
        .bind(auction.id)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), auction = ?auction, "DB: Failed to update auction");
            RestError::TemporarilyUnavailable
        })?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(
        target = "metrics",
        name = "db_delete_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "delete_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn delete_auction(&self, auction_id: entities::AuctionId) -> Result<(), RestError> {
        let result = sqlx::query("DELETE FROM auction WHERE id = $1")
            .bind(auction_id)
            .execute(self)
            .await
            .map_err(|e| {
                tracing::Span::current().record("result", "error");
                tracing::error!(
                    error = e.to_string(),
                    auction_id = auction_id.to_string(),
                    "DB: Failed to delete auction"
                );
                RestError::TemporarilyUnavailable
            })?;
        if result.rows_affected() == 0 {
            return Err(RestError::AuctionNotFound);
        }
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_vehicle",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_vehicle",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_vehicle(&self, vehicle_id: VehicleId) -> Result<Vehicle, RestError> {
        sqlx::query_as("SELECT id, dealer_id, make, model, year, max_price FROM vehicle WHERE id = $1")
            .bind(vehicle_id)
            .fetch_one(self)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => RestError::VehicleNotFound,
                _ => {
                    tracing::Span::current().record("result", "error");
                    tracing::error!(
                        error = e.to_string(),
                        vehicle_id = vehicle_id.to_string(),
                        "Failed to get vehicle from db"
                    );
                    RestError::TemporarilyUnavailable
                }
            })
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bids",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bids",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_bids(&self, auction_id: entities::AuctionId) -> Result<Vec<Bid>, RestError> {
        sqlx::query_as("SELECT * FROM bid WHERE auction_id = $1 ORDER BY submission_time, id")
            .bind(auction_id)
            .fetch_all(self)
            .await
            .map_err(|e| {
                tracing::Span::current().record("result", "error");
                tracing::error!(
                    error = e.to_string(),
                    auction_id = auction_id.to_string(),
                    "Failed to get bids from db"
                );
                RestError::TemporarilyUnavailable
            })
    }

    #[instrument(
        target = "metrics",
        name = "db_commit_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "commit_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn commit_bid(&self, bid: &Bid) -> Result<CommitBid, RestError> {
        let mut tx = self.begin().await.map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), "DB: Failed to begin bid transaction");
            RestError::TemporarilyUnavailable
        })?;

        // Guarded update: only advances the winning state if the stored
        // highest bid is still strictly below this amount.
        let updated = sqlx::query(
            "UPDATE auction SET highest_bid = $1, highest_bidder = $2 WHERE id = $3 AND highest_bid < $1",
        )
        .bind(bid.bid_amount.clone())
        .bind(bid.bidder)
        .bind(bid.auction_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to advance auction winning state");
            RestError::TemporarilyUnavailable
        })?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Ok(CommitBid::Conflict);
        }

        sqlx::query(
            "INSERT INTO bid (id, auction_id, bidder, bid_amount, submission_time) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(bid.id)
        .bind(bid.auction_id)
        .bind(bid.bidder)
        .bind(bid.bid_amount.clone())
        .bind(bid.submission_time)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to insert bid");
            RestError::TemporarilyUnavailable
        })?;

        tx.commit().await.map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to commit bid transaction");
            RestError::TemporarilyUnavailable
        })?;

        Ok(CommitBid::Committed)
    }
}
