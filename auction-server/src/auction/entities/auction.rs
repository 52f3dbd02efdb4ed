use {
    crate::kernel::entities::{
        BidderId,
        VehicleId,
    },
    sqlx::types::BigDecimal,
    std::sync::Arc,
    time::OffsetDateTime,
    tokio::sync::Mutex,
    uuid::Uuid,
};

pub type AuctionId = Uuid;
pub type AuctionLock = Arc<Mutex<()>>;

/// A timed sale event binding one vehicle to a bidding window and the current
/// winning state.
#[derive(Clone, Debug, PartialEq)]
pub struct Auction {
    pub id:             AuctionId,
    pub vehicle_id:     VehicleId,
    pub starting_price: BigDecimal,
    pub start_time:     OffsetDateTime,
    pub end_time:       OffsetDateTime,

    /// Amount of the most recently accepted bid, zero before the first one.
    /// Monotonically non-decreasing over the auction's lifetime.
    pub highest_bid:    BigDecimal,
    pub highest_bidder: Option<BidderId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AuctionStatus {
    Pending,
    Active,
    Completed,
}

impl Auction {
    pub fn new(
        vehicle_id: VehicleId,
        starting_price: BigDecimal,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            starting_price,
            start_time,
            end_time,
            highest_bid: BigDecimal::from(0),
            highest_bidder: None,
        }
    }

    /// Derives the lifecycle status from the time window. The caller supplies
    /// the clock so that the same auction and instant always map to the same
    /// status.
    pub fn status_at(&self, now: OffsetDateTime) -> AuctionStatus {
        if now < self.start_time {
            AuctionStatus::Pending
        } else if now <= self.end_time {
            AuctionStatus::Active
        } else {
            AuctionStatus::Completed
        }
    }

    pub fn has_bids(&self) -> bool {
        self.highest_bidder.is_some()
    }
}
