use {
    super::AuctionId,
    crate::kernel::entities::BidderId,
    sqlx::types::BigDecimal,
    time::OffsetDateTime,
    uuid::Uuid,
};

pub type BidId = Uuid;

/// An immutable, timestamped offer tied to one bidder and one auction.
/// Bids are append-only: once accepted they are never mutated, and they are
/// only removed when their auction is deleted.
#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub id:              BidId,
    pub auction_id:      AuctionId,
    pub bidder:          BidderId,
    pub bid_amount:      BigDecimal,
    pub submission_time: OffsetDateTime,
}

/// Returned to the caller after a bid is accepted and committed.
#[derive(Clone, Debug, PartialEq)]
pub struct BidReceipt {
    pub id:              BidId,
    pub auction_id:      AuctionId,
    pub bid_amount:      BigDecimal,
    pub submission_time: OffsetDateTime,

    /// Winning state of the auction as of this commit.
    pub highest_bid:    BigDecimal,
    pub highest_bidder: BidderId,
}

/// Why a proposed bid was not accepted. Rejections are expected business
/// outcomes and travel as values, never as faults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BidRejection {
    InvalidAmount,
    AuctionNotYetStarted,
    AuctionEnded,
    BidTooLow,
    BelowStartingPrice,
    AboveMaximumPrice,
    AlreadyHighestBidder,
}

impl BidRejection {
    pub fn message(&self) -> &'static str {
        match self {
            BidRejection::InvalidAmount => {
                "Bid amount must be a positive decimal with at most two fractional digits"
            }
            BidRejection::AuctionNotYetStarted => "Auction is not active: it has not started yet",
            BidRejection::AuctionEnded => "Auction is not active: it has already ended",
            BidRejection::BidTooLow => "Bid must be strictly greater than the current highest bid",
            BidRejection::BelowStartingPrice => "Bid is below the auction's starting price",
            BidRejection::AboveMaximumPrice => {
                "Bid exceeds the vehicle's maximum acceptable price"
            }
            BidRejection::AlreadyHighestBidder => "Bidder already holds the highest bid",
        }
    }
}
