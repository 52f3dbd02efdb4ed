use {
    crate::{
        auction::entities::{
            Auction,
            AuctionStatus,
            BidRejection,
            Vehicle,
        },
        config::BidPolicy,
        kernel::entities::BidderId,
    },
    sqlx::types::BigDecimal,
    time::OffsetDateTime,
};

/// Decides whether a proposed bid is acceptable against a snapshot of the
/// auction. Pure: the same inputs always yield the same verdict, so callers
/// are free to re-run it after reloading state.
///
/// Checks run in a fixed order and the first failure wins:
/// amount sanity, auction window, current highest, starting price, vehicle
/// ceiling, self-outbid.
pub fn validate_bid(
    auction: &Auction,
    vehicle: &Vehicle,
    bidder: BidderId,
    amount: &BigDecimal,
    now: OffsetDateTime,
    policy: &BidPolicy,
) -> Result<(), BidRejection> {
    if *amount <= BigDecimal::from(0) {
        return Err(BidRejection::InvalidAmount);
    }

    match auction.status_at(now) {
        AuctionStatus::Pending => return Err(BidRejection::AuctionNotYetStarted),
        AuctionStatus::Completed => return Err(BidRejection::AuctionEnded),
        AuctionStatus::Active => {}
    }

    // With no bids yet the highest is zero, so any positive amount passes
    // here and the starting price check below decides.
    if *amount <= auction.highest_bid {
        return Err(BidRejection::BidTooLow);
    }

    if *amount < auction.starting_price {
        return Err(BidRejection::BelowStartingPrice);
    }

    if policy.enforce_vehicle_ceiling {
        if let Some(max_price) = &vehicle.max_price {
            if amount > max_price {
                return Err(BidRejection::AboveMaximumPrice);
            }
        }
    }

    if !policy.allow_self_outbid && auction.highest_bidder == Some(bidder) {
        return Err(BidRejection::AlreadyHighestBidder);
    }

    Ok(())
}
