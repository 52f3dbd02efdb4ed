use {
    crate::{
        api::{
            parse_amount,
            Auth,
            ErrorBodyResponse,
            RestError,
        },
        auction::{
            entities,
            service::{
                get_bids::GetBidsInput,
                place_bid::PlaceBidInput,
            },
        },
        kernel::entities::BidderId,
        state::Store,
    },
    axum::{
        extract::{
            Path,
            State,
        },
        Json,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::sync::Arc,
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct CreateBid {
    /// The amount offered, as a decimal string with at most two fractional
    /// digits.
    #[schema(example = "12500.00")]
    pub amount: String,
}

#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone)]
pub struct BidResult {
    /// The unique id created to identify the bid.
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:              entities::BidId,
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id:      entities::AuctionId,
    #[schema(example = "12500.00")]
    pub amount:          String,
    #[schema(example = "2026-05-03T09:30:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub submission_time: OffsetDateTime,
    /// The auction's highest bid as of this placement.
    #[schema(example = "12500.00")]
    pub highest_bid:     String,
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub highest_bidder:  BidderId,
}

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct Bid {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:              entities::BidId,
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub bidder:          BidderId,
    #[schema(example = "12500.00")]
    pub amount:          String,
    #[schema(example = "2026-05-03T09:30:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub submission_time: OffsetDateTime,
}

impl Bid {
    fn from_entity(bid: &entities::Bid) -> Self {
        Self {
            id:              bid.id,
            bidder:          bid.bidder,
            amount:          bid.bid_amount.to_string(),
            submission_time: bid.submission_time,
        }
    }
}

/// Bid on an auction.
///
/// The bidder is taken from the bearer token. The bid is validated against
/// the auction's live winning state and recorded atomically, so two bids can
/// never both win with the same amount.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/bids",
    params(("auction_id"=String, description = "Auction id to bid on")),
    request_body = CreateBid,
    responses(
    (status = 200, description = "Bid was placed successfully", body = BidResult),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    (status = 409, description = "The auction is under heavy contention, try again", body = ErrorBodyResponse),
),)]
pub async fn post_bid(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<entities::AuctionId>,
    Json(params): Json<CreateBid>,
) -> Result<Json<BidResult>, RestError> {
    let amount = parse_amount(&params.amount)
        .ok_or(RestError::BidRejected(entities::BidRejection::InvalidAmount))?;
    let receipt = store
        .auction_service
        .place_bid(PlaceBidInput {
            auction_id,
            bidder: auth.principal,
            amount,
        })
        .await?;
    Ok(Json(BidResult {
        id:              receipt.id,
        auction_id:      receipt.auction_id,
        amount:          receipt.bid_amount.to_string(),
        submission_time: receipt.submission_time,
        highest_bid:     receipt.highest_bid.to_string(),
        highest_bidder:  receipt.highest_bidder,
    }))
}

/// Query an auction's bid history, oldest first.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}/bids",
    params(("auction_id"=String, description = "Auction id to query for")),
    responses(
    (status = 200, description = "The auction's bids in submission order", body = Vec<Bid>),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn get_bids(
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<entities::AuctionId>,
) -> Result<Json<Vec<Bid>>, RestError> {
    let bids = store
        .auction_service
        .get_bids(GetBidsInput { auction_id })
        .await?;
    Ok(Json(bids.iter().map(Bid::from_entity).collect()))
}
