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
                add_auction::AddAuctionInput,
                delete_auction::DeleteAuctionInput,
                get_auction::GetAuctionInput,
                update_auction::UpdateAuctionInput,
            },
        },
        kernel::entities::{
            BidderId,
            VehicleId,
        },
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
    sqlx::types::BigDecimal,
    std::sync::Arc,
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone)]
pub struct Auction {
    /// The unique id of the auction.
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:             entities::AuctionId,
    /// The vehicle on sale.
    #[schema(example = "a93d6f21-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub vehicle_id:     VehicleId,
    /// Minimum acceptable amount for the first bid, as a decimal string.
    #[schema(example = "10000.00")]
    pub starting_price: String,
    /// When bidding opens.
    #[schema(example = "2026-05-01T12:00:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub start_time:     OffsetDateTime,
    /// When bidding closes.
    #[schema(example = "2026-05-08T12:00:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:       OffsetDateTime,
    /// Lifecycle status derived from the time window: pending, active or
    /// completed.
    #[schema(example = "active")]
    pub status:         String,
    /// Amount of the current highest bid, "0" before the first bid.
    #[schema(example = "12500.00")]
    pub highest_bid:    String,
    /// Holder of the current highest bid, absent before the first bid.
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = Option<String>)]
    pub highest_bidder: Option<BidderId>,
}

impl Auction {
    pub fn from_entity(auction: &entities::Auction, now: OffsetDateTime) -> Self {
        Self {
            id:             auction.id,
            vehicle_id:     auction.vehicle_id,
            starting_price: auction.starting_price.to_string(),
            start_time:     auction.start_time,
            end_time:       auction.end_time,
            status:         auction.status_at(now).to_string(),
            highest_bid:    auction.highest_bid.to_string(),
            highest_bidder: auction.highest_bidder,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct CreateAuction {
    #[schema(example = "a93d6f21-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub vehicle_id:     VehicleId,
    #[schema(example = "10000.00")]
    pub starting_price: String,
    #[schema(example = "2026-05-01T12:00:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub start_time:     OffsetDateTime,
    #[schema(example = "2026-05-08T12:00:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:       OffsetDateTime,
}

/// All fields are optional; omitted fields keep their current value.
#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct UpdateAuction {
    #[schema(example = "12000.00")]
    pub starting_price: Option<String>,
    #[schema(example = "2026-05-02T12:00:00Z", value_type = Option<String>)]
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time:     Option<OffsetDateTime>,
    #[schema(example = "2026-05-09T12:00:00Z", value_type = Option<String>)]
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time:       Option<OffsetDateTime>,
}

fn parse_price(value: &str) -> Result<BigDecimal, RestError> {
    parse_amount(value).ok_or_else(|| {
        RestError::BadParameters(
            "starting price is not a valid decimal amount with at most two fractional digits"
                .to_string(),
        )
    })
}

/// Schedule an auction for a vehicle.
///
/// The vehicle must already exist in the catalog. The auction accepts bids
/// only within its time window.
#[utoipa::path(post, path = "/v1/auctions", request_body = CreateAuction, responses(
    (status = 200, description = "Auction was created successfully", body = Auction),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Vehicle was not found", body = ErrorBodyResponse),
),)]
pub async fn post_auction(
    _auth: Auth,
    State(store): State<Arc<Store>>,
    Json(params): Json<CreateAuction>,
) -> Result<Json<Auction>, RestError> {
    let auction = store
        .auction_service
        .add_auction(AddAuctionInput {
            vehicle_id:     params.vehicle_id,
            starting_price: parse_price(&params.starting_price)?,
            start_time:     params.start_time,
            end_time:       params.end_time,
        })
        .await?;
    Ok(Json(Auction::from_entity(
        &auction,
        OffsetDateTime::now_utc(),
    )))
}

/// Query an auction and its current winning state.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}",
    params(("auction_id"=String, description = "Auction id to query for")),
    responses(
    (status = 200, description = "The auction with its current winning state", body = Auction),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn get_auction(
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<entities::AuctionId>,
) -> Result<Json<Auction>, RestError> {
    let auction = store
        .auction_service
        .get_auction(GetAuctionInput { auction_id })
        .await?;
    Ok(Json(Auction::from_entity(
        &auction,
        OffsetDateTime::now_utc(),
    )))
}

/// Reschedule or reprice an auction.
///
/// Only allowed while the auction has no bids; once bidding has started the
/// terms are frozen.
#[utoipa::path(patch, path = "/v1/auctions/{auction_id}",
    params(("auction_id"=String, description = "Auction id to update")),
    request_body = UpdateAuction,
    responses(
    (status = 200, description = "The updated auction", body = Auction),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn patch_auction(
    _auth: Auth,
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<entities::AuctionId>,
    Json(params): Json<UpdateAuction>,
) -> Result<Json<Auction>, RestError> {
    let starting_price = params
        .starting_price
        .as_deref()
        .map(parse_price)
        .transpose()?;
    let auction = store
        .auction_service
        .update_auction(UpdateAuctionInput {
            auction_id,
            starting_price,
            start_time: params.start_time,
            end_time: params.end_time,
        })
        .await?;
    Ok(Json(Auction::from_entity(
        &auction,
        OffsetDateTime::now_utc(),
    )))
}

/// Remove an auction together with its bid history.
#[utoipa::path(delete, path = "/v1/auctions/{auction_id}",
    params(("auction_id"=String, description = "Auction id to delete")),
    responses(
    (status = 200, description = "Auction was deleted"),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn delete_auction(
    _auth: Auth,
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<entities::AuctionId>,
) -> Result<(), RestError> {
    store
        .auction_service
        .delete_auction(DeleteAuctionInput { auction_id })
        .await
}
