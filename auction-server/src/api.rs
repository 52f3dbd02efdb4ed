use {
    crate::{
        config::RunOptions,
        kernel::entities::BidderId,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::Store,
    },
    anyhow::Result,
    axum::{
        async_trait,
        extract::FromRequestParts,
        http::{
            request::Parts,
            StatusCode,
        },
        response::{
            IntoResponse,
            Response,
        },
        routing::{
            get,
            post,
        },
        Json,
        Router,
    },
    axum_extra::{
        headers::{
            authorization::Bearer,
            Authorization,
        },
        TypedHeader,
    },
    axum_prometheus::PrometheusMetricLayer,
    clap::crate_version,
    serde::Serialize,
    sqlx::types::BigDecimal,
    std::{
        str::FromStr,
        sync::{
            atomic::Ordering,
            Arc,
        },
    },
    tower_http::cors::CorsLayer,
    utoipa::{
        OpenApi,
        ToResponse,
        ToSchema,
    },
    utoipa_redoc::{
        Redoc,
        Servable,
    },
    uuid::Uuid,
};

async fn root() -> String {
    format!("Vehicle Auction Server API {}", crate_version!())
}

pub mod auction;
pub mod bid;

#[derive(Clone, Debug, PartialEq)]
pub enum RestError {
    /// The request contained invalid parameters
    BadParameters(String),
    /// The bid did not pass validation
    BidRejected(crate::auction::entities::BidRejection),
    /// The bearer token is missing or malformed
    Unauthorized,
    /// The auction was not found
    AuctionNotFound,
    /// The vehicle was not found
    VehicleNotFound,
    /// The auction is under too much contention to serve this request
    Busy,
    /// Internal error occurred during processing the request
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::BadParameters(msg) => {
                (StatusCode::BAD_REQUEST, format!("Bad parameters: {}", msg))
            }
            RestError::BidRejected(reason) => {
                (StatusCode::BAD_REQUEST, reason.message().to_string())
            }
            RestError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Invalid or missing bearer token".to_string(),
            ),
            RestError::AuctionNotFound => (
                StatusCode::NOT_FOUND,
                "Auction with the specified id was not found".to_string(),
            ),
            RestError::VehicleNotFound => (
                StatusCode::NOT_FOUND,
                "Vehicle with the specified id was not found".to_string(),
            ),
            RestError::Busy => (
                StatusCode::CONFLICT,
                "The auction is receiving too many concurrent bids, try again".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl std::fmt::Display for RestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (_, msg) = self.to_status_and_message();
        write!(f, "{}", msg)
    }
}

#[derive(ToResponse, ToSchema, Serialize)]
#[response(description = "An error occurred processing the request")]
pub struct ErrorBodyResponse {
    error:  String,
    /// Machine-readable rejection code, present when a bid was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "bid_too_low")]
    reason: Option<String>,
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let reason = match &self {
            RestError::BidRejected(reason) => Some(reason.to_string()),
            _ => None,
        };
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg, reason })).into_response()
    }
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// Parses a wire amount into the exact decimal the ledger stores.
/// The ledger columns are NUMERIC(12, 2): amounts with more than two
/// fractional digits or ten integer digits do not round-trip through
/// Postgres and are rejected here.
pub(crate) fn parse_amount(value: &str) -> Option<BigDecimal> {
    let amount = BigDecimal::from_str(value).ok()?.normalized();
    let (_, exponent) = amount.as_bigint_and_exponent();
    if exponent > 2 {
        return None;
    }
    if amount.abs() >= BigDecimal::from(10_000_000_000_i64) {
        return None;
    }
    Some(amount)
}

/// The caller's identity, taken from the bearer token. Token issuance and
/// verification live at the gateway; this server trusts the identity it is
/// handed.
pub struct Auth {
    pub principal: BidderId,
}

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(token) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| RestError::Unauthorized)?;
        let principal = Uuid::parse_str(token.token()).map_err(|_| RestError::Unauthorized)?;
        Ok(Self { principal })
    }
}

pub async fn start_api(run_options: RunOptions, store: Arc<Store>) -> Result<()> {
    // Make sure functions included in the paths section have distinct names, otherwise some api generators will fail
    #[derive(OpenApi)]
    #[openapi(
    paths(
    auction::post_auction,
    auction::get_auction,
    auction::patch_auction,
    auction::delete_auction,
    bid::post_bid,
    bid::get_bids,
    ),
    components(
    schemas(
    auction::Auction,
    auction::CreateAuction,
    auction::UpdateAuction,
    bid::Bid,
    bid::BidResult,
    bid::CreateBid,
    ErrorBodyResponse,
    ),
    responses(
    ErrorBodyResponse,
    ),
    ),
    tags(
    (name = "Vehicle Auction Server", description = "The auction server runs timed sales for marketplace vehicles.\
    It accepts bids from dealers, validates them against the live auction state and records the winning bid.")
    )
    )]
    struct ApiDoc;

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let auction_routes = Router::new()
        .route("/", post(auction::post_auction))
        .route(
            "/:auction_id",
            get(auction::get_auction)
                .patch(auction::patch_auction)
                .delete(auction::delete_auction),
        )
        .route(
            "/:auction_id/bids",
            post(bid::post_bid).get(bid::get_bids),
        );

    let v1_routes = Router::new().nest("/v1", Router::new().nest("/auctions", auction_routes));

    let app: Router<()> = Router::new()
        .merge(Redoc::with_url("/docs", ApiDoc::openapi()))
        .merge(v1_routes)
        .route("/", get(root))
        .route("/live", get(live))
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer)
        .layer(CorsLayer::permissive())
        .with_state(store);

    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    tracing::info!(
        listen_addr = run_options.server.listen_addr,
        "Starting API server..."
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down API server...");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_keep_the_ledger_scale() {
        assert!(parse_amount("12500.00").is_some());
        assert!(parse_amount("12500").is_some());
        assert!(parse_amount("100.50").is_some());
        // Trailing zeros beyond the scale are still exact.
        assert!(parse_amount("100.500").is_some());

        // Postgres would round these on write.
        assert!(parse_amount("100.004").is_none());
        assert!(parse_amount("0.001").is_none());

        // Integer precision of the ledger columns.
        assert!(parse_amount("9999999999.99").is_some());
        assert!(parse_amount("10000000000").is_none());

        assert!(parse_amount("not-a-number").is_none());
        assert!(parse_amount("").is_none());
    }

    #[test]
    fn parsed_amounts_equal_their_stored_form() {
        let amount = parse_amount("100.500").unwrap();
        assert_eq!(amount, BigDecimal::from_str("100.5").unwrap());
    }
}
