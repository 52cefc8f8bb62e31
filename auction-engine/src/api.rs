use {
    crate::{
        auction::{
            entities::BidAmount,
            service::Service,
        },
        config::RunOptions,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
    },
    anyhow::Result,
    axum::{
        http::StatusCode,
        response::{
            IntoResponse,
            Response,
        },
        routing::get,
        Json,
        Router,
    },
    axum_prometheus::PrometheusMetricLayer,
    clap::crate_version,
    serde::Serialize,
    std::{
        fmt,
        sync::atomic::Ordering,
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
};

pub(crate) mod auction;
pub(crate) mod bid;
pub(crate) mod user;

async fn root() -> String {
    format!("Auction Engine API {}", crate_version!())
}

#[derive(Clone, Debug, PartialEq)]
pub enum RestError {
    /// The request contained invalid parameters.
    BadParameters(String),
    /// The auction was not found.
    AuctionNotFound,
    /// The auction is closed or its end time has passed.
    AuctionClosed,
    /// The bid amount does not exceed the current high bid or the reserve.
    BidTooLow { minimum: BidAmount },
    /// The admission race was lost repeatedly; the submission can be retried.
    Conflict,
    /// The bid was not found.
    BidNotFound,
    /// The user was not found.
    UserNotFound,
    /// Internal error occurred during processing the request.
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::BadParameters(msg) => {
                (StatusCode::BAD_REQUEST, format!("Bad parameters: {}", msg))
            }
            RestError::AuctionNotFound => (
                StatusCode::NOT_FOUND,
                "Auction with the specified id was not found".to_string(),
            ),
            RestError::AuctionClosed => (
                StatusCode::GONE,
                "Auction is closed for bidding".to_string(),
            ),
            RestError::BidTooLow { minimum } => (
                StatusCode::BAD_REQUEST,
                format!("Bid amount must be greater than {}", minimum),
            ),
            RestError::Conflict => (
                StatusCode::CONFLICT,
                "Another bid was admitted concurrently, please retry".to_string(),
            ),
            RestError::BidNotFound => (
                StatusCode::NOT_FOUND,
                "Bid with the specified id was not found".to_string(),
            ),
            RestError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "User with the specified id was not found".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_status_and_message().1)
    }
}

#[derive(ToResponse, ToSchema, Serialize)]
#[response(description = "An error occurred processing the request")]
pub struct ErrorBodyResponse {
    error: String,
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg })).into_response()
    }
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

pub async fn start_api(
    run_options: RunOptions,
    service: Service,
    metrics_layer: PrometheusMetricLayer<'static>,
) -> Result<()> {
    // Make sure functions included in the paths section have distinct names,
    // otherwise some api generators will fail
    #[derive(OpenApi)]
    #[openapi(
    paths(
    auction::post_auction,
    auction::get_auctions,
    auction::get_auction,
    auction::get_auction_winner,
    bid::post_bid,
    bid::get_auction_bids,
    user::get_user,
    ),
    components(
    schemas(
    auction::Auction,
    auction::AuctionStatus,
    auction::ProductCondition,
    auction::CreateAuctionParams,
    auction::WinnerResponse,
    bid::Bid,
    bid::BidOutcome,
    bid::BidRejectReason,
    bid::SubmitBidParams,
    bid::BidResult,
    user::User,
    ErrorBodyResponse,
    ),
    responses(
    ErrorBodyResponse,
    ),
    ),
    tags(
    (name = "Auction Engine", description = "The auction engine admits bids against live auctions, \
    keeps an append-only ledger of every submission attempt, and closes auctions whose end time has passed.")
    )
    )]
    struct ApiDoc;

    let auction_routes = Router::new()
        .route(
            "/",
            axum::routing::post(auction::post_auction).get(auction::get_auctions),
        )
        .route("/:auction_id", get(auction::get_auction))
        .route("/:auction_id/winner", get(auction::get_auction_winner))
        .route("/:auction_id/bids", get(bid::get_auction_bids));
    let bid_routes = Router::new().route("/", axum::routing::post(bid::post_bid));
    let user_routes = Router::new().route("/:user_id", get(user::get_user));

    let v1_routes = Router::new().nest(
        "/v1",
        Router::new()
            .nest("/auctions", auction_routes)
            .nest("/bids", bid_routes)
            .nest("/users", user_routes),
    );

    let app: Router<()> = Router::new()
        .merge(Redoc::with_url("/docs", ApiDoc::openapi()))
        .merge(v1_routes)
        .route("/", get(root))
        .route("/live", get(live))
        .layer(CorsLayer::permissive())
        .layer(metrics_layer)
        .with_state(service);

    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    tracing::info!(address = %run_options.server.listen_addr, "Starting API server...");
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
