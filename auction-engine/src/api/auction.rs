use {
    crate::{
        api::{
            ErrorBodyResponse,
            RestError,
        },
        auction::{
            entities,
            service::{
                create_auction::CreateAuctionInput,
                get_auction::GetAuctionInput,
                get_auctions::GetAuctionsInput,
                get_winning_bid::GetWinningBidInput,
                Service,
            },
        },
    },
    axum::{
        extract::{
            Path,
            Query,
            State,
        },
        Json,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::{
        IntoParams,
        ToSchema,
    },
    uuid::Uuid,
};

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Open,
    Closed,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ProductCondition {
    New,
    Used,
    Refurbished,
}

impl From<entities::AuctionStatus> for AuctionStatus {
    fn from(status: entities::AuctionStatus) -> Self {
        match status {
            entities::AuctionStatus::Open => AuctionStatus::Open,
            entities::AuctionStatus::Closed => AuctionStatus::Closed,
        }
    }
}

impl From<AuctionStatus> for entities::AuctionStatus {
    fn from(status: AuctionStatus) -> Self {
        match status {
            AuctionStatus::Open => entities::AuctionStatus::Open,
            AuctionStatus::Closed => entities::AuctionStatus::Closed,
        }
    }
}

impl From<entities::ProductCondition> for ProductCondition {
    fn from(condition: entities::ProductCondition) -> Self {
        match condition {
            entities::ProductCondition::New => ProductCondition::New,
            entities::ProductCondition::Used => ProductCondition::Used,
            entities::ProductCondition::Refurbished => ProductCondition::Refurbished,
        }
    }
}

impl From<ProductCondition> for entities::ProductCondition {
    fn from(condition: ProductCondition) -> Self {
        match condition {
            ProductCondition::New => entities::ProductCondition::New,
            ProductCondition::Used => entities::ProductCondition::Used,
            ProductCondition::Refurbished => entities::ProductCondition::Refurbished,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct Auction {
    /// The unique id of the auction.
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:              entities::AuctionId,
    /// Name of the product on sale.
    #[schema(example = "Turntable")]
    pub product_name:    String,
    #[schema(example = "electronics")]
    pub category:        String,
    #[schema(example = "a belt-drive turntable in working order")]
    pub description:     String,
    pub condition:       ProductCondition,
    pub status:          AuctionStatus,
    /// Amount a first bid has to exceed, in minor currency units.
    #[schema(example = 1000)]
    pub reserve_price:   u64,
    #[schema(value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub creation_time:   OffsetDateTime,
    /// Bids submitted at or after this instant are rejected.
    #[schema(value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:        OffsetDateTime,
    #[schema(value_type = Option<String>)]
    #[serde(with = "time::serde::rfc3339::option")]
    pub conclusion_time: Option<OffsetDateTime>,
    /// The currently leading bid, when one exists.
    #[schema(value_type = Option<String>)]
    pub winning_bid_id:  Option<Uuid>,
    pub highest_amount:  Option<u64>,
}

impl From<entities::Auction> for Auction {
    fn from(auction: entities::Auction) -> Self {
        Self {
            id:              auction.id,
            product_name:    auction.product_name,
            category:        auction.category,
            description:     auction.description,
            condition:       auction.condition.into(),
            status:          auction.status.into(),
            reserve_price:   auction.reserve_price,
            creation_time:   auction.creation_time,
            end_time:        auction.end_time,
            conclusion_time: auction.conclusion_time,
            winning_bid_id:  auction.winning_bid_id,
            highest_amount:  auction.highest_amount,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct CreateAuctionParams {
    #[schema(example = "Turntable")]
    pub product_name:  String,
    #[schema(example = "electronics")]
    pub category:      String,
    #[schema(example = "a belt-drive turntable in working order")]
    pub description:   String,
    pub condition:     ProductCondition,
    /// Defaults to the configured reserve when omitted.
    pub reserve_price: Option<u64>,
    /// Defaults to now plus the configured auction duration when omitted.
    #[schema(value_type = Option<String>)]
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time:      Option<OffsetDateTime>,
}

#[derive(Serialize, Deserialize, IntoParams)]
pub struct GetAuctionsQueryParams {
    #[param(value_type = Option<AuctionStatus>)]
    pub status:       Option<AuctionStatus>,
    #[param(example = "electronics", value_type = Option<String>)]
    pub category:     Option<String>,
    /// Case-insensitive substring match on the product name.
    #[param(example = "turntable", value_type = Option<String>)]
    pub product_name: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct WinnerResponse {
    pub auction:     Auction,
    /// Absent when the auction has no accepted bid.
    pub winning_bid: Option<super::bid::Bid>,
}

/// Register a new auction.
///
/// Bidding opens immediately and stays open until the end time passes.
#[utoipa::path(post, path = "/v1/auctions", request_body = CreateAuctionParams, responses(
    (status = 200, description = "The created auction", body = Auction),
    (status = 400, response = ErrorBodyResponse),
),)]
pub async fn post_auction(
    State(service): State<Service>,
    Json(params): Json<CreateAuctionParams>,
) -> Result<Json<Auction>, RestError> {
    let auction = service
        .create_auction(CreateAuctionInput {
            product_name:  params.product_name,
            category:      params.category,
            description:   params.description,
            condition:     params.condition.into(),
            reserve_price: params.reserve_price,
            end_time:      params.end_time,
        })
        .await?;
    Ok(Json(auction.into()))
}

/// List auctions, optionally filtered by status, category, or product name.
#[utoipa::path(get, path = "/v1/auctions", params(GetAuctionsQueryParams), responses(
    (status = 200, description = "Matching auctions", body = Vec<Auction>),
    (status = 400, response = ErrorBodyResponse),
),)]
pub async fn get_auctions(
    State(service): State<Service>,
    Query(params): Query<GetAuctionsQueryParams>,
) -> Result<Json<Vec<Auction>>, RestError> {
    let auctions = service
        .get_auctions(GetAuctionsInput {
            filter: entities::AuctionFilter {
                status:       params.status.map(Into::into),
                category:     params.category,
                product_name: params.product_name,
            },
        })
        .await?;
    Ok(Json(auctions.into_iter().map(Into::into).collect()))
}

/// Fetch an auction by id.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}",
    params(("auction_id" = String, description = "Auction id to query for")),
    responses(
    (status = 200, description = "The auction", body = Auction),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn get_auction(
    State(service): State<Service>,
    Path(auction_id): Path<entities::AuctionId>,
) -> Result<Json<Auction>, RestError> {
    let auction = service.get_auction(GetAuctionInput { auction_id }).await?;
    Ok(Json(auction.into()))
}

/// Fetch an auction together with its winning bid.
///
/// The winning bid is the currently leading bid while the auction is open
/// and the final winner once it closes; it is absent when no bid has been
/// accepted.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}/winner",
    params(("auction_id" = String, description = "Auction id to query for")),
    responses(
    (status = 200, description = "The auction and its winning bid", body = WinnerResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn get_auction_winner(
    State(service): State<Service>,
    Path(auction_id): Path<entities::AuctionId>,
) -> Result<Json<WinnerResponse>, RestError> {
    let (auction, winning_bid) = service
        .get_winning_bid(GetWinningBidInput { auction_id })
        .await?;
    Ok(Json(WinnerResponse {
        auction:     auction.into(),
        winning_bid: winning_bid.map(Into::into),
    }))
}
