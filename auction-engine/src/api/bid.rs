use {
    crate::{
        api::{
            ErrorBodyResponse,
            RestError,
        },
        auction::{
            entities,
            service::{
                get_auction_bids::GetAuctionBidsInput,
                submit_bid::SubmitBidInput,
                Service,
            },
        },
        models::UserId,
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
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BidOutcome {
    Accepted,
    Rejected,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BidRejectReason {
    AuctionClosed,
    BidTooLow,
}

impl From<entities::BidOutcome> for BidOutcome {
    fn from(outcome: entities::BidOutcome) -> Self {
        match outcome {
            entities::BidOutcome::Accepted => BidOutcome::Accepted,
            entities::BidOutcome::Rejected => BidOutcome::Rejected,
        }
    }
}

impl From<entities::BidRejectReason> for BidRejectReason {
    fn from(reason: entities::BidRejectReason) -> Self {
        match reason {
            entities::BidRejectReason::AuctionClosed => BidRejectReason::AuctionClosed,
            entities::BidRejectReason::BidTooLow => BidRejectReason::BidTooLow,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct Bid {
    /// The unique id of the bid.
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:            entities::BidId,
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id:    entities::AuctionId,
    #[schema(example = "ceedceed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub user_id:       UserId,
    /// Amount in minor currency units.
    #[schema(example = 2500)]
    pub amount:        u64,
    /// Whether the bid passed admission. A superseded bid stays accepted;
    /// consult the auction's winning bid for the current leader.
    pub outcome:       BidOutcome,
    pub reject_reason: Option<BidRejectReason>,
    #[schema(value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at:  OffsetDateTime,
}

impl From<entities::Bid> for Bid {
    fn from(bid: entities::Bid) -> Self {
        Self {
            id:            bid.id,
            auction_id:    bid.auction_id,
            user_id:       bid.user_id,
            amount:        bid.amount,
            outcome:       bid.outcome.into(),
            reject_reason: bid.reject_reason.map(Into::into),
            submitted_at:  bid.submitted_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct SubmitBidParams {
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id: entities::AuctionId,
    #[schema(example = "ceedceed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub user_id:    UserId,
    /// Amount in minor currency units; must strictly exceed the current high
    /// bid, or the reserve price for a first bid.
    #[schema(example = 2500)]
    pub amount:     u64,
}

#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone)]
pub struct BidResult {
    pub status: String,
    /// The unique id created to identify the bid. This id can be used to
    /// look the bid up in the auction's ledger.
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:     entities::BidId,
}

/// Submit a bid on an auction.
///
/// The bid is checked against the auction's state at the time of submission.
/// Accepted bids become the auction's leading bid; rejected submissions are
/// still recorded in the auction's ledger for audit.
#[utoipa::path(post, path = "/v1/bids", request_body = SubmitBidParams, responses(
    (status = 200, description = "Bid was accepted", body = BidResult,
    example = json!({"status": "OK", "id": "beedbeed-b346-4fa1-8fab-2541a9e1872d"})),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    (status = 409, description = "Lost a concurrent admission race, retry", body = ErrorBodyResponse),
    (status = 410, description = "Auction is closed for bidding", body = ErrorBodyResponse),
),)]
pub async fn post_bid(
    State(service): State<Service>,
    Json(params): Json<SubmitBidParams>,
) -> Result<Json<BidResult>, RestError> {
    let bid = service
        .submit_bid(SubmitBidInput {
            bid_create: entities::BidCreate {
                auction_id:   params.auction_id,
                user_id:      params.user_id,
                amount:       params.amount,
                submitted_at: OffsetDateTime::now_utc(),
            },
        })
        .await?;
    Ok(Json(BidResult {
        status: "OK".to_string(),
        id:     bid.id,
    }))
}

/// List every bid submitted against an auction, in submission order.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}/bids",
    params(("auction_id" = String, description = "Auction id to query for")),
    responses(
    (status = 200, description = "Bids of the auction", body = Vec<Bid>),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn get_auction_bids(
    State(service): State<Service>,
    Path(auction_id): Path<entities::AuctionId>,
) -> Result<Json<Vec<Bid>>, RestError> {
    let bids = service
        .get_auction_bids(GetAuctionBidsInput { auction_id })
        .await?;
    Ok(Json(bids.into_iter().map(Into::into).collect()))
}
