#[cfg(test)]
use mockall::automock;
use {
    super::entities,
    crate::{
        api::RestError,
        kernel::db::DB,
        models::{
            User,
            UserId,
        },
    },
    axum::async_trait,
    serde::{
        Deserialize,
        Serialize,
    },
    sqlx::{
        types::BigDecimal,
        FromRow,
        QueryBuilder,
    },
    std::fmt::Debug,
    time::{
        OffsetDateTime,
        PrimitiveDateTime,
        UtcOffset,
    },
    tracing::instrument,
};

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "auction_status", rename_all = "lowercase")]
pub enum AuctionStatus {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "product_condition", rename_all = "lowercase")]
pub enum ProductCondition {
    New,
    Used,
    Refurbished,
}

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "bid_outcome", rename_all = "lowercase")]
pub enum BidOutcome {
    Accepted,
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "reject_reason", rename_all = "snake_case")]
pub enum RejectReason {
    AuctionClosed,
    BidTooLow,
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

impl From<entities::BidOutcome> for BidOutcome {
    fn from(outcome: entities::BidOutcome) -> Self {
        match outcome {
            entities::BidOutcome::Accepted => BidOutcome::Accepted,
            entities::BidOutcome::Rejected => BidOutcome::Rejected,
        }
    }
}

impl From<BidOutcome> for entities::BidOutcome {
    fn from(outcome: BidOutcome) -> Self {
        match outcome {
            BidOutcome::Accepted => entities::BidOutcome::Accepted,
            BidOutcome::Rejected => entities::BidOutcome::Rejected,
        }
    }
}

impl From<entities::BidRejectReason> for RejectReason {
    fn from(reason: entities::BidRejectReason) -> Self {
        match reason {
            entities::BidRejectReason::AuctionClosed => RejectReason::AuctionClosed,
            entities::BidRejectReason::BidTooLow => RejectReason::BidTooLow,
        }
    }
}

impl From<RejectReason> for entities::BidRejectReason {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::AuctionClosed => entities::BidRejectReason::AuctionClosed,
            RejectReason::BidTooLow => entities::BidRejectReason::BidTooLow,
        }
    }
}

fn convert_amount(amount: &entities::BidAmount) -> BigDecimal {
    (*amount).into()
}

fn get_amount_entity(amount: &BigDecimal) -> anyhow::Result<entities::BidAmount> {
    amount
        .to_string()
        .parse()
        .map_err(|e: std::num::ParseIntError| anyhow::anyhow!(e))
}

fn convert_datetime(time: OffsetDateTime) -> PrimitiveDateTime {
    PrimitiveDateTime::new(time.date(), time.time())
}

#[derive(Clone, Debug, FromRow)]
pub struct Auction {
    pub id:              entities::AuctionId,
    pub product_name:    String,
    pub category:        String,
    pub description:     String,
    pub condition:       ProductCondition,
    pub status:          AuctionStatus,
    pub reserve_price:   BigDecimal,
    pub creation_time:   PrimitiveDateTime,
    pub end_time:        PrimitiveDateTime,
    pub conclusion_time: Option<PrimitiveDateTime>,
    pub winning_bid_id:  Option<entities::BidId>,
    pub highest_amount:  Option<BigDecimal>,
}

impl Auction {
    pub fn new(auction: &entities::Auction) -> Self {
        Self {
            id:              auction.id,
            product_name:    auction.product_name.clone(),
            category:        auction.category.clone(),
            description:     auction.description.clone(),
            condition:       auction.condition.into(),
            status:          auction.status.into(),
            reserve_price:   convert_amount(&auction.reserve_price),
            creation_time:   convert_datetime(auction.creation_time),
            end_time:        convert_datetime(auction.end_time),
            conclusion_time: auction.conclusion_time.map(convert_datetime),
            winning_bid_id:  auction.winning_bid_id,
            highest_amount:  auction.highest_amount.as_ref().map(convert_amount),
        }
    }

    pub fn get_auction_entity(&self) -> anyhow::Result<entities::Auction> {
        Ok(entities::Auction {
            id:              self.id,
            product_name:    self.product_name.clone(),
            category:        self.category.clone(),
            description:     self.description.clone(),
            condition:       self.condition.into(),
            status:          self.status.into(),
            reserve_price:   get_amount_entity(&self.reserve_price)?,
            creation_time:   self.creation_time.assume_offset(UtcOffset::UTC),
            end_time:        self.end_time.assume_offset(UtcOffset::UTC),
            conclusion_time: self
                .conclusion_time
                .map(|t| t.assume_offset(UtcOffset::UTC)),
            winning_bid_id:  self.winning_bid_id,
            highest_amount:  self
                .highest_amount
                .as_ref()
                .map(get_amount_entity)
                .transpose()?,
        })
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct Bid {
    pub id:            entities::BidId,
    pub auction_id:    entities::AuctionId,
    pub user_id:       UserId,
    pub amount:        BigDecimal,
    pub outcome:       BidOutcome,
    pub reject_reason: Option<RejectReason>,
    pub submitted_at:  PrimitiveDateTime,
    pub creation_time: PrimitiveDateTime,
}

impl Bid {
    pub fn new(bid: &entities::Bid) -> Self {
        Self {
            id:            bid.id,
            auction_id:    bid.auction_id,
            user_id:       bid.user_id,
            amount:        convert_amount(&bid.amount),
            outcome:       bid.outcome.into(),
            reject_reason: bid.reject_reason.map(Into::into),
            submitted_at:  convert_datetime(bid.submitted_at),
            creation_time: convert_datetime(bid.creation_time),
        }
    }

    pub fn get_bid_entity(&self) -> anyhow::Result<entities::Bid> {
        Ok(entities::Bid {
            id:            self.id,
            auction_id:    self.auction_id,
            user_id:       self.user_id,
            amount:        get_amount_entity(&self.amount)?,
            outcome:       self.outcome.into(),
            reject_reason: self.reject_reason.map(Into::into),
            submitted_at:  self.submitted_at.assume_offset(UtcOffset::UTC),
            creation_time: self.creation_time.assume_offset(UtcOffset::UTC),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct AuctionFilter {
    pub status:       Option<AuctionStatus>,
    pub category:     Option<String>,
    pub product_name: Option<String>,
}

impl From<entities::AuctionFilter> for AuctionFilter {
    fn from(filter: entities::AuctionFilter) -> Self {
        Self {
            status:       filter.status.map(Into::into),
            category:     filter.category,
            product_name: filter.product_name,
        }
    }
}

/// Result of the conditional insert-and-update that admits a bid. Conflict
/// means the auction's winning bid pointer no longer matched the expected
/// value and nothing was written.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AdmissionOutcome {
    Committed,
    Conflict,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    async fn add_auction(&self, auction: &Auction) -> Result<(), RestError>;
    async fn get_auction(&self, auction_id: entities::AuctionId) -> Result<Auction, RestError>;
    async fn get_auctions(&self, filter: AuctionFilter) -> Result<Vec<Auction>, RestError>;
    async fn submit_accepted_bid(
        &self,
        bid: &Bid,
        expected_winning_bid: Option<entities::BidId>,
    ) -> Result<AdmissionOutcome, RestError>;
    async fn add_rejected_bid(&self, bid: &Bid) -> Result<(), RestError>;
    async fn get_bid(&self, bid_id: entities::BidId) -> Result<Bid, RestError>;
    async fn get_bids_by_auction(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<Vec<Bid>, RestError>;
    async fn list_expired_auctions(
        &self,
        as_of: OffsetDateTime,
    ) -> Result<Vec<Auction>, RestError>;
    async fn conclude_auction(
        &self,
        auction_id: entities::AuctionId,
        conclusion_time: OffsetDateTime,
    ) -> Result<bool, RestError>;
    async fn get_user(&self, user_id: UserId) -> Result<User, RestError>;
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
    async fn add_auction(&self, auction: &Auction) -> Result<(), RestError> {
        sqlx::query(
            "INSERT INTO auction (id, product_name, category, description, condition, status, reserve_price, creation_time, end_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(auction.id)
        .bind(&auction.product_name)
        .bind(&auction.category)
        .bind(&auction.description)
        .bind(auction.condition)
        .bind(auction.status)
        .bind(&auction.reserve_price)
        .bind(auction.creation_time)
        .bind(auction.end_time)
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
        name = "db_get_auctions",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_auctions",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_auctions(&self, filter: AuctionFilter) -> Result<Vec<Auction>, RestError> {
        let mut query = QueryBuilder::new("SELECT * FROM auction WHERE 1 = 1");
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(product_name) = filter.product_name {
            query
                .push(" AND product_name ILIKE ")
                .push_bind(format!("%{}%", product_name));
        }
        query.push(" ORDER BY creation_time DESC LIMIT 100");
        query.build_query_as().fetch_all(self).await.map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!("DB: Failed to fetch auctions: {}", e);
            RestError::TemporarilyUnavailable
        })
    }

    #[instrument(
        target = "metrics",
        name = "db_submit_accepted_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "submit_accepted_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn submit_accepted_bid(
        &self,
        bid: &Bid,
        expected_winning_bid: Option<entities::BidId>,
    ) -> Result<AdmissionOutcome, RestError> {
        let mut tx = self.begin().await.map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), "DB: Failed to begin admission transaction");
            RestError::TemporarilyUnavailable
        })?;

        sqlx::query(
            "INSERT INTO bid (id, auction_id, user_id, amount, outcome, reject_reason, submitted_at, creation_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(bid.id)
        .bind(bid.auction_id)
        .bind(bid.user_id)
        .bind(&bid.amount)
        .bind(bid.outcome)
        .bind(bid.reject_reason)
        .bind(bid.submitted_at)
        .bind(bid.creation_time)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to insert accepted bid");
            RestError::TemporarilyUnavailable
        })?;

        // The guard makes the check-then-update race-free: the pointer must
        // still hold the value the admission check observed, and the auction
        // must still be open.
        let result = sqlx::query(
            "UPDATE auction SET winning_bid_id = $1, highest_amount = $2 \
             WHERE id = $3 AND status = $4 AND winning_bid_id IS NOT DISTINCT FROM $5",
        )
        .bind(bid.id)
        .bind(&bid.amount)
        .bind(bid.auction_id)
        .bind(AuctionStatus::Open)
        .bind(expected_winning_bid)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to update winning bid");
            RestError::TemporarilyUnavailable
        })?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| {
                tracing::Span::current().record("result", "error");
                tracing::error!(error = e.to_string(), "DB: Failed to roll back admission transaction");
                RestError::TemporarilyUnavailable
            })?;
            return Ok(AdmissionOutcome::Conflict);
        }

        tx.commit().await.map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), "DB: Failed to commit admission transaction");
            RestError::TemporarilyUnavailable
        })?;
        Ok(AdmissionOutcome::Committed)
    }

    #[instrument(
        target = "metrics",
        name = "db_add_rejected_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_rejected_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_rejected_bid(&self, bid: &Bid) -> Result<(), RestError> {
        sqlx::query(
            "INSERT INTO bid (id, auction_id, user_id, amount, outcome, reject_reason, submitted_at, creation_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(bid.id)
        .bind(bid.auction_id)
        .bind(bid.user_id)
        .bind(&bid.amount)
        .bind(bid.outcome)
        .bind(bid.reject_reason)
        .bind(bid.submitted_at)
        .bind(bid.creation_time)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to insert rejected bid");
            RestError::TemporarilyUnavailable
        })?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_bid(&self, bid_id: entities::BidId) -> Result<Bid, RestError> {
        sqlx::query_as("SELECT * FROM bid WHERE id = $1")
            .bind(bid_id)
            .fetch_one(self)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => RestError::BidNotFound,
                _ => {
                    tracing::Span::current().record("result", "error");
                    tracing::error!(
                        error = e.to_string(),
                        bid_id = bid_id.to_string(),
                        "Failed to get bid from db"
                    );
                    RestError::TemporarilyUnavailable
                }
            })
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bids_by_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bids_by_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_bids_by_auction(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<Vec<Bid>, RestError> {
        sqlx::query_as("SELECT * FROM bid WHERE auction_id = $1 ORDER BY creation_time ASC")
            .bind(auction_id)
            .fetch_all(self)
            .await
            .map_err(|e| {
                tracing::Span::current().record("result", "error");
                tracing::error!("DB: Failed to fetch bids: {}", e);
                RestError::TemporarilyUnavailable
            })
    }

    #[instrument(
        target = "metrics",
        name = "db_list_expired_auctions",
        fields(
            category = "db_queries",
            result = "success",
            name = "list_expired_auctions",
            tracing_enabled
        ),
        skip_all
    )]
    async fn list_expired_auctions(
        &self,
        as_of: OffsetDateTime,
    ) -> Result<Vec<Auction>, RestError> {
        sqlx::query_as(
            "SELECT * FROM auction WHERE status = $1 AND end_time <= $2 ORDER BY end_time ASC",
        )
        .bind(AuctionStatus::Open)
        .bind(convert_datetime(as_of))
        .fetch_all(self)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!("DB: Failed to list expired auctions: {}", e);
            RestError::TemporarilyUnavailable
        })
    }

    #[instrument(
        target = "metrics",
        name = "db_conclude_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "conclude_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn conclude_auction(
        &self,
        auction_id: entities::AuctionId,
        conclusion_time: OffsetDateTime,
    ) -> Result<bool, RestError> {
        let result = sqlx::query(
            "UPDATE auction SET status = $1, conclusion_time = $2 WHERE id = $3 AND status = $4",
        )
        .bind(AuctionStatus::Closed)
        .bind(convert_datetime(conclusion_time))
        .bind(auction_id)
        .bind(AuctionStatus::Open)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(
                error = e.to_string(),
                auction_id = auction_id.to_string(),
                "DB: Failed to conclude auction"
            );
            RestError::TemporarilyUnavailable
        })?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(
        target = "metrics",
        name = "db_get_user",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_user",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_user(&self, user_id: UserId) -> Result<User, RestError> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(self)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => RestError::UserNotFound,
                _ => {
                    tracing::Span::current().record("result", "error");
                    tracing::error!(
                        error = e.to_string(),
                        user_id = user_id.to_string(),
                        "Failed to get user from db"
                    );
                    RestError::TemporarilyUnavailable
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        uuid::Uuid,
    };

    #[test]
    fn test_amount_conversion_round_trips() {
        let amount: entities::BidAmount = 125_000;
        assert_eq!(get_amount_entity(&convert_amount(&amount)).unwrap(), amount);
    }

    #[test]
    fn test_bid_model_preserves_outcome_and_reason() {
        let now = OffsetDateTime::now_utc();
        let bid = entities::Bid::new_rejected(
            &entities::BidCreate {
                auction_id:   Uuid::new_v4(),
                user_id:      Uuid::new_v4(),
                amount:       50,
                submitted_at: now,
            },
            entities::BidRejectReason::BidTooLow,
        );
        let entity = Bid::new(&bid).get_bid_entity().unwrap();
        assert_eq!(entity.outcome, entities::BidOutcome::Rejected);
        assert_eq!(
            entity.reject_reason,
            Some(entities::BidRejectReason::BidTooLow)
        );
        assert_eq!(entity.amount, 50);
    }
}
