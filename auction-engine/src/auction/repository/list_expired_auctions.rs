use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
    time::OffsetDateTime,
};

impl Repository {
    /// Open auctions whose end time is at or before `as_of`, ordered by end
    /// time. Re-queried on every sweep, so an interrupted sweep simply picks
    /// the remainder up next time.
    pub async fn list_expired_auctions(
        &self,
        as_of: OffsetDateTime,
    ) -> Result<Vec<entities::Auction>, RestError> {
        self.db
            .list_expired_auctions(as_of)
            .await?
            .iter()
            .map(|auction| {
                auction.get_auction_entity().map_err(|e| {
                    tracing::error!(
                        error = e.to_string(),
                        auction_id = auction.id.to_string(),
                        "Failed to convert auction to entity"
                    );
                    RestError::TemporarilyUnavailable
                })
            })
            .collect()
    }
}
