use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
    time::OffsetDateTime,
};

impl Repository {
    /// Returns false when the auction was already closed, which is a no-op
    /// for the caller rather than an error.
    #[tracing::instrument(skip_all, name = "conclude_auction_repo", fields(auction_id = %auction_id))]
    pub async fn conclude_auction(
        &self,
        auction_id: entities::AuctionId,
        conclusion_time: OffsetDateTime,
    ) -> Result<bool, RestError> {
        self.db.conclude_auction(auction_id, conclusion_time).await
    }
}
