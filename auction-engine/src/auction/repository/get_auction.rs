use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    pub async fn get_auction(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<entities::Auction, RestError> {
        self.db
            .get_auction(auction_id)
            .await?
            .get_auction_entity()
            .map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    auction_id = auction_id.to_string(),
                    "Failed to convert auction to entity"
                );
                RestError::TemporarilyUnavailable
            })
    }
}
