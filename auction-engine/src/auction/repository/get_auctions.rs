use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    pub async fn get_auctions(
        &self,
        filter: entities::AuctionFilter,
    ) -> Result<Vec<entities::Auction>, RestError> {
        self.db
            .get_auctions(filter.into())
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
