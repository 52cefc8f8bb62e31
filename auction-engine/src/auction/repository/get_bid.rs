use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    pub async fn get_bid(&self, bid_id: entities::BidId) -> Result<entities::Bid, RestError> {
        self.db.get_bid(bid_id).await?.get_bid_entity().map_err(|e| {
            tracing::error!(
                error = e.to_string(),
                bid_id = bid_id.to_string(),
                "Failed to convert bid to entity"
            );
            RestError::TemporarilyUnavailable
        })
    }
}
