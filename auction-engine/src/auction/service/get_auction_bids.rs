use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

pub struct GetAuctionBidsInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    /// The full ledger for one auction, accepted and rejected rows alike, in
    /// insertion order.
    pub async fn get_auction_bids(
        &self,
        input: GetAuctionBidsInput,
    ) -> Result<Vec<entities::Bid>, RestError> {
        // Resolve the auction first so an unknown id is NotFound rather than
        // an empty list.
        self.repo.get_auction(input.auction_id).await?;
        self.repo.get_bids_by_auction(input.auction_id).await
    }
}
