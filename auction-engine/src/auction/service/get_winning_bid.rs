use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

pub struct GetWinningBidInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    /// The winner is derived from the auction's winning bid pointer, never
    /// recomputed from the ledger. An auction without a pointer ended (or
    /// will end) without a winner.
    pub async fn get_winning_bid(
        &self,
        input: GetWinningBidInput,
    ) -> Result<(entities::Auction, Option<entities::Bid>), RestError> {
        let auction = self.repo.get_auction(input.auction_id).await?;
        let winning_bid = match auction.winning_bid_id {
            Some(bid_id) => Some(self.repo.get_bid(bid_id).await?),
            None => None,
        };
        Ok((auction, winning_bid))
    }
}
