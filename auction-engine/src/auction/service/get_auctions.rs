use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

pub struct GetAuctionsInput {
    pub filter: entities::AuctionFilter,
}

impl Service {
    pub async fn get_auctions(
        &self,
        input: GetAuctionsInput,
    ) -> Result<Vec<entities::Auction>, RestError> {
        self.repo.get_auctions(input.filter).await
    }
}
