use {
    super::{
        models,
        AdmissionOutcome,
        Repository,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    /// Insert an accepted bid and move the auction's winning bid pointer to
    /// it, conditional on the pointer still holding `expected_winning_bid`.
    /// On Conflict nothing is persisted.
    #[tracing::instrument(skip_all, fields(bid_id = %bid.id, auction_id = %bid.auction_id))]
    pub async fn submit_accepted_bid(
        &self,
        bid: &entities::Bid,
        expected_winning_bid: Option<entities::BidId>,
    ) -> Result<AdmissionOutcome, RestError> {
        self.db
            .submit_accepted_bid(&models::Bid::new(bid), expected_winning_bid)
            .await
    }
}
