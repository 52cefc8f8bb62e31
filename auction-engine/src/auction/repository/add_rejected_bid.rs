use {
    super::{
        models,
        Repository,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    /// Append the audit record for a rejected submission. The ledger keeps
    /// every attempt, not only winners.
    pub async fn add_rejected_bid(&self, bid: &entities::Bid) -> Result<(), RestError> {
        self.db.add_rejected_bid(&models::Bid::new(bid)).await
    }
}
