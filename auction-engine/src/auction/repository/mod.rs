use {
    super::entities,
    std::sync::Arc,
};

mod add_auction;
mod add_rejected_bid;
mod conclude_auction;
mod get_auction;
mod get_auctions;
mod get_bid;
mod get_bids_by_auction;
mod get_user;
mod list_expired_auctions;
mod models;
mod submit_accepted_bid;

pub use models::*;

#[derive(Debug)]
pub struct Repository {
    db: Arc<dyn Database>,
}

impl Repository {
    pub fn new(db: impl Database) -> Self {
        Self { db: Arc::new(db) }
    }
}
