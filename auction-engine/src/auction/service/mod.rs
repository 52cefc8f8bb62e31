use {
    super::repository::{
        Database,
        Repository,
    },
    std::{
        sync::Arc,
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

pub mod conclude_auction;
pub mod conclude_auctions;
pub mod create_auction;
pub mod get_auction;
pub mod get_auction_bids;
pub mod get_auctions;
pub mod get_user;
pub mod get_winning_bid;
pub mod submit_bid;
pub mod verification;
pub mod workers;

#[derive(Clone, Debug)]
pub struct Config {
    /// How often the lifecycle sweep looks for expired open auctions.
    pub sweep_interval:        Duration,
    /// Default lifetime of a new auction when the request carries no end
    /// time.
    pub auction_duration:      Duration,
    /// Reserve price applied to new auctions that do not specify one.
    pub default_reserve_price: u64,
}

pub struct ServiceInner {
    config:       Config,
    repo:         Arc<Repository>,
    task_tracker: TaskTracker,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(db: impl Database, config: Config) -> Self {
        Self(Arc::new(ServiceInner {
            config,
            repo: Arc::new(Repository::new(db)),
            task_tracker: TaskTracker::new(),
        }))
    }
}

#[cfg(test)]
pub mod tests {
    use {
        super::*,
        crate::auction::repository::MockDatabase,
    };

    impl Service {
        pub fn new_with_mock_db(db: MockDatabase) -> Self {
            Service::new(
                db,
                Config {
                    sweep_interval:        Duration::from_secs(10),
                    auction_duration:      Duration::from_secs(3600),
                    default_reserve_price: 0,
                },
            )
        }
    }
}
