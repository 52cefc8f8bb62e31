use {
    super::{
        conclude_auction::ConcludeAuctionInput,
        Service,
    },
    time::OffsetDateTime,
};

impl Service {
    /// One sweep pass: close every open auction whose end time has passed.
    /// Each closure runs as its own task; a failure on one auction does not
    /// keep the others open.
    pub async fn conclude_auctions(&self) {
        let as_of = OffsetDateTime::now_utc();
        let auctions = match self.repo.list_expired_auctions(as_of).await {
            Ok(auctions) => auctions,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to list expired auctions");
                return;
            }
        };
        if auctions.is_empty() {
            return;
        }
        tracing::info!(count = auctions.len(), "Concluding expired auctions...");
        for auction in auctions {
            self.task_tracker.spawn({
                let service = self.clone();
                async move {
                    let result = service
                        .conclude_auction(ConcludeAuctionInput {
                            auction_id: auction.id,
                        })
                        .await;
                    if let Err(err) = result {
                        tracing::error!(
                            error = ?err,
                            auction_id = ?auction.id,
                            "Failed to conclude auction",
                        );
                    }
                }
            });
        }
    }
}
