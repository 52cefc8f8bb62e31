use {
    super::Service,
    crate::auction::entities,
    time::OffsetDateTime,
};

pub struct ConcludeAuctionInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    /// Transition an auction to Closed. Closing an already-closed auction is
    /// a no-op: the conditional update affects no row and nothing else runs.
    #[tracing::instrument(skip_all, fields(auction_id = %input.auction_id))]
    pub async fn conclude_auction(&self, input: ConcludeAuctionInput) -> anyhow::Result<()> {
        let closed = self
            .repo
            .conclude_auction(input.auction_id, OffsetDateTime::now_utc())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to conclude auction: {:?}", e))?;
        if !closed {
            tracing::debug!(auction_id = %input.auction_id, "Auction was already closed");
            return Ok(());
        }

        let auction = self
            .repo
            .get_auction(input.auction_id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get concluded auction: {:?}", e))?;
        match auction.winning_bid_id {
            Some(winning_bid_id) => tracing::info!(
                auction_id = %auction.id,
                winning_bid_id = %winning_bid_id,
                "Auction closed with a winner"
            ),
            None => tracing::info!(
                auction_id = %auction.id,
                "Auction closed without any accepted bid"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::repository::{
            self,
            MockDatabase,
        },
        sqlx::types::BigDecimal,
        time::{
            Duration,
            OffsetDateTime,
            PrimitiveDateTime,
        },
        uuid::Uuid,
    };

    fn closed_auction_row(winning_bid: Option<Uuid>) -> repository::Auction {
        let now = OffsetDateTime::now_utc() - Duration::seconds(5);
        repository::Auction {
            id: Uuid::new_v4(),
            product_name: "Turntable".to_string(),
            category: "electronics".to_string(),
            description: "a belt-drive turntable".to_string(),
            condition: repository::ProductCondition::Used,
            status: repository::AuctionStatus::Closed,
            reserve_price: BigDecimal::from(0u64),
            creation_time: PrimitiveDateTime::new(now.date(), now.time()),
            end_time: PrimitiveDateTime::new(now.date(), now.time()),
            conclusion_time: Some(PrimitiveDateTime::new(now.date(), now.time())),
            winning_bid_id: winning_bid,
            highest_amount: winning_bid.map(|_| BigDecimal::from(20u64)),
        }
    }

    #[tokio::test]
    async fn test_conclude_closes_and_reads_winner() {
        let auction = closed_auction_row(Some(Uuid::new_v4()));
        let auction_id = auction.id;

        let mut db = MockDatabase::default();
        db.expect_conclude_auction()
            .times(1)
            .returning(|_, _| Ok(true));
        db.expect_get_auction()
            .times(1)
            .returning(move |_| Ok(auction.clone()));

        let service = Service::new_with_mock_db(db);
        service
            .conclude_auction(ConcludeAuctionInput { auction_id })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_second_conclude_is_a_no_op() {
        // The database reports no row transitioned; no further reads or
        // writes happen.
        let mut db = MockDatabase::default();
        db.expect_conclude_auction()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = Service::new_with_mock_db(db);
        service
            .conclude_auction(ConcludeAuctionInput {
                auction_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
    }
}
