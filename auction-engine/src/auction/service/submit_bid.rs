use {
    super::{
        verification::verify_bid,
        Service,
    },
    crate::{
        api::RestError,
        auction::{
            entities,
            repository::AdmissionOutcome,
        },
    },
};

/// How many times a lost admission race is re-run from a fresh read before
/// Conflict is surfaced to the caller.
pub const SUBMIT_BID_RETRY_LIMIT: usize = 3;

pub struct SubmitBidInput {
    pub bid_create: entities::BidCreate,
}

impl Service {
    /// Admit or reject a bid. Every attempt that reaches an existing auction
    /// leaves a ledger record; only the admission check and the conditional
    /// pointer update decide which side of the ledger it lands on.
    #[tracing::instrument(
        skip_all,
        fields(auction_id = %input.bid_create.auction_id, bid_id, amount = input.bid_create.amount),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn submit_bid(&self, input: SubmitBidInput) -> Result<entities::Bid, RestError> {
        let bid_create = input.bid_create;
        let mut attempts = 0;
        loop {
            let auction = self.repo.get_auction(bid_create.auction_id).await?;
            if let Err(reason) = verify_bid(&auction, &bid_create) {
                let bid = entities::Bid::new_rejected(&bid_create, reason);
                self.repo.add_rejected_bid(&bid).await?;
                return Err(match reason {
                    entities::BidRejectReason::AuctionClosed => RestError::AuctionClosed,
                    entities::BidRejectReason::BidTooLow => RestError::BidTooLow {
                        minimum: auction.amount_to_beat() + 1,
                    },
                });
            }

            let bid = entities::Bid::new_accepted(&bid_create);
            match self
                .repo
                .submit_accepted_bid(&bid, auction.winning_bid_id)
                .await?
            {
                AdmissionOutcome::Committed => {
                    tracing::Span::current().record("bid_id", bid.id.to_string());
                    tracing::info!(
                        auction_id = %bid.auction_id,
                        bid_id = %bid.id,
                        amount = bid.amount,
                        "Bid accepted"
                    );
                    return Ok(bid);
                }
                AdmissionOutcome::Conflict => {
                    attempts += 1;
                    tracing::debug!(
                        auction_id = %bid_create.auction_id,
                        attempts,
                        "Lost admission race, re-running checks"
                    );
                    if attempts >= SUBMIT_BID_RETRY_LIMIT {
                        return Err(RestError::Conflict);
                    }
                }
            }
        }
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
        mockall::Sequence,
        sqlx::types::BigDecimal,
        time::{
            Duration,
            OffsetDateTime,
            PrimitiveDateTime,
        },
        uuid::Uuid,
    };

    fn primitive_now_plus(offset_secs: i64) -> PrimitiveDateTime {
        let t = OffsetDateTime::now_utc() + Duration::seconds(offset_secs);
        PrimitiveDateTime::new(t.date(), t.time())
    }

    fn auction_row(
        reserve_price: u64,
        winning_bid: Option<(Uuid, u64)>,
        ends_in_secs: i64,
    ) -> repository::Auction {
        repository::Auction {
            id: Uuid::new_v4(),
            product_name: "Turntable".to_string(),
            category: "electronics".to_string(),
            description: "a belt-drive turntable".to_string(),
            condition: repository::ProductCondition::Used,
            status: repository::AuctionStatus::Open,
            reserve_price: BigDecimal::from(reserve_price),
            creation_time: primitive_now_plus(-600),
            end_time: primitive_now_plus(ends_in_secs),
            conclusion_time: None,
            winning_bid_id: winning_bid.map(|(id, _)| id),
            highest_amount: winning_bid.map(|(_, amount)| BigDecimal::from(amount)),
        }
    }

    fn bid_create(auction_id: Uuid, amount: u64) -> entities::BidCreate {
        entities::BidCreate {
            auction_id,
            user_id: Uuid::new_v4(),
            amount,
            submitted_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_first_bid_above_reserve_is_accepted() {
        let auction = auction_row(10, None, 600);
        let auction_id = auction.id;

        let mut db = MockDatabase::default();
        db.expect_get_auction()
            .returning(move |_| Ok(auction.clone()));
        db.expect_submit_accepted_bid()
            .withf(|bid, expected| {
                bid.outcome == repository::BidOutcome::Accepted
                    && bid.amount == BigDecimal::from(20u64)
                    && expected.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(repository::AdmissionOutcome::Committed));

        let service = Service::new_with_mock_db(db);
        let bid = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(auction_id, 20),
            })
            .await
            .unwrap();
        assert_eq!(bid.outcome, entities::BidOutcome::Accepted);
        assert_eq!(bid.amount, 20);
    }

    #[tokio::test]
    async fn test_bid_not_exceeding_high_bid_is_rejected_and_recorded() {
        let leader = Uuid::new_v4();
        let auction = auction_row(0, Some((leader, 150)), 600);
        let auction_id = auction.id;

        let mut db = MockDatabase::default();
        db.expect_get_auction()
            .returning(move |_| Ok(auction.clone()));
        db.expect_add_rejected_bid()
            .withf(|bid| {
                bid.outcome == repository::BidOutcome::Rejected
                    && bid.reject_reason == Some(repository::RejectReason::BidTooLow)
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = Service::new_with_mock_db(db);
        let result = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(auction_id, 150),
            })
            .await;
        assert_eq!(result, Err(RestError::BidTooLow { minimum: 151 }));
    }

    #[tokio::test]
    async fn test_bid_after_end_time_is_rejected_before_any_sweep() {
        let auction = auction_row(0, None, -5);
        let auction_id = auction.id;

        let mut db = MockDatabase::default();
        db.expect_get_auction()
            .returning(move |_| Ok(auction.clone()));
        db.expect_add_rejected_bid()
            .withf(|bid| bid.reject_reason == Some(repository::RejectReason::AuctionClosed))
            .times(1)
            .returning(|_| Ok(()));

        let service = Service::new_with_mock_db(db);
        let result = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(auction_id, 100),
            })
            .await;
        assert_eq!(result, Err(RestError::AuctionClosed));
    }

    #[tokio::test]
    async fn test_unknown_auction_leaves_no_ledger_record() {
        let mut db = MockDatabase::default();
        db.expect_get_auction()
            .returning(|_| Err(crate::api::RestError::AuctionNotFound));

        let service = Service::new_with_mock_db(db);
        let result = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(Uuid::new_v4(), 100),
            })
            .await;
        assert_eq!(result, Err(RestError::AuctionNotFound));
    }

    #[tokio::test]
    async fn test_lost_race_reruns_checks_and_rejects_lower_bid() {
        // The 100 bid reads an empty auction, loses the pointer race to a
        // concurrent 150 bid, and on the re-run sees the new high bid.
        let auction_id = Uuid::new_v4();
        let mut empty = auction_row(0, None, 600);
        empty.id = auction_id;
        let mut contested = auction_row(0, Some((Uuid::new_v4(), 150)), 600);
        contested.id = auction_id;

        let mut seq = Sequence::new();
        let mut db = MockDatabase::default();
        db.expect_get_auction()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(empty.clone()));
        db.expect_submit_accepted_bid()
            .withf(|_, expected| expected.is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(repository::AdmissionOutcome::Conflict));
        db.expect_get_auction()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(contested.clone()));
        db.expect_add_rejected_bid()
            .withf(|bid| bid.reject_reason == Some(repository::RejectReason::BidTooLow))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let service = Service::new_with_mock_db(db);
        let result = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(auction_id, 100),
            })
            .await;
        assert_eq!(result, Err(RestError::BidTooLow { minimum: 151 }));
    }

    #[tokio::test]
    async fn test_reserve_auction_runs_to_a_winner() {
        // Reserve 10: bid(5) is below reserve, bid(20) leads, bid(15) does
        // not displace it, and the sweep closes the auction with bid(20)
        // still referenced as the winner.
        let auction_id = Uuid::new_v4();
        let mut open_empty = auction_row(10, None, 600);
        open_empty.id = auction_id;
        let mut open_led = auction_row(10, Some((Uuid::new_v4(), 20)), 600);
        open_led.id = auction_id;
        let mut closed = open_led.clone();
        closed.status = repository::AuctionStatus::Closed;
        closed.conclusion_time = Some(primitive_now_plus(0));

        let mut seq = Sequence::new();
        let mut db = MockDatabase::default();
        db.expect_get_auction()
            .times(1)
            .in_sequence(&mut seq)
            .returning({
                let auction = open_empty.clone();
                move |_| Ok(auction.clone())
            });
        db.expect_add_rejected_bid()
            .withf(|bid| bid.reject_reason == Some(repository::RejectReason::BidTooLow))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        db.expect_get_auction()
            .times(1)
            .in_sequence(&mut seq)
            .returning({
                let auction = open_empty.clone();
                move |_| Ok(auction.clone())
            });
        db.expect_submit_accepted_bid()
            .withf(|bid, expected| {
                bid.amount == BigDecimal::from(20u64) && expected.is_none()
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(repository::AdmissionOutcome::Committed));
        db.expect_get_auction()
            .times(1)
            .in_sequence(&mut seq)
            .returning({
                let auction = open_led.clone();
                move |_| Ok(auction.clone())
            });
        db.expect_add_rejected_bid()
            .withf(|bid| bid.reject_reason == Some(repository::RejectReason::BidTooLow))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        db.expect_conclude_auction()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(true));
        db.expect_get_auction()
            .times(1)
            .in_sequence(&mut seq)
            .returning({
                let auction = closed.clone();
                move |_| Ok(auction.clone())
            });

        let service = Service::new_with_mock_db(db);
        assert_eq!(
            service
                .submit_bid(SubmitBidInput {
                    bid_create: bid_create(auction_id, 5),
                })
                .await,
            Err(RestError::BidTooLow { minimum: 11 })
        );
        let accepted = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(auction_id, 20),
            })
            .await
            .unwrap();
        assert_eq!(accepted.outcome, entities::BidOutcome::Accepted);
        assert_eq!(
            service
                .submit_bid(SubmitBidInput {
                    bid_create: bid_create(auction_id, 15),
                })
                .await,
            Err(RestError::BidTooLow { minimum: 21 })
        );
        service
            .conclude_auction(crate::auction::service::conclude_auction::ConcludeAuctionInput {
                auction_id,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_repeatedly_lost_race_surfaces_conflict() {
        let auction = auction_row(0, None, 600);
        let auction_id = auction.id;

        let mut db = MockDatabase::default();
        db.expect_get_auction()
            .times(SUBMIT_BID_RETRY_LIMIT)
            .returning(move |_| Ok(auction.clone()));
        db.expect_submit_accepted_bid()
            .times(SUBMIT_BID_RETRY_LIMIT)
            .returning(|_, _| Ok(repository::AdmissionOutcome::Conflict));

        let service = Service::new_with_mock_db(db);
        let result = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(auction_id, 100),
            })
            .await;
        assert_eq!(result, Err(RestError::Conflict));
    }
}
