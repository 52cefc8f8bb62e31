use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
    time::OffsetDateTime,
};

pub struct CreateAuctionInput {
    pub product_name:  String,
    pub category:      String,
    pub description:   String,
    pub condition:     entities::ProductCondition,
    pub reserve_price: Option<entities::BidAmount>,
    pub end_time:      Option<OffsetDateTime>,
}

impl Service {
    /// The catalog collaborator's operation: register an auction before
    /// bidding opens. End time and reserve fall back to the configured
    /// defaults.
    #[tracing::instrument(skip_all, fields(auction_id), err(level = tracing::Level::TRACE))]
    pub async fn create_auction(
        &self,
        input: CreateAuctionInput,
    ) -> Result<entities::Auction, RestError> {
        let now = OffsetDateTime::now_utc();
        let end_time = input.end_time.unwrap_or(now + self.config.auction_duration);
        let reserve_price = input
            .reserve_price
            .unwrap_or(self.config.default_reserve_price);

        let auction = entities::Auction::try_new(
            input.product_name,
            input.category,
            input.description,
            input.condition,
            reserve_price,
            now,
            end_time,
        )
        .map_err(RestError::BadParameters)?;

        self.repo.add_auction(&auction).await?;
        tracing::Span::current().record("auction_id", auction.id.to_string());
        tracing::info!(
            auction_id = %auction.id,
            end_time = %auction.end_time,
            reserve_price = auction.reserve_price,
            "Auction created"
        );
        Ok(auction)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::repository::MockDatabase,
        time::Duration,
    };

    #[tokio::test]
    async fn test_create_auction_applies_defaults_and_persists() {
        let mut db = MockDatabase::default();
        db.expect_add_auction().times(1).returning(|_| Ok(()));

        let service = Service::new_with_mock_db(db);
        let auction = service
            .create_auction(CreateAuctionInput {
                product_name:  "Turntable".to_string(),
                category:      "electronics".to_string(),
                description:   "a belt-drive turntable".to_string(),
                condition:     entities::ProductCondition::Used,
                reserve_price: None,
                end_time:      None,
            })
            .await
            .unwrap();
        assert_eq!(auction.status, entities::AuctionStatus::Open);
        assert_eq!(auction.reserve_price, 0);
        assert!(auction.end_time > auction.creation_time);
    }

    #[tokio::test]
    async fn test_create_auction_rejects_invalid_catalog_fields() {
        let service = Service::new_with_mock_db(MockDatabase::default());
        let result = service
            .create_auction(CreateAuctionInput {
                product_name:  "T".to_string(),
                category:      "electronics".to_string(),
                description:   "a belt-drive turntable".to_string(),
                condition:     entities::ProductCondition::Used,
                reserve_price: None,
                end_time:      None,
            })
            .await;
        assert_eq!(
            result,
            Err(RestError::BadParameters("product name too short".to_string()))
        );
    }

    #[tokio::test]
    async fn test_create_auction_rejects_past_end_time() {
        let service = Service::new_with_mock_db(MockDatabase::default());
        let result = service
            .create_auction(CreateAuctionInput {
                product_name:  "Turntable".to_string(),
                category:      "electronics".to_string(),
                description:   "a belt-drive turntable".to_string(),
                condition:     entities::ProductCondition::Used,
                reserve_price: None,
                end_time:      Some(OffsetDateTime::now_utc() - Duration::seconds(60)),
            })
            .await;
        assert_eq!(
            result,
            Err(RestError::BadParameters(
                "end time must be in the future".to_string()
            ))
        );
    }
}
