use {
    super::bid::{
        BidAmount,
        BidId,
    },
    strum::Display,
    time::OffsetDateTime,
    uuid::Uuid,
};

pub type AuctionId = Uuid;

#[derive(Clone, Copy, Debug, Display, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum AuctionStatus {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, Display, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum ProductCondition {
    New,
    Used,
    Refurbished,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Auction {
    pub id:              AuctionId,
    pub product_name:    String,
    pub category:        String,
    pub description:     String,
    pub condition:       ProductCondition,
    pub status:          AuctionStatus,
    pub reserve_price:   BidAmount,
    pub creation_time:   OffsetDateTime,
    pub end_time:        OffsetDateTime,
    pub conclusion_time: Option<OffsetDateTime>,
    pub winning_bid_id:  Option<BidId>,
    pub highest_amount:  Option<BidAmount>,
}

#[derive(Clone, Debug, Default)]
pub struct AuctionFilter {
    pub status:       Option<AuctionStatus>,
    pub category:     Option<String>,
    pub product_name: Option<String>,
}

impl Auction {
    pub fn try_new(
        product_name: String,
        category: String,
        description: String,
        condition: ProductCondition,
        reserve_price: BidAmount,
        creation_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> Result<Self, String> {
        if product_name.len() <= 1 {
            return Err("product name too short".to_string());
        }
        if category.len() <= 2 {
            return Err("category too short".to_string());
        }
        if description.len() <= 10 {
            return Err("description too short".to_string());
        }
        if end_time <= creation_time {
            return Err("end time must be in the future".to_string());
        }
        Ok(Self {
            id: Uuid::new_v4(),
            product_name,
            category,
            description,
            condition,
            status: AuctionStatus::Open,
            reserve_price,
            creation_time,
            end_time,
            conclusion_time: None,
            winning_bid_id: None,
            highest_amount: None,
        })
    }

    pub fn is_expired(&self, as_of: OffsetDateTime) -> bool {
        as_of >= self.end_time
    }

    /// Bidding is over once the auction is closed or its deadline has passed,
    /// whichever is observed first.
    pub fn accepts_bids(&self, as_of: OffsetDateTime) -> bool {
        self.status == AuctionStatus::Open && !self.is_expired(as_of)
    }

    /// The amount a new bid has to exceed strictly: the current high bid if
    /// one exists, the reserve price otherwise.
    pub fn amount_to_beat(&self) -> BidAmount {
        self.highest_amount.unwrap_or(self.reserve_price)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::time::Duration,
    };

    fn try_new_auction(product_name: &str, category: &str, description: &str) -> Result<Auction, String> {
        let now = OffsetDateTime::now_utc();
        Auction::try_new(
            product_name.to_string(),
            category.to_string(),
            description.to_string(),
            ProductCondition::Used,
            0,
            now,
            now + Duration::from_secs(3600),
        )
    }

    #[test]
    fn test_try_new_validates_catalog_fields() {
        assert!(try_new_auction("Lamp", "furniture", "a mid-century desk lamp").is_ok());
        assert_eq!(
            try_new_auction("L", "furniture", "a mid-century desk lamp"),
            Err("product name too short".to_string())
        );
        assert_eq!(
            try_new_auction("Lamp", "fu", "a mid-century desk lamp"),
            Err("category too short".to_string())
        );
        assert_eq!(
            try_new_auction("Lamp", "furniture", "short"),
            Err("description too short".to_string())
        );
    }

    #[test]
    fn test_amount_to_beat_prefers_high_bid_over_reserve() {
        let mut auction = try_new_auction("Lamp", "furniture", "a mid-century desk lamp").unwrap();
        auction.reserve_price = 10;
        assert_eq!(auction.amount_to_beat(), 10);
        auction.highest_amount = Some(25);
        assert_eq!(auction.amount_to_beat(), 25);
    }

    #[test]
    fn test_accepts_bids_honors_deadline_and_status() {
        let auction = try_new_auction("Lamp", "furniture", "a mid-century desk lamp").unwrap();
        assert!(auction.accepts_bids(auction.creation_time));
        assert!(!auction.accepts_bids(auction.end_time));
        assert!(!auction.accepts_bids(auction.end_time + Duration::from_secs(1)));

        let mut closed = auction;
        closed.status = AuctionStatus::Closed;
        assert!(!closed.accepts_bids(closed.creation_time));
    }
}
