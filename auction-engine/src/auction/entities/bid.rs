use {
    super::AuctionId,
    crate::models::UserId,
    strum::Display,
    time::OffsetDateTime,
    uuid::Uuid,
};

pub type BidId = Uuid;

/// Bid amounts are expressed in minor currency units.
pub type BidAmount = u64;

#[derive(Clone, Copy, Debug, Display, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum BidOutcome {
    Accepted,
    Rejected,
}

#[derive(Clone, Copy, Debug, Display, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum BidRejectReason {
    AuctionClosed,
    BidTooLow,
}

/// A row of the ledger. The outcome is set once at admission and reflects
/// "was ever valid", not "is currently winning": a superseded bid stays
/// Accepted, and the auction's winning bid pointer is the only source of
/// which bid currently leads.
#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub id:            BidId,
    pub auction_id:    AuctionId,
    pub user_id:       UserId,
    pub amount:        BidAmount,
    pub submitted_at:  OffsetDateTime,
    pub creation_time: OffsetDateTime,
    pub outcome:       BidOutcome,
    pub reject_reason: Option<BidRejectReason>,
}

#[derive(Clone, Debug)]
pub struct BidCreate {
    pub auction_id:   AuctionId,
    pub user_id:      UserId,
    pub amount:       BidAmount,
    pub submitted_at: OffsetDateTime,
}

impl Bid {
    pub fn new_accepted(create: &BidCreate) -> Self {
        Self::new(create, BidOutcome::Accepted, None)
    }

    pub fn new_rejected(create: &BidCreate, reason: BidRejectReason) -> Self {
        Self::new(create, BidOutcome::Rejected, Some(reason))
    }

    fn new(create: &BidCreate, outcome: BidOutcome, reject_reason: Option<BidRejectReason>) -> Self {
        Self {
            id: Uuid::new_v4(),
            auction_id: create.auction_id,
            user_id: create.user_id,
            amount: create.amount,
            submitted_at: create.submitted_at,
            creation_time: OffsetDateTime::now_utc(),
            outcome,
            reject_reason,
        }
    }
}
