use crate::auction::entities;

/// Admission checks, run in order against a freshly read auction:
/// the auction must still accept bids as of the submission time, and the
/// amount must strictly exceed the current high bid (or the reserve when no
/// bid has been accepted yet).
///
/// The deadline comparison here is the same one the lifecycle sweep uses, so
/// a bid racing a closure resolves identically no matter which side observes
/// the end time first.
pub fn verify_bid(
    auction: &entities::Auction,
    bid_create: &entities::BidCreate,
) -> Result<(), entities::BidRejectReason> {
    if !auction.accepts_bids(bid_create.submitted_at) {
        return Err(entities::BidRejectReason::AuctionClosed);
    }
    if bid_create.amount <= auction.amount_to_beat() {
        return Err(entities::BidRejectReason::BidTooLow);
    }
    Ok(())
}
