//! Audit/notification surface, decoupled from the transition logic.
//!
//! One `emit_*` helper per successful operation, published after the
//! transition commits, so the event stream can be replayed independently
//! without re-deriving state.

use soroban_sdk::{Address, Env, Symbol};

/// Emitted when a provider opens a listing.
///
/// # Topics
/// * `Symbol` - "listing_opened"
/// * `Address` - The provider
///
/// # Data
/// * `u64` - Slot id
/// * `i128` - Provider stake
/// * `u64` - Listing deadline
pub fn emit_listing_opened(e: &Env, provider: &Address, slot: u64, stake: i128, deadline: u64) {
    let topics = (Symbol::new(e, "listing_opened"), provider.clone());
    e.events().publish(topics, (slot, stake, deadline));
}

/// Emitted when a buyer escrows a bid.
///
/// # Topics
/// * `Symbol` - "bid_placed"
/// * `Address` - The buyer
///
/// # Data
/// * `u64` - Slot id
/// * `i128` - Escrowed value
/// * `u64` - Bid-phase deadline
pub fn emit_bid_placed(e: &Env, buyer: &Address, slot: u64, value: i128, deadline: u64) {
    let topics = (Symbol::new(e, "bid_placed"), buyer.clone());
    e.events().publish(topics, (slot, value, deadline));
}

/// Emitted when the provider accepts a bid and reveals the second fragment.
///
/// # Topics
/// * `Symbol` - "bid_accepted"
/// * `Address` - The provider
///
/// # Data
/// * `u64` - Slot id
/// * `Address` - The buyer
/// * `u64` - Accept-phase deadline
pub fn emit_bid_accepted(e: &Env, provider: &Address, slot: u64, buyer: &Address, deadline: u64) {
    let topics = (Symbol::new(e, "bid_accepted"), provider.clone());
    e.events().publish(topics, (slot, buyer.clone(), deadline));
}

/// Emitted when an exchange settles into the slot's buyer balances.
///
/// # Topics
/// * `Symbol` - "exchange_finished"
/// * `Address` - The buyer
///
/// # Data
/// * `u64` - Slot id
/// * `i128` - Settled value
pub fn emit_exchange_finished(e: &Env, buyer: &Address, slot: u64, value: i128) {
    let topics = (Symbol::new(e, "exchange_finished"), buyer.clone());
    e.events().publish(topics, (slot, value));
}

/// Emitted when a never-accepted bid is refunded after its deadline.
///
/// # Topics
/// * `Symbol` - "exchange_timed_out"
/// * `Address` - The buyer
///
/// # Data
/// * `u64` - Slot id
/// * `i128` - Refunded value
pub fn emit_exchange_timed_out(e: &Env, buyer: &Address, slot: u64, value: i128) {
    let topics = (Symbol::new(e, "exchange_timed_out"), buyer.clone());
    e.events().publish(topics, (slot, value));
}

/// Emitted when a dispute proves the provider cheated.
///
/// # Topics
/// * `Symbol` - "dispute_upheld"
/// * `Address` - The disputing buyer
///
/// # Data
/// * `u64` - Slot id
/// * `i128` - Flat refund bonus granted to every settled buyer
pub fn emit_dispute_upheld(e: &Env, buyer: &Address, slot: u64, refund_bonus: i128) {
    let topics = (Symbol::new(e, "dispute_upheld"), buyer.clone());
    e.events().publish(topics, (slot, refund_bonus));
}

/// Emitted when a dispute confirms the revealed key was correct.
///
/// # Topics
/// * `Symbol` - "dispute_rejected"
/// * `Address` - The disputing buyer
///
/// # Data
/// * `u64` - Slot id
/// * `Address` - The provider paid the escrow
/// * `i128` - Value paid
pub fn emit_dispute_rejected(e: &Env, buyer: &Address, slot: u64, provider: &Address, value: i128) {
    let topics = (Symbol::new(e, "dispute_rejected"), buyer.clone());
    e.events().publish(topics, (slot, provider.clone(), value));
}

/// Emitted when a buyer reclaims principal + bonus from a refunding listing.
///
/// # Topics
/// * `Symbol` - "refund_issued"
/// * `Address` - The buyer
///
/// # Data
/// * `u64` - Slot id
/// * `i128` - Amount paid (principal + bonus)
pub fn emit_refund_issued(e: &Env, buyer: &Address, slot: u64, amount: i128) {
    let topics = (Symbol::new(e, "refund_issued"), buyer.clone());
    e.events().publish(topics, (slot, amount));
}

/// Emitted when the accumulated buyer payments settle to the provider.
///
/// # Topics
/// * `Symbol` - "listing_settled"
/// * `Address` - The provider
///
/// # Data
/// * `u64` - Slot id
/// * `i128` - Settled sum paid out
pub fn emit_listing_settled(e: &Env, provider: &Address, slot: u64, amount: i128) {
    let topics = (Symbol::new(e, "listing_settled"), provider.clone());
    e.events().publish(topics, (slot, amount));
}

/// Emitted when an expired, empty listing is cleaned up. No funds move.
///
/// # Topics
/// * `Symbol` - "listing_closed"
/// * `Address` - The provider
///
/// # Data
/// * `u64` - Slot id
pub fn emit_listing_closed(e: &Env, provider: &Address, slot: u64) {
    let topics = (Symbol::new(e, "listing_closed"), provider.clone());
    e.events().publish(topics, slot);
}

/// Emitted once, when the admin decommissions the contract.
///
/// # Topics
/// * `Symbol` - "shutdown"
/// * `Address` - The admin
///
/// # Data
/// * `i128` - Residual token balance swept to the admin
pub fn emit_shutdown(e: &Env, admin: &Address, swept: i128) {
    let topics = (Symbol::new(e, "shutdown"), admin.clone());
    e.events().publish(topics, swept);
}
