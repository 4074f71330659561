use soroban_sdk::{contracttype, Address, Bytes, BytesN, String};

// ─── Listing state ─────────────────────────────────────────────────────────

/// Lifecycle of one data-sale listing.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListingState {
    /// No live listing in this slot (initial state, and terminal after
    /// settlement or empty-timeout cleanup).
    Closed,
    /// Accepting bids and acceptances.
    Open,
    /// Cheating proven; buyers reclaim individually, no new bids or accepts.
    Refund,
}

/// One data-sale listing occupying a slot.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Listing {
    /// The address selling access to the encrypted payload.
    pub provider: Address,
    /// Collateral deposited by the provider at opening. Always positive.
    pub provider_stake: i128,
    /// Human-readable summary of what is for sale.
    pub abstract_desc: String,
    /// Topic / category tag for discovery.
    pub topic: String,
    /// The encrypted data itself, opaque to the contract.
    pub encrypted_payload: Bytes,
    /// sha256 of the true decryption key.
    pub key_commitment: BytesN<32>,
    pub state: ListingState,
    /// Absolute timestamp after which the listing closes to new bids.
    pub deadline: u64,
    /// Number of buyers with a positive settled balance.
    pub buyer_count: u32,
    /// Sum of all positive settled buyer balances.
    pub settled_sum: i128,
    /// Flat per-buyer bonus, computed once when cheating is proven.
    pub refund_bonus: i128,
}

// ─── Exchange state ────────────────────────────────────────────────────────

/// Per-buyer fair-exchange sub-machine.
///
/// `Closed --bid--> Proposed --accept--> Accepted --finish|dispute--> Closed`;
/// also `Proposed --timeout--> Closed`. A closed record may be reused by a
/// fresh bid from the same buyer.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExchangeState {
    Closed,
    Proposed,
    Accepted,
}

/// One fair-exchange record, keyed by (slot, buyer).
#[contracttype]
#[derive(Clone, Debug)]
pub struct FairExchange {
    pub buyer: Address,
    /// Escrowed payment, held until finish / timeout / dispute.
    pub offered_value: i128,
    /// Buyer's sha256 commitment to the first key fragment.
    pub key_half_commitment: BytesN<32>,
    /// First key fragment, encrypted for the provider off-protocol.
    pub key_half_ciphertext: Bytes,
    /// Second key fragment, set by the provider on acceptance.
    pub revealed_second_half: BytesN<32>,
    pub state: ExchangeState,
    /// Phase deadline, reset on each transition.
    pub deadline: u64,
}

// ─── Storage keys ──────────────────────────────────────────────────────────

/// Keys for each logical piece of contract state.
///
/// * `Admin`, `Token`, `OpenListings`, `Decommissioned` live in `instance()`
///   — a small bounded set always loaded with the contract.
/// * `Listing(slot)`, `Exchange(slot, buyer)` and `BuyerBalance(slot, buyer)`
///   live in `persistent()` — unbounded two-level keyed stores that must not
///   bloat the instance footprint.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Holder of the one-shot shutdown capability.
    Admin,
    /// Settlement token for all escrow, stake and refund transfers.
    Token,
    /// Number of listings not yet closed. Gates `shutdown`.
    OpenListings,
    /// Set once by `shutdown`; blocks new listings forever after.
    Decommissioned,
    /// Listing record keyed by slot id.
    Listing(u64),
    /// Fair-exchange record keyed by (slot, buyer).
    Exchange(u64, Address),
    /// Settled balance keyed by (slot, buyer).
    BuyerBalance(u64, Address),
}
