//! Deadline policy shared by every phase of the protocol.
//!
//! Three independent scales bound the lifecycle:
//!
//! 1. the listing deadline, chosen by the provider at `open_source` but
//!    required to exceed twice the bid-phase timeout,
//! 2. the bid-phase timeout, bounding how long the provider has to accept,
//! 3. the accept-phase timeout, bounding the dispute/finish window.
//!
//! Deadlines are evaluated lazily on the next relevant call; nothing fires
//! on its own.

/// How long the provider has to accept a proposed bid, in seconds.
pub const BID_PHASE_TIMEOUT: u64 = 1_800;

/// How long the buyer has to dispute (or finish) after acceptance, in seconds.
pub const ACCEPT_PHASE_TIMEOUT: u64 = 1_800;

/// Exclusive lower bound on a listing deadline as seen from `now`:
/// acceptable deadlines strictly exceed this. Twice the bid-phase timeout
/// guarantees room for a full bid → accept → dispute sequence before the
/// listing closes.
pub fn min_listing_deadline(now: u64) -> u64 {
    now.saturating_add(2 * BID_PHASE_TIMEOUT)
}

/// A bid is admissible only while a full accept + dispute window still fits
/// before the listing deadline.
pub fn bidding_open(now: u64, listing_deadline: u64) -> bool {
    now.saturating_add(BID_PHASE_TIMEOUT) < listing_deadline
}

/// True once `deadline` has elapsed. Deadlines are inclusive: the boundary
/// second still belongs to the phase.
pub fn expired(now: u64, deadline: u64) -> bool {
    now > deadline
}
