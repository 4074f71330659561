//! # Data Exchange Contract
//!
//! Fair-exchange escrow for selling access to encrypted data without a
//! trusted intermediary. The buyer pays if and only if the provider supplies
//! the correct decryption key, enforced by a two-fragment commit-reveal:
//! the buyer commits to the first key fragment at bid time, the provider
//! reveals the second on acceptance, and a dispute reassembles the key
//! (`first XOR second`) against the commitment published with the listing.
//!
//! ## Storage Layout
//!
//! | Key                               | Tier          | Lifecycle       |
//! |-----------------------------------|---------------|-----------------|
//! | `DataKey::Admin`                  | `instance()`  | Entire contract |
//! | `DataKey::Token`                  | `instance()`  | Entire contract |
//! | `DataKey::OpenListings`           | `instance()`  | Entire contract |
//! | `DataKey::Decommissioned`         | `instance()`  | Entire contract |
//! | `DataKey::Listing(slot)`          | `persistent()`| Per listing     |
//! | `DataKey::Exchange(slot, buyer)`  | `persistent()`| Per exchange    |
//! | `DataKey::BuyerBalance(slot, buyer)` | `persistent()`| Per buyer    |
//!
//! ## Key design decisions
//!
//! - **Checks-Effects-Interactions**: storage is updated before token
//!   transfers; a failed transfer traps and rolls back the whole call, so
//!   funds are never partially moved or double-counted.
//! - **Pull-based deadlines**: no timer ever fires; elapsed deadlines are
//!   observed by the next call that references them.
//! - **Two-level keyed stores**: slot → listing, (slot, buyer) → exchange /
//!   settled balance; no object graph, no back-pointers.
//! - **Zero-stake listings are rejected** so the refund-bonus division is
//!   always defined.

#![no_std]

mod commitment;
mod errors;
mod events;
mod timeouts;
mod types;

pub use errors::Error;
pub use timeouts::{ACCEPT_PHASE_TIMEOUT, BID_PHASE_TIMEOUT};
pub use types::{DataKey, ExchangeState, FairExchange, Listing, ListingState};

use soroban_sdk::{
    contract, contractimpl, token::TokenClient, Address, Bytes, BytesN, Env, String,
};

// ─── TTL constants ─────────────────────────────────────────────────────────

/// Minimum ledger sequence TTL before a bump is requested (~1 day at 5 s/ledger).
const BUMP_THRESHOLD: u32 = 17_280;
/// Target TTL after a bump (~30 days).
const BUMP_TARGET: u32 = 518_400;

// ─── Contract ──────────────────────────────────────────────────────────────

#[contract]
pub struct DataExchange;

// ─── Internal helpers ──────────────────────────────────────────────────────

impl DataExchange {
    fn token_client(e: &Env) -> Result<TokenClient<'_>, Error> {
        let token: Address = e
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotInitialized)?;
        Ok(TokenClient::new(e, &token))
    }

    /// Read a `Listing` from `persistent()` storage, bump its TTL, and
    /// return it — or `Err(Error::ListingNotFound)` without a panic.
    fn load_listing(e: &Env, slot: u64) -> Result<Listing, Error> {
        let key = DataKey::Listing(slot);
        let storage = e.storage().persistent();
        let listing: Listing = storage.get(&key).ok_or(Error::ListingNotFound)?;
        storage.extend_ttl(&key, BUMP_THRESHOLD, BUMP_TARGET);
        Ok(listing)
    }

    fn save_listing(e: &Env, slot: u64, listing: &Listing) {
        let key = DataKey::Listing(slot);
        e.storage().persistent().set(&key, listing);
        e.storage()
            .persistent()
            .extend_ttl(&key, BUMP_THRESHOLD, BUMP_TARGET);
    }

    fn load_exchange(e: &Env, slot: u64, buyer: &Address) -> Result<FairExchange, Error> {
        let key = DataKey::Exchange(slot, buyer.clone());
        let storage = e.storage().persistent();
        let exchange: FairExchange = storage.get(&key).ok_or(Error::ExchangeNotFound)?;
        storage.extend_ttl(&key, BUMP_THRESHOLD, BUMP_TARGET);
        Ok(exchange)
    }

    fn save_exchange(e: &Env, slot: u64, buyer: &Address, exchange: &FairExchange) {
        let key = DataKey::Exchange(slot, buyer.clone());
        e.storage().persistent().set(&key, exchange);
        e.storage()
            .persistent()
            .extend_ttl(&key, BUMP_THRESHOLD, BUMP_TARGET);
    }

    fn buyer_balance(e: &Env, slot: u64, buyer: &Address) -> i128 {
        e.storage()
            .persistent()
            .get(&DataKey::BuyerBalance(slot, buyer.clone()))
            .unwrap_or(0)
    }

    fn set_buyer_balance(e: &Env, slot: u64, buyer: &Address, balance: i128) {
        let key = DataKey::BuyerBalance(slot, buyer.clone());
        e.storage().persistent().set(&key, &balance);
        e.storage()
            .persistent()
            .extend_ttl(&key, BUMP_THRESHOLD, BUMP_TARGET);
    }

    fn open_listing_count(e: &Env) -> u32 {
        e.storage()
            .instance()
            .get(&DataKey::OpenListings)
            .unwrap_or(0)
    }

    fn set_open_listing_count(e: &Env, count: u32) {
        e.storage().instance().set(&DataKey::OpenListings, &count);
    }

    fn decommissioned(e: &Env) -> bool {
        e.storage()
            .instance()
            .get(&DataKey::Decommissioned)
            .unwrap_or(false)
    }
}

// ─── Public interface ──────────────────────────────────────────────────────

#[contractimpl]
impl DataExchange {
    /// One-time initialization. Stores the shutdown `admin` and the
    /// settlement `token` used for every escrow, stake and refund transfer.
    ///
    /// # Errors
    /// * `AlreadyInitialized` — called a second time
    pub fn initialize(e: Env, admin: Address, token: Address) -> Result<(), Error> {
        if e.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        e.storage().instance().set(&DataKey::Admin, &admin);
        e.storage().instance().set(&DataKey::Token, &token);
        e.storage().instance().set(&DataKey::OpenListings, &0_u32);
        Ok(())
    }

    // ── Storage registry ───────────────────────────────────────────────────

    /// Open a data-sale listing in `slot`.
    ///
    /// The provider's `stake` is deposited as a trust bond (caller must have
    /// approved the contract to spend it). The listing stays open to bids
    /// until `deadline`, which must strictly exceed `now + 2 *
    /// BID_PHASE_TIMEOUT` so a full bid → accept → dispute sequence fits
    /// before it closes.
    ///
    /// # Errors
    /// * `Decommissioned` — the contract has been shut down
    /// * `SlotOccupied` — a non-closed listing already occupies `slot`
    /// * `DeadlineTooSoon` — `deadline <= now + 2 * BID_PHASE_TIMEOUT`
    /// * `InvalidStake` — `stake <= 0`
    #[allow(clippy::too_many_arguments)]
    pub fn open_source(
        e: Env,
        provider: Address,
        slot: u64,
        abstract_desc: String,
        topic: String,
        encrypted_payload: Bytes,
        key_commitment: BytesN<32>,
        deadline: u64,
        stake: i128,
    ) -> Result<(), Error> {
        provider.require_auth();

        if Self::decommissioned(&e) {
            return Err(Error::Decommissioned);
        }

        if let Ok(existing) = Self::load_listing(&e, slot) {
            if existing.state != ListingState::Closed {
                return Err(Error::SlotOccupied);
            }
        }

        let now = e.ledger().timestamp();
        if deadline <= timeouts::min_listing_deadline(now) {
            return Err(Error::DeadlineTooSoon);
        }

        if stake <= 0 {
            return Err(Error::InvalidStake);
        }

        let token = Self::token_client(&e)?;
        let contract = e.current_contract_address();
        token.transfer_from(&contract, &provider, &contract, &stake);

        let listing = Listing {
            provider: provider.clone(),
            provider_stake: stake,
            abstract_desc,
            topic,
            encrypted_payload,
            key_commitment,
            state: ListingState::Open,
            deadline,
            buyer_count: 0,
            settled_sum: 0,
            refund_bonus: 0,
        };
        Self::save_listing(&e, slot, &listing);
        Self::set_open_listing_count(&e, Self::open_listing_count(&e) + 1);

        events::emit_listing_opened(&e, &provider, slot, stake, deadline);
        Ok(())
    }

    /// Clean up an expired listing that never settled a buyer.
    ///
    /// Pure cleanup — no funds move. Also closes an emptied refunding
    /// listing once every buyer has reclaimed, so the open-listing count
    /// can drain to zero ahead of `shutdown`.
    ///
    /// # Errors
    /// * `ListingNotFound` — unknown `slot`
    /// * `ListingNotOpen` — listing already closed
    /// * `DeadlineNotReached` — the listing deadline has not elapsed
    /// * `ListingNotEmpty` — some buyer still holds a settled balance
    pub fn close_empty_listing(e: Env, slot: u64) -> Result<(), Error> {
        let mut listing = Self::load_listing(&e, slot)?;

        if listing.state == ListingState::Closed {
            return Err(Error::ListingNotOpen);
        }
        if !timeouts::expired(e.ledger().timestamp(), listing.deadline) {
            return Err(Error::DeadlineNotReached);
        }
        if listing.buyer_count != 0 {
            return Err(Error::ListingNotEmpty);
        }

        listing.state = ListingState::Closed;
        Self::save_listing(&e, slot, &listing);
        Self::set_open_listing_count(&e, Self::open_listing_count(&e).saturating_sub(1));

        events::emit_listing_closed(&e, &listing.provider, slot);
        Ok(())
    }

    /// Pay the accumulated buyer payments to the provider and close the
    /// listing.
    ///
    /// This is the sole path by which settled funds reach the provider, and
    /// it is deliberately gated on the listing deadline: any dispute raised
    /// before then can still flip the listing to the refund state and
    /// redirect the funds to the buyers.
    ///
    /// # Errors
    /// * `ListingNotFound` — unknown `slot`
    /// * `ListingNotOpen` — a dispute flipped the listing to refund, or it
    ///   is already closed
    /// * `DeadlineNotReached` — the listing deadline has not elapsed
    pub fn settle_to_provider(e: Env, slot: u64) -> Result<(), Error> {
        let mut listing = Self::load_listing(&e, slot)?;

        if listing.state != ListingState::Open {
            return Err(Error::ListingNotOpen);
        }
        if !timeouts::expired(e.ledger().timestamp(), listing.deadline) {
            return Err(Error::DeadlineNotReached);
        }

        let amount = listing.settled_sum;

        // CEI: close the listing before paying out.
        listing.settled_sum = 0;
        listing.buyer_count = 0;
        listing.state = ListingState::Closed;
        Self::save_listing(&e, slot, &listing);
        Self::set_open_listing_count(&e, Self::open_listing_count(&e).saturating_sub(1));

        if amount > 0 {
            let token = Self::token_client(&e)?;
            token.transfer(&e.current_contract_address(), &listing.provider, &amount);
        }

        events::emit_listing_settled(&e, &listing.provider, slot, amount);
        Ok(())
    }

    // ── Exchange engine ────────────────────────────────────────────────────

    /// Escrow `value` and propose an exchange on `slot`.
    ///
    /// `key_half_commitment` binds the buyer to the first key fragment;
    /// `key_half_ciphertext` carries that fragment encrypted for the
    /// provider. The provider has one bid-phase timeout to accept.
    ///
    /// # Errors
    /// * `ListingNotFound` — unknown `slot`
    /// * `ListingNotOpen` — listing closed or refunding
    /// * `BiddingClosed` — less than one bid-timeout remains before the
    ///   listing deadline
    /// * `InvalidValue` — `value <= 0`
    /// * `ExchangeActive` — the buyer's previous exchange is not closed
    pub fn bid(
        e: Env,
        buyer: Address,
        slot: u64,
        value: i128,
        key_half_ciphertext: Bytes,
        key_half_commitment: BytesN<32>,
    ) -> Result<(), Error> {
        buyer.require_auth();

        let listing = Self::load_listing(&e, slot)?;
        if listing.state != ListingState::Open {
            return Err(Error::ListingNotOpen);
        }

        let now = e.ledger().timestamp();
        if !timeouts::bidding_open(now, listing.deadline) {
            return Err(Error::BiddingClosed);
        }
        if value <= 0 {
            return Err(Error::InvalidValue);
        }
        if let Ok(prior) = Self::load_exchange(&e, slot, &buyer) {
            if prior.state != ExchangeState::Closed {
                return Err(Error::ExchangeActive);
            }
        }

        let token = Self::token_client(&e)?;
        let contract = e.current_contract_address();
        token.transfer_from(&contract, &buyer, &contract, &value);

        let deadline = now + BID_PHASE_TIMEOUT;
        let exchange = FairExchange {
            buyer: buyer.clone(),
            offered_value: value,
            key_half_commitment,
            key_half_ciphertext,
            revealed_second_half: BytesN::from_array(&e, &[0u8; 32]),
            state: ExchangeState::Proposed,
            deadline,
        };
        Self::save_exchange(&e, slot, &buyer, &exchange);

        events::emit_bid_placed(&e, &buyer, slot, value, deadline);
        Ok(())
    }

    /// Provider accepts a proposed bid and reveals the second key fragment,
    /// opening a fresh accept-phase window for the buyer to dispute or
    /// finish.
    ///
    /// # Errors
    /// * `ListingNotFound` — unknown `slot`
    /// * `ListingNotOpen` — listing closed or refunding
    /// * `ExchangeNotFound` / `ExchangeNotProposed` — no live bid from `buyer`
    /// * `PhaseExpired` — the bid-phase deadline has elapsed
    pub fn accept(
        e: Env,
        slot: u64,
        buyer: Address,
        revealed_second_half: BytesN<32>,
    ) -> Result<(), Error> {
        let listing = Self::load_listing(&e, slot)?;
        listing.provider.require_auth();

        if listing.state != ListingState::Open {
            return Err(Error::ListingNotOpen);
        }

        let mut exchange = Self::load_exchange(&e, slot, &buyer)?;
        if exchange.state != ExchangeState::Proposed {
            return Err(Error::ExchangeNotProposed);
        }

        let now = e.ledger().timestamp();
        if timeouts::expired(now, exchange.deadline) {
            return Err(Error::PhaseExpired);
        }

        exchange.revealed_second_half = revealed_second_half;
        exchange.state = ExchangeState::Accepted;
        exchange.deadline = now + ACCEPT_PHASE_TIMEOUT;
        Self::save_exchange(&e, slot, &buyer, &exchange);

        events::emit_bid_accepted(&e, &listing.provider, slot, &buyer, exchange.deadline);
        Ok(())
    }

    /// Settle an accepted exchange into the slot's buyer balances.
    ///
    /// The buyer may finish at any time once accepted (implicitly agreeing
    /// the revealed key was correct). Anyone else may finish only after the
    /// accept-phase deadline — auto-finalization when no dispute was raised
    /// in time. The escrow stays in the contract, credited to the buyer's
    /// settled balance until `settle_to_provider` or a refund.
    ///
    /// # Errors
    /// * `ExchangeNotFound` / `ExchangeNotAccepted` — nothing to finish
    /// * `PhaseNotExpired` — a non-buyer called before the dispute window
    ///   closed
    pub fn finish(e: Env, caller: Address, slot: u64, buyer: Address) -> Result<(), Error> {
        caller.require_auth();

        let mut exchange = Self::load_exchange(&e, slot, &buyer)?;
        if exchange.state != ExchangeState::Accepted {
            return Err(Error::ExchangeNotAccepted);
        }
        if caller != exchange.buyer
            && !timeouts::expired(e.ledger().timestamp(), exchange.deadline)
        {
            return Err(Error::PhaseNotExpired);
        }

        let mut listing = Self::load_listing(&e, slot)?;
        let value = exchange.offered_value;

        exchange.state = ExchangeState::Closed;
        Self::save_exchange(&e, slot, &buyer, &exchange);

        let prior = Self::buyer_balance(&e, slot, &buyer);
        Self::set_buyer_balance(&e, slot, &buyer, prior + value);
        if prior == 0 {
            listing.buyer_count += 1;
        }
        listing.settled_sum += value;
        Self::save_listing(&e, slot, &listing);

        events::emit_exchange_finished(&e, &buyer, slot, value);
        Ok(())
    }

    /// Refund a bid the provider never accepted, once its deadline has
    /// elapsed. If the refund transfer fails the whole call rolls back and
    /// the exchange remains retryable.
    ///
    /// # Errors
    /// * `ExchangeNotFound` / `ExchangeNotProposed` — nothing to time out
    /// * `PhaseNotExpired` — the bid-phase deadline has not elapsed
    pub fn timeout_exchange(e: Env, slot: u64, buyer: Address) -> Result<(), Error> {
        let mut exchange = Self::load_exchange(&e, slot, &buyer)?;
        if exchange.state != ExchangeState::Proposed {
            return Err(Error::ExchangeNotProposed);
        }
        if !timeouts::expired(e.ledger().timestamp(), exchange.deadline) {
            return Err(Error::PhaseNotExpired);
        }

        // CEI: close before refunding.
        exchange.state = ExchangeState::Closed;
        Self::save_exchange(&e, slot, &buyer, &exchange);

        let token = Self::token_client(&e)?;
        token.transfer(
            &e.current_contract_address(),
            &buyer,
            &exchange.offered_value,
        );

        events::emit_exchange_timed_out(&e, &buyer, slot, exchange.offered_value);
        Ok(())
    }

    /// Dispute an accepted exchange by revealing the first key fragment.
    ///
    /// The fragment must hash to the commitment made at bid time — a wrong
    /// preimage rejects the call outright with no state change, so a buyer
    /// cannot grief with a bogus value. The key is then reassembled
    /// (`first XOR revealed_second`) and checked against the listing's key
    /// commitment:
    ///
    /// * mismatch — the provider cheated. The listing flips to the refund
    ///   state, the flat refund bonus is computed once as
    ///   `settled_sum / provider_stake`, and the disputer's escrow is
    ///   returned. Buyers who already settled reclaim via `refund_user`.
    /// * match — the provider was honest. The escrow is paid straight to
    ///   the provider; settled balances are untouched.
    ///
    /// # Errors
    /// * `ExchangeNotFound` / `ExchangeNotAccepted` — nothing to dispute
    /// * `PhaseExpired` — the dispute window has closed
    /// * `WrongFirstHalf` — `sha256(first_half)` does not match the
    ///   commitment recorded at bid time
    pub fn dispute(e: Env, slot: u64, buyer: Address, first_half: BytesN<32>) -> Result<(), Error> {
        let mut exchange = Self::load_exchange(&e, slot, &buyer)?;
        exchange.buyer.require_auth();

        if exchange.state != ExchangeState::Accepted {
            return Err(Error::ExchangeNotAccepted);
        }
        if timeouts::expired(e.ledger().timestamp(), exchange.deadline) {
            return Err(Error::PhaseExpired);
        }
        if !commitment::matches(&e, &first_half, &exchange.key_half_commitment) {
            return Err(Error::WrongFirstHalf);
        }

        let mut listing = Self::load_listing(&e, slot)?;
        let key = commitment::reassemble_key(&e, &first_half, &exchange.revealed_second_half);
        let value = exchange.offered_value;

        exchange.state = ExchangeState::Closed;
        Self::save_exchange(&e, slot, &buyer, &exchange);

        let token = Self::token_client(&e)?;
        let contract = e.current_contract_address();

        if !commitment::matches(&e, &key, &listing.key_commitment) {
            // Provider cheated. Flip to refund (once) and return the
            // disputer's escrow; settled buyers reclaim via refund_user.
            if listing.state == ListingState::Open {
                listing.state = ListingState::Refund;
                listing.refund_bonus = listing.settled_sum / listing.provider_stake;
                Self::save_listing(&e, slot, &listing);
            }
            token.transfer(&contract, &buyer, &value);
            events::emit_dispute_upheld(&e, &buyer, slot, listing.refund_bonus);
        } else {
            // Provider honest: pay the escrow out immediately.
            token.transfer(&contract, &listing.provider, &value);
            events::emit_dispute_rejected(&e, &buyer, slot, &listing.provider, value);
        }
        Ok(())
    }

    // ── Escrow & refund accounting ─────────────────────────────────────────

    /// Reclaim principal + the flat refund bonus from a refunding listing.
    ///
    /// A second call for the same buyer fails — the balance is already
    /// zero.
    ///
    /// # Errors
    /// * `ListingNotFound` — unknown `slot`
    /// * `ListingNotRefunding` — cheating has not been proven on this slot
    /// * `NothingToRefund` — no positive settled balance for `buyer`
    pub fn refund_user(e: Env, buyer: Address, slot: u64) -> Result<(), Error> {
        buyer.require_auth();

        let mut listing = Self::load_listing(&e, slot)?;
        if listing.state != ListingState::Refund {
            return Err(Error::ListingNotRefunding);
        }

        let balance = Self::buyer_balance(&e, slot, &buyer);
        if balance <= 0 {
            return Err(Error::NothingToRefund);
        }

        // CEI: zero the balance before paying out.
        Self::set_buyer_balance(&e, slot, &buyer, 0);
        listing.settled_sum -= balance;
        listing.buyer_count -= 1;
        Self::save_listing(&e, slot, &listing);

        let amount = balance + listing.refund_bonus;
        let token = Self::token_client(&e)?;
        token.transfer(&e.current_contract_address(), &buyer, &amount);

        events::emit_refund_issued(&e, &buyer, slot, amount);
        Ok(())
    }

    // ── Administration ─────────────────────────────────────────────────────

    /// One-shot decommissioning, gated on zero open listings.
    ///
    /// Sweeps any residual token balance (unclaimed stakes) to the admin
    /// and permanently blocks `open_source`.
    ///
    /// # Errors
    /// * `NotInitialized` — no admin stored
    /// * `Decommissioned` — already shut down
    /// * `OpenListingsRemain` — some listing is still open or refunding
    pub fn shutdown(e: Env) -> Result<(), Error> {
        let admin: Address = e
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        if Self::decommissioned(&e) {
            return Err(Error::Decommissioned);
        }
        if Self::open_listing_count(&e) != 0 {
            return Err(Error::OpenListingsRemain);
        }

        e.storage().instance().set(&DataKey::Decommissioned, &true);

        let token = Self::token_client(&e)?;
        let contract = e.current_contract_address();
        let residual = token.balance(&contract);
        if residual > 0 {
            token.transfer(&contract, &admin, &residual);
        }

        events::emit_shutdown(&e, &admin, residual);
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────────

    /// Returns the listing in `slot`. Panics if the slot was never used.
    pub fn get_listing(e: Env, slot: u64) -> Listing {
        Self::load_listing(&e, slot).expect("listing not found")
    }

    /// Returns the exchange record for (`slot`, `buyer`). Panics if the
    /// buyer never bid on this slot.
    pub fn get_exchange(e: Env, slot: u64, buyer: Address) -> FairExchange {
        Self::load_exchange(&e, slot, &buyer).expect("exchange not found")
    }

    /// Returns the buyer's settled balance on `slot` (0 if none).
    pub fn get_buyer_balance(e: Env, slot: u64, buyer: Address) -> i128 {
        Self::buyer_balance(&e, slot, &buyer)
    }

    /// Returns the number of listings not yet closed.
    pub fn get_open_listing_count(e: Env) -> u32 {
        Self::open_listing_count(&e)
    }

    /// Returns `true` once `shutdown` has run.
    pub fn is_decommissioned(e: Env) -> bool {
        Self::decommissioned(&e)
    }
}




#[cfg(test)]
mod test_dispute;
