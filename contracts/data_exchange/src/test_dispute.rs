//! Dispute resolution: commit-reveal verification and its two outcomes.

#![cfg(test)]

use crate::test_helpers::*;
use crate::{Error, ExchangeState, ListingState, ACCEPT_PHASE_TIMEOUT};
use soroban_sdk::testutils::Ledger;
use soroban_sdk::{Bytes, BytesN, Env, String};

// ═══════════════════════════════════════════════════════════════════
// 1. First-half verification gates everything
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_dispute_with_bogus_first_half_changes_nothing() {
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);
    place_bid(&s, &e, &s.buyer, &fx, 100);
    s.client.accept(&SLOT, &s.buyer, &fx.second_half);

    let bogus = BytesN::from_array(&e, &[0xEE; 32]);
    let err = s
        .client
        .try_dispute(&SLOT, &s.buyer, &bogus)
        .err()
        .unwrap()
        .unwrap();
    assert_eq!(err, Error::WrongFirstHalf);

    // No state change: the exchange is still live and disputable.
    assert_eq!(
        s.client.get_exchange(&SLOT, &s.buyer).state,
        ExchangeState::Accepted
    );
    assert_eq!(s.client.get_listing(&SLOT).state, ListingState::Open);
}

#[test]
fn test_dispute_rejected_independent_of_revealed_half() {
    // Even when the provider cheated, a wrong preimage still rejects the
    // call outright — the commitment made at bid time is what gates entry.
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);
    place_bid(&s, &e, &s.buyer, &fx, 100);
    s.client.accept(&SLOT, &s.buyer, &cheating_second_half(&e));

    let bogus = BytesN::from_array(&e, &[0xEE; 32]);
    let err = s
        .client
        .try_dispute(&SLOT, &s.buyer, &bogus)
        .err()
        .unwrap()
        .unwrap();
    assert_eq!(err, Error::WrongFirstHalf);
    assert_eq!(s.client.get_listing(&SLOT).state, ListingState::Open);
}

// ═══════════════════════════════════════════════════════════════════
// 2. Honest provider: escrow paid out immediately
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_dispute_against_honest_provider_pays_provider() {
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);
    place_bid(&s, &e, &s.buyer, &fx, 100);
    s.client.accept(&SLOT, &s.buyer, &fx.second_half);

    let before = s.token.balance(&s.provider);
    s.client.dispute(&SLOT, &s.buyer, &fx.first_half);

    assert_eq!(s.token.balance(&s.provider) - before, 100);
    let listing = s.client.get_listing(&SLOT);
    assert_eq!(listing.state, ListingState::Open);
    assert_eq!(listing.settled_sum, 0);
    assert_eq!(
        s.client.get_exchange(&SLOT, &s.buyer).state,
        ExchangeState::Closed
    );
}

// ═══════════════════════════════════════════════════════════════════
// 3. Cheating provider: blanket refund
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_dispute_against_cheat_flips_listing_to_refund() {
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);

    // One buyer already settled 25 before the cheat is exposed.
    let settled_buyer = extra_buyer(&s, &e);
    settle_exchange(&s, &e, &settled_buyer, &fx, 25);

    place_bid(&s, &e, &s.buyer, &fx, 100);
    s.client.accept(&SLOT, &s.buyer, &cheating_second_half(&e));

    let provider_before = s.token.balance(&s.provider);
    s.client.dispute(&SLOT, &s.buyer, &fx.first_half);

    let listing = s.client.get_listing(&SLOT);
    assert_eq!(listing.state, ListingState::Refund);
    // refund_bonus = floor(settled_sum / provider_stake) = floor(25 / 10)
    assert_eq!(listing.refund_bonus, 2);
    // Settled balances are untouched until refund_user.
    assert_eq!(listing.settled_sum, 25);
    // The provider is never paid for the disputed exchange.
    assert_eq!(s.token.balance(&s.provider), provider_before);
    // The disputer's own escrow comes straight back.
    assert_eq!(s.token.balance(&s.buyer), DEFAULT_MINT);
}

#[test]
fn test_refund_listing_accepts_no_new_bids_or_accepts() {
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);

    let second = extra_buyer(&s, &e);
    place_bid(&s, &e, &second, &fx, 40);

    place_bid(&s, &e, &s.buyer, &fx, 100);
    s.client.accept(&SLOT, &s.buyer, &cheating_second_half(&e));
    s.client.dispute(&SLOT, &s.buyer, &fx.first_half);

    // New bid on the refunding slot fails.
    let fresh = extra_buyer(&s, &e);
    let err = s
        .client
        .try_bid(
            &fresh,
            &SLOT,
            &10_i128,
            &Bytes::from_slice(&e, b"x"),
            &fx.half_commitment,
        )
        .err()
        .unwrap()
        .unwrap();
    assert_eq!(err, Error::ListingNotOpen);

    // Acceptance of the still-proposed bid fails too.
    let err = s
        .client
        .try_accept(&SLOT, &second, &fx.second_half)
        .err()
        .unwrap()
        .unwrap();
    assert_eq!(err, Error::ListingNotOpen);
}

#[test]
fn test_refund_bonus_computed_only_once() {
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);

    let settled_buyer = extra_buyer(&s, &e);
    settle_exchange(&s, &e, &settled_buyer, &fx, 50);

    // Two accepted-but-cheated exchanges live at the same time.
    let second = extra_buyer(&s, &e);
    place_bid(&s, &e, &s.buyer, &fx, 100);
    place_bid(&s, &e, &second, &fx, 100);
    s.client.accept(&SLOT, &s.buyer, &cheating_second_half(&e));
    s.client.accept(&SLOT, &second, &cheating_second_half(&e));

    s.client.dispute(&SLOT, &s.buyer, &fx.first_half);
    assert_eq!(s.client.get_listing(&SLOT).refund_bonus, 5);

    // The second upheld dispute still returns the escrow but must not
    // recompute the bonus.
    s.client.dispute(&SLOT, &second, &fx.first_half);
    assert_eq!(s.client.get_listing(&SLOT).refund_bonus, 5);
    assert_eq!(s.token.balance(&second), DEFAULT_MINT);
}

#[test]
fn test_settle_to_provider_blocked_after_refund() {
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);
    place_bid(&s, &e, &s.buyer, &fx, 100);
    s.client.accept(&SLOT, &s.buyer, &cheating_second_half(&e));
    s.client.dispute(&SLOT, &s.buyer, &fx.first_half);

    e.ledger().with_mut(|li| li.timestamp += SEVENTY_MINUTES + 1);
    let err = s.client.try_settle_to_provider(&SLOT).err().unwrap().unwrap();
    assert_eq!(err, Error::ListingNotOpen);
}

#[test]
fn test_open_source_blocked_on_refunding_slot() {
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);
    place_bid(&s, &e, &s.buyer, &fx, 100);
    s.client.accept(&SLOT, &s.buyer, &cheating_second_half(&e));
    s.client.dispute(&SLOT, &s.buyer, &fx.first_half);

    let deadline = e.ledger().timestamp() + SEVENTY_MINUTES;
    let err = s
        .client
        .try_open_source(
            &s.provider,
            &SLOT,
            &String::from_str(&e, "d"),
            &String::from_str(&e, "t"),
            &Bytes::from_slice(&e, b"c"),
            &fx.key_commitment,
            &deadline,
            &STAKE,
        )
        .err()
        .unwrap()
        .unwrap();
    assert_eq!(err, Error::SlotOccupied);
}

// ═══════════════════════════════════════════════════════════════════
// 4. Window and state preconditions
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_dispute_after_window_fails() {
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);
    place_bid(&s, &e, &s.buyer, &fx, 100);
    s.client.accept(&SLOT, &s.buyer, &cheating_second_half(&e));

    e.ledger().with_mut(|li| li.timestamp += ACCEPT_PHASE_TIMEOUT + 1);
    let err = s
        .client
        .try_dispute(&SLOT, &s.buyer, &fx.first_half)
        .err()
        .unwrap()
        .unwrap();
    assert_eq!(err, Error::PhaseExpired);
}

#[test]
fn test_dispute_before_accept_fails() {
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);
    place_bid(&s, &e, &s.buyer, &fx, 100);

    let err = s
        .client
        .try_dispute(&SLOT, &s.buyer, &fx.first_half)
        .err()
        .unwrap()
        .unwrap();
    assert_eq!(err, Error::ExchangeNotAccepted);
}

#[test]
fn test_dispute_after_finish_fails() {
    let e = Env::default();
    let s = setup(&e);
    let fx = key_fixture(&e);
    open_listing(&s, &e, &fx.key_commitment);
    settle_exchange(&s, &e, &s.buyer, &fx, 100);

    let err = s
        .client
        .try_dispute(&SLOT, &s.buyer, &fx.first_half)
        .err()
        .unwrap()
        .unwrap();
    assert_eq!(err, Error::ExchangeNotAccepted);
}
