use soroban_sdk::contracterror;

/// Precondition-violation codes returned by every mutating entrypoint.
///
/// Each code means the call was rejected with **no state written**; the
/// caller may retry once the condition holds. Token-transfer failures are
/// the other failure class: they trap the host and roll back the entire
/// invocation, so there is no error code for them here.
///
/// Codes are wire-stable. Never renumber a variant; append within the
/// category block only.
///
/// Error Code Layout:
///   1  -  9  : Initialization / lifecycle
///   10 - 19  : Listing registry
///   20 - 39  : Exchange engine
///   40 - 49  : Escrow & refund accounting
#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Error {
    // --- Initialization / lifecycle (1-9) ---
    AlreadyInitialized = 1,
    NotInitialized = 2,
    /// The contract has been decommissioned; no new listings may open.
    Decommissioned = 3,
    /// `shutdown` requires every listing to be closed first.
    OpenListingsRemain = 4,
    Unauthorized = 5,

    // --- Listing registry (10-19) ---
    /// `open_source` on a slot whose listing is not closed.
    SlotOccupied = 10,
    ListingNotFound = 11,
    ListingNotOpen = 12,
    /// Listing deadline must exceed twice the bid-phase timeout.
    DeadlineTooSoon = 13,
    /// Zero-stake listings are forbidden (the refund bonus divides by the stake).
    InvalidStake = 14,
    /// The listing deadline has not yet elapsed.
    DeadlineNotReached = 15,
    /// `close_empty_listing` requires a zero buyer count.
    ListingNotEmpty = 16,

    // --- Exchange engine (20-39) ---
    /// Bids must arrive more than one bid-timeout before the listing deadline.
    BiddingClosed = 20,
    /// Offered value must be positive.
    InvalidValue = 21,
    /// The buyer already has a live (non-closed) exchange on this slot.
    ExchangeActive = 22,
    ExchangeNotFound = 23,
    ExchangeNotProposed = 24,
    ExchangeNotAccepted = 25,
    /// The phase deadline has elapsed; accept/dispute is no longer possible.
    PhaseExpired = 26,
    /// The phase deadline has not elapsed; timeout/auto-finish is premature.
    PhaseNotExpired = 27,
    /// The disputed first half does not hash to the commitment made at bid time.
    WrongFirstHalf = 28,

    // --- Escrow & refund accounting (40-49) ---
    /// `refund_user` requires the listing to be in the refund state.
    ListingNotRefunding = 40,
    /// The caller has no positive settled balance on this slot.
    NothingToRefund = 41,
}
