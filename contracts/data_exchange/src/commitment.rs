//! Commit-reveal primitives for the two-fragment key disclosure.
//!
//! The decryption key is split into two 32-byte fragments whose XOR
//! reconstitutes the key. The buyer commits to the first fragment at bid
//! time; the provider reveals the second fragment on acceptance. A dispute
//! reassembles the key and checks it against the listing's commitment.

use soroban_sdk::{Bytes, BytesN, Env};

/// sha256 of a 32-byte value.
pub fn commit(env: &Env, value: &BytesN<32>) -> BytesN<32> {
    env.crypto().sha256(&Bytes::from(value.clone())).to_bytes()
}

/// True iff `preimage` hashes to `commitment`.
pub fn matches(env: &Env, preimage: &BytesN<32>, commitment: &BytesN<32>) -> bool {
    commit(env, preimage) == *commitment
}

/// Reassemble the key from its two fragments: `first XOR second`.
pub fn reassemble_key(env: &Env, first: &BytesN<32>, second: &BytesN<32>) -> BytesN<32> {
    let a = first.to_array();
    let b = second.to_array();
    let mut key = [0u8; 32];
    for i in 0..32 {
        key[i] = a[i] ^ b[i];
    }
    BytesN::from_array(env, &key)
}
