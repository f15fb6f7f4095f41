// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-client push-authentication token minting.

use rand::RngCore;

/// Mints a random 32-byte push token, hex-encoded, handed to a client in its
/// `hello` frame and required back (via `X-Push-Token`) on
/// `/push/subscribe` and `/push/unsubscribe`.
pub fn mint_push_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mints_64_char_hex_tokens_that_differ() {
        let a = mint_push_token();
        let b = mint_push_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
