// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Bitfinex API credential handling and request signing.
//!
//! Authenticated v2 requests carry three headers: a strictly increasing
//! nonce, the API key, and a hex-encoded HMAC-SHA384 signature over
//! `"/api/" + versioned-path + nonce + body`. The venue rejects replayed or
//! out-of-order nonces, so nonce issuance is serialized per credential and
//! guarded against clock regression.

use std::{
    fmt::Debug,
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use aws_lc_rs::hmac;
use ustr::Ustr;
use zeroize::ZeroizeOnDrop;

use crate::common::consts::SIGNING_PATH_PREFIX;

/// Returns the current Unix time in milliseconds.
fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

/// Issues strictly increasing integer nonces based on a millisecond clock.
///
/// Issuance is serialized: concurrent callers on the same generator always
/// observe distinct, increasing values, even if the wall clock stalls or
/// steps backwards between calls.
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last: Mutex<u64>,
}

impl NonceGenerator {
    /// Returns the next nonce.
    pub fn next_nonce(&self) -> u64 {
        let now = unix_millis();
        let mut last = self.last.lock().expect("nonce mutex poisoned");
        *last = if now > *last { now } else { *last + 1 };
        *last
    }
}

/// Bitfinex API credentials for signing requests.
///
/// Uses HMAC SHA384 with hexadecimal encoding, as required by the Bitfinex
/// v2 REST API signing scheme.
#[derive(ZeroizeOnDrop)]
pub struct BitfinexCredential {
    #[zeroize(skip)]
    pub api_key: Ustr,
    api_secret: Box<[u8]>,
    #[zeroize(skip)]
    nonces: NonceGenerator,
}

impl Debug for BitfinexCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(BitfinexCredential))
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl BitfinexCredential {
    /// Creates a new [`BitfinexCredential`] instance.
    #[must_use]
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into_bytes().into_boxed_slice(),
            nonces: NonceGenerator::default(),
        }
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.as_str()
    }

    /// Issues the next nonce for this credential.
    #[must_use]
    pub fn next_nonce(&self) -> u64 {
        self.nonces.next_nonce()
    }

    /// Signs a message with HMAC SHA384 and returns a lowercase hex digest.
    #[must_use]
    pub fn sign(&self, message: &str) -> String {
        let key = hmac::Key::new(hmac::HMAC_SHA384, &self.api_secret);
        let tag = hmac::sign(&key, message.as_bytes());
        hex::encode(tag.as_ref())
    }

    /// Signs an authenticated request over the versioned path, nonce and body.
    ///
    /// The signing input is `"/api/" + versioned_path + nonce + body` where
    /// `body` is the exact JSON string sent on the wire.
    #[must_use]
    pub fn sign_request(&self, versioned_path: &str, nonce: u64, body: &str) -> String {
        let message = format!("{SIGNING_PATH_PREFIX}{versioned_path}{nonce}{body}");
        self.sign(&message)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_sign_matches_rfc4231_test_vector() {
        // RFC 4231 test case 2 for HMAC-SHA384
        let cred = BitfinexCredential::new("test_key".to_string(), "Jefe".to_string());
        let expected = "af45d2e376484031617f78d2b58a6b1b9c7ef464f5a01b47e42ec3736322445e\
                        8e2240ca5e69e2c78b3239ecfab21649";

        assert_eq!(cred.sign("what do ya want for nothing?"), expected);
    }

    #[rstest]
    fn test_sign_request_concatenation_order() {
        let cred = BitfinexCredential::new("key".to_string(), "secret".to_string());
        let direct = cred.sign("/api/v2/auth/r/wallets1578784364748{}");

        assert_eq!(cred.sign_request("v2/auth/r/wallets", 1_578_784_364_748, "{}"), direct);
    }

    #[rstest]
    fn test_nonce_strictly_increasing() {
        let generator = NonceGenerator::default();
        let mut previous = generator.next_nonce();
        for _ in 0..1000 {
            let nonce = generator.next_nonce();
            assert!(nonce > previous);
            previous = nonce;
        }
    }

    #[rstest]
    fn test_nonce_distinct_under_concurrency() {
        let cred = Arc::new(BitfinexCredential::new("k".to_string(), "s".to_string()));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cred = cred.clone();
            handles.push(std::thread::spawn(move || {
                (0..250).map(|_| cred.next_nonce()).collect::<Vec<_>>()
            }));
        }

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();

        assert_eq!(all.len(), total, "nonces must be unique across threads");
    }

    #[rstest]
    fn test_debug_redacts_secret() {
        let cred = BitfinexCredential::new("visible".to_string(), "hidden".to_string());
        let debug_str = format!("{cred:?}");

        assert!(debug_str.contains("visible"));
        assert!(debug_str.contains("<redacted>"));
        assert!(!debug_str.contains("hidden"));
    }
}
