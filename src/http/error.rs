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

//! Error types for Bitfinex HTTP client operations.
//!
//! Classification happens once, at the response boundary: the pure
//! functions here map (status, body) to a typed error, and the client
//! surfaces the result unchanged. It never retries or downgrades.

use serde_json::Value;
use thiserror::Error;

/// Venue error code for invalid API key or signature.
const ERROR_CODE_AUTH: i64 = 10100;

/// Venue error code for maintenance mode.
const ERROR_CODE_MAINTENANCE: i64 = 20060;

#[derive(Debug, Clone, Error)]
pub enum BitfinexHttpError {
    #[error("Missing credentials for private endpoint")]
    MissingCredentials,

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Exchange is on maintenance")]
    OnMaintenance,

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Bad symbol: {0}")]
    BadSymbol(String),

    #[error("Exchange error: {message} (#{code:?})")]
    ExchangeError { code: Option<i64>, message: String },

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Arguments required: {0}")]
    ArgumentsRequired(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<anyhow::Error> for BitfinexHttpError {
    fn from(err: anyhow::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

/// Classifies an unsuccessful HTTP response into the error taxonomy.
///
/// Only status 500 carries venue-specific error semantics; the body is then
/// `[_, code, text, ...]`. Codes are matched first, then the text by
/// prefix, ordered from most to least specific. Any other failing status
/// yields `None` and is left to the caller as a transport-level error.
#[must_use]
pub fn classify_error_response(status: u16, body: &Value) -> Option<BitfinexHttpError> {
    if status != 500 {
        return None;
    }

    let record = body.as_array().map_or(&[] as &[Value], Vec::as_slice);
    let code = record.get(1).and_then(Value::as_i64);
    let text = record.get(2).and_then(Value::as_str).unwrap_or_default();

    let error = match code {
        Some(ERROR_CODE_AUTH) => BitfinexHttpError::AuthenticationError(text.to_string()),
        Some(ERROR_CODE_MAINTENANCE) => BitfinexHttpError::OnMaintenance,
        _ => {
            if text.starts_with("Invalid order: not enough exchange balance") {
                BitfinexHttpError::InsufficientFunds(text.to_string())
            } else if text.starts_with("Invalid order") {
                BitfinexHttpError::InvalidOrder(text.to_string())
            } else if text.starts_with("Order not found") {
                BitfinexHttpError::OrderNotFound(text.to_string())
            } else if text.starts_with("symbol: invalid") {
                BitfinexHttpError::BadSymbol(text.to_string())
            } else {
                BitfinexHttpError::ExchangeError {
                    code,
                    message: text.to_string(),
                }
            }
        }
    };

    Some(error)
}

/// Inspects a successful-status response body for an embedded error.
///
/// Some venue errors arrive with status 200 as an object carrying a
/// free-text `message` field; a balance complaint is reclassified as
/// insufficient funds, anything else is a generic exchange error.
#[must_use]
pub fn classify_success_body(body: &Value) -> Option<BitfinexHttpError> {
    let message = body.get("message")?.as_str()?;

    if message.contains("not enough exchange balance") {
        Some(BitfinexHttpError::InsufficientFunds(message.to_string()))
    } else {
        Some(BitfinexHttpError::ExchangeError {
            code: None,
            message: message.to_string(),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
