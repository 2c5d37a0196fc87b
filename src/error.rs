// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors surfaced by the catalog, checkout, and recommendation operations.
///
/// The write path treats every variant as terminal: a checkout that fails
/// for any reason rolls back in full, and nothing here is retried.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(
        "stock not enough for product ID {product_id}. available: {available}, requested: {requested}"
    )]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

impl CoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn product_not_found(id: i64) -> Self {
        CoreError::NotFound {
            entity: "product",
            id,
        }
    }

    pub fn transaction_not_found(id: i64) -> Self {
        CoreError::NotFound {
            entity: "transaction",
            id,
        }
    }
}
