// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub size_range: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub sold_count: i64,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub customer_name: String,
    pub payment_method: String,
    pub total_amount: Decimal,
    pub created_at: NaiveDateTime,
}

/// One line of a committed transaction. `price_each` and `subtotal` are
/// snapshots taken at sale time; later catalog price changes never touch
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    pub qty: i64,
    pub price_each: Decimal,
    pub subtotal: Decimal,
}

/// An item of a materialized transaction tree. The product is `None` when
/// it has since been deleted from the catalog; the item itself keeps the
/// sale-time numbers either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDetail {
    pub item: TransactionItem,
    pub product: Option<Product>,
}

/// A transaction with its items eagerly loaded, the shape every
/// transaction read returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub items: Vec<LineDetail>,
}
