// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = check(conn)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|(k, d)| vec![k, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Sweep the store for violations of the checkout invariants, returning
/// `(kind, detail)` pairs. Everything reported here points at external
/// tampering or a bug; a healthy store returns nothing.
pub fn check(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut rows = Vec::new();

    // 1) Stock must never be negative.
    let mut stmt = conn.prepare("SELECT id, stock FROM products WHERE stock < 0")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let stock: i64 = r.get(1)?;
        rows.push((
            "negative_stock".into(),
            format!("product {} has stock {}", id, stock),
        ));
    }

    // 2) Per-item arithmetic and per-transaction totals. Decimal math in
    //    Rust; the TEXT columns would only sum as floats in SQL.
    let mut txn_stmt = conn.prepare("SELECT id, total_amount FROM transactions ORDER BY id")?;
    let mut txns = txn_stmt.query([])?;
    while let Some(t) = txns.next()? {
        let txn_id: i64 = t.get(0)?;
        let total_raw: String = t.get(1)?;
        let total = total_raw
            .parse::<Decimal>()
            .with_context(|| format!("Invalid total '{}' on transaction {}", total_raw, txn_id))?;

        let mut item_stmt = conn.prepare(
            "SELECT id, qty, price_each, subtotal FROM transaction_items WHERE transaction_id=?1",
        )?;
        let mut items = item_stmt.query([txn_id])?;
        let mut sum = Decimal::ZERO;
        while let Some(i) = items.next()? {
            let item_id: i64 = i.get(0)?;
            let qty: i64 = i.get(1)?;
            let price_raw: String = i.get(2)?;
            let sub_raw: String = i.get(3)?;
            let price_each = price_raw
                .parse::<Decimal>()
                .with_context(|| format!("Invalid price '{}' on item {}", price_raw, item_id))?;
            let subtotal = sub_raw
                .parse::<Decimal>()
                .with_context(|| format!("Invalid subtotal '{}' on item {}", sub_raw, item_id))?;
            if price_each * Decimal::from(qty) != subtotal {
                rows.push((
                    "subtotal_mismatch".into(),
                    format!("item {}: {} x {} != {}", item_id, price_each, qty, subtotal),
                ));
            }
            sum += subtotal;
        }
        if sum != total {
            rows.push((
                "total_mismatch".into(),
                format!("transaction {}: items sum {} != total {}", txn_id, sum, total),
            ));
        }
    }

    // 3) Items pointing at products that no longer exist.
    let mut orphan_stmt = conn.prepare(
        "SELECT DISTINCT i.product_id FROM transaction_items i
         LEFT JOIN products p ON p.id = i.product_id WHERE p.id IS NULL",
    )?;
    let mut orphans = orphan_stmt.query([])?;
    while let Some(r) = orphans.next()? {
        let pid: i64 = r.get(0)?;
        rows.push((
            "missing_product".into(),
            format!("items reference deleted product {}", pid),
        ));
    }

    Ok(rows)
}
