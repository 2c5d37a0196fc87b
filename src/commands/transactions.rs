// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::products::{prefixed_cols, product_from_row_at, PRODUCT_COLS};
use crate::error::CoreError;
use crate::models::{LineDetail, Transaction, TransactionDetail, TransactionItem};
use crate::utils::{maybe_print_json, parse_cart_line, pretty_table, require_text};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct CartLine {
    pub product_id: i64,
    pub qty: i64,
}

struct PreparedLine {
    product_id: i64,
    qty: i64,
    price_each: Decimal,
    subtotal: Decimal,
}

/// Convert a cart into a committed transaction, its items, and the
/// matching stock/sold_count adjustments, all-or-nothing.
///
/// Unknown products are rejected before the write transaction opens, so
/// they surface as `NotFound` rather than a stock failure. Inside the
/// transaction every line re-reads its product, and a shortfall anywhere
/// rolls the whole checkout back.
pub fn checkout(
    conn: &mut Connection,
    customer_name: &str,
    payment_method: &str,
    lines: &[CartLine],
) -> Result<TransactionDetail, CoreError> {
    let customer_name = require_text("customer_name", customer_name, 255)?;
    let payment_method = require_text("payment_method", payment_method, 100)?;
    if lines.is_empty() {
        return Err(CoreError::validation(
            "items",
            "must contain at least one line",
        ));
    }
    for line in lines {
        if line.qty < 1 {
            return Err(CoreError::validation(
                "qty",
                format!("must be a positive integer (product {})", line.product_id),
            ));
        }
    }

    {
        let mut exists = conn.prepare("SELECT 1 FROM products WHERE id=?1")?;
        let mut ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        for id in ids {
            let hit: Option<i64> = exists.query_row(params![id], |r| r.get(0)).optional()?;
            if hit.is_none() {
                return Err(CoreError::product_not_found(id));
            }
        }
    }

    // Ascending product-id order: two checkouts with overlapping carts
    // always take their row locks in the same order.
    let mut ordered: Vec<CartLine> = lines.to_vec();
    ordered.sort_by_key(|l| l.product_id);

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut prepared: Vec<PreparedLine> = Vec::with_capacity(ordered.len());
    let mut total = Decimal::ZERO;
    let txn_id;
    {
        let mut fetch = tx.prepare(&format!(
            "SELECT {} FROM products WHERE id=?1",
            PRODUCT_COLS
        ))?;
        // Remaining stock per product, so repeated lines for the same
        // product are checked against what earlier lines already took.
        let mut remaining: HashMap<i64, i64> = HashMap::new();
        for line in &ordered {
            let product = fetch
                .query_row(params![line.product_id], |r| product_from_row_at(r, 0))
                .optional()?
                .ok_or_else(|| CoreError::product_not_found(line.product_id))?;
            let available = *remaining.entry(line.product_id).or_insert(product.stock);
            if available < line.qty {
                return Err(CoreError::InsufficientStock {
                    product_id: line.product_id,
                    available,
                    requested: line.qty,
                });
            }
            remaining.insert(line.product_id, available - line.qty);

            let price_each = product.price;
            let subtotal = price_each * Decimal::from(line.qty);
            total += subtotal;
            prepared.push(PreparedLine {
                product_id: line.product_id,
                qty: line.qty,
                price_each,
                subtotal,
            });
        }

        tx.execute(
            "INSERT INTO transactions(customer_name, payment_method, total_amount)
             VALUES (?1, ?2, ?3)",
            params![customer_name, payment_method, total.to_string()],
        )?;
        txn_id = tx.last_insert_rowid();

        let mut insert_item = tx.prepare(
            "INSERT INTO transaction_items(transaction_id, product_id, qty, price_each, subtotal)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut adjust = tx.prepare(
            "UPDATE products SET stock = stock - ?1, sold_count = sold_count + ?1 WHERE id=?2",
        )?;
        for row in &prepared {
            insert_item.execute(params![
                txn_id,
                row.product_id,
                row.qty,
                row.price_each.to_string(),
                row.subtotal.to_string()
            ])?;
            adjust.execute(params![row.qty, row.product_id])?;
        }
    }
    tx.commit()?;

    get(conn, txn_id)
}

fn transaction_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    let total_raw: String = r.get(3)?;
    let total_amount = total_raw.parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Transaction {
        id: r.get(0)?,
        customer_name: r.get(1)?,
        payment_method: r.get(2)?,
        total_amount,
        created_at: r.get(4)?,
    })
}

fn load_items(conn: &Connection, transaction: Transaction) -> Result<TransactionDetail, CoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT i.id, i.transaction_id, i.product_id, i.qty, i.price_each, i.subtotal, {}
         FROM transaction_items i
         LEFT JOIN products p ON p.id = i.product_id
         WHERE i.transaction_id=?1
         ORDER BY i.id",
        prefixed_cols("p")
    ))?;
    let rows = stmt.query_map(params![transaction.id], |r| {
        let price_raw: String = r.get(4)?;
        let price_each = price_raw.parse::<Decimal>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let subtotal_raw: String = r.get(5)?;
        let subtotal = subtotal_raw.parse::<Decimal>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let item = TransactionItem {
            id: r.get(0)?,
            transaction_id: r.get(1)?,
            product_id: r.get(2)?,
            qty: r.get(3)?,
            price_each,
            subtotal,
        };
        let product = match r.get::<_, Option<i64>>(6)? {
            Some(_) => Some(product_from_row_at(r, 6)?),
            None => None,
        };
        Ok(LineDetail { item, product })
    })?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(TransactionDetail { transaction, items })
}

/// All transactions with nested items and products, most recent first.
pub fn list(conn: &Connection) -> Result<Vec<TransactionDetail>, CoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_name, payment_method, total_amount, created_at
         FROM transactions ORDER BY id DESC",
    )?;
    let rows = stmt.query_map([], transaction_from_row)?;
    let mut details = Vec::new();
    for row in rows {
        details.push(load_items(conn, row?)?);
    }
    Ok(details)
}

pub fn get(conn: &Connection, id: i64) -> Result<TransactionDetail, CoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_name, payment_method, total_amount, created_at
         FROM transactions WHERE id=?1",
    )?;
    let transaction = stmt
        .query_row(params![id], transaction_from_row)
        .optional()?
        .ok_or_else(|| CoreError::transaction_not_found(id))?;
    load_items(conn, transaction)
}

/// Committed transactions are immutable; this always fails, even for ids
/// that do not exist.
pub fn update(_conn: &Connection, _id: i64) -> Result<TransactionDetail, CoreError> {
    Err(CoreError::Unsupported("updating transactions"))
}

/// See [`update`].
pub fn delete(_conn: &Connection, _id: i64) -> Result<(), CoreError> {
    Err(CoreError::Unsupported("deleting transactions"))
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("checkout", sub)) => {
            let customer = sub.get_one::<String>("customer").unwrap();
            let method = sub.get_one::<String>("method").unwrap();
            let mut lines = Vec::new();
            for raw in sub.get_many::<String>("item").unwrap() {
                let (product_id, qty) = parse_cart_line(raw)?;
                lines.push(CartLine { product_id, qty });
            }
            let detail = checkout(conn, customer, method, &lines)?;
            println!(
                "Checkout complete: transaction {} for '{}', {} item(s), total {}",
                detail.transaction.id,
                detail.transaction.customer_name,
                detail.items.len(),
                detail.transaction.total_amount
            );
        }
        Some(("list", sub)) => {
            let data = list(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows: Vec<Vec<String>> = data
                    .iter()
                    .map(|d| {
                        vec![
                            d.transaction.id.to_string(),
                            d.transaction.customer_name.clone(),
                            d.transaction.payment_method.clone(),
                            d.transaction.total_amount.to_string(),
                            d.items.len().to_string(),
                            d.transaction.created_at.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Customer", "Method", "Total", "Items", "Created"],
                        rows
                    )
                );
            }
        }
        Some(("show", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let detail = get(conn, id)?;
            if !maybe_print_json(sub.get_flag("json"), false, &detail)? {
                println!(
                    "Transaction {} | {} | {} | total {} | {}",
                    detail.transaction.id,
                    detail.transaction.customer_name,
                    detail.transaction.payment_method,
                    detail.transaction.total_amount,
                    detail.transaction.created_at
                );
                let rows: Vec<Vec<String>> = detail
                    .items
                    .iter()
                    .map(|l| {
                        vec![
                            l.item.product_id.to_string(),
                            l.product
                                .as_ref()
                                .map(|p| p.name.clone())
                                .unwrap_or_else(|| "(deleted)".into()),
                            l.item.qty.to_string(),
                            l.item.price_each.to_string(),
                            l.item.subtotal.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Product", "Name", "Qty", "Price", "Subtotal"], rows)
                );
            }
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            update(conn, id)?;
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            delete(conn, id)?;
        }
        _ => {}
    }
    Ok(())
}
