// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::products::{self, NewProduct};
use crate::utils::parse_decimal;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("products", sub)) => import_products(conn, sub),
        _ => Ok(()),
    }
}

/// Load a product CSV (`name,brand,category,color,size_range,price,stock,
/// image_url,description`) in one transaction; a bad row aborts the whole
/// file.
fn import_products(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut count = 0usize;
    for (i, result) in rdr.records().enumerate() {
        let row = i + 2; // header is line 1
        let rec = result?;
        let opt = |idx: usize| {
            rec.get(idx)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        let name = rec
            .get(0)
            .with_context(|| format!("Row {}: name missing", row))?
            .trim()
            .to_string();
        let price_raw = rec
            .get(5)
            .with_context(|| format!("Row {}: price missing", row))?
            .trim();
        let price =
            parse_decimal(price_raw).with_context(|| format!("Row {}: bad price", row))?;
        let stock_raw = rec
            .get(6)
            .with_context(|| format!("Row {}: stock missing", row))?
            .trim();
        let stock: i64 = stock_raw
            .parse()
            .with_context(|| format!("Row {}: invalid stock '{}'", row, stock_raw))?;

        let input = NewProduct {
            name,
            brand: opt(1),
            category: opt(2),
            color: opt(3),
            size_range: opt(4),
            price,
            stock,
            image_url: opt(7),
            description: opt(8),
        };
        products::create(&tx, &input).with_context(|| format!("Row {}", row))?;
        count += 1;
    }
    tx.commit()?;
    println!("Imported {} products from {}", count, path);
    Ok(())
}
