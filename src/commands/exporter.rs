// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{products, transactions};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("products", sub)) => export_products(conn, sub),
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_products(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let data = products::list(conn)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "name",
                "brand",
                "category",
                "color",
                "size_range",
                "price",
                "stock",
                "sold_count",
                "image_url",
                "description",
                "created_at",
            ])?;
            for p in &data {
                wtr.write_record([
                    p.id.to_string(),
                    p.name.clone(),
                    p.brand.clone().unwrap_or_default(),
                    p.category.clone().unwrap_or_default(),
                    p.color.clone().unwrap_or_default(),
                    p.size_range.clone().unwrap_or_default(),
                    p.price.to_string(),
                    p.stock.to_string(),
                    p.sold_count.to_string(),
                    p.image_url.clone().unwrap_or_default(),
                    p.description.clone().unwrap_or_default(),
                    p.created_at.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&data)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported products to {}", out);
    Ok(())
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let data = transactions::list(conn)?;

    match fmt.as_str() {
        "csv" => {
            // One row per item, transaction columns repeated.
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "transaction_id",
                "customer_name",
                "payment_method",
                "created_at",
                "product_id",
                "product_name",
                "qty",
                "price_each",
                "subtotal",
                "total_amount",
            ])?;
            for d in &data {
                for line in &d.items {
                    wtr.write_record([
                        d.transaction.id.to_string(),
                        d.transaction.customer_name.clone(),
                        d.transaction.payment_method.clone(),
                        d.transaction.created_at.to_string(),
                        line.item.product_id.to_string(),
                        line.product
                            .as_ref()
                            .map(|p| p.name.clone())
                            .unwrap_or_default(),
                        line.item.qty.to_string(),
                        line.item.price_each.to_string(),
                        line.item.subtotal.to_string(),
                        d.transaction.total_amount.to_string(),
                    ])?;
                }
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&data)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
