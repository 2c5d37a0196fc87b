// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::products::{self, prefixed_cols, product_from_row_at};
use crate::config::RecommendConfig;
use crate::error::CoreError;
use crate::models::Product;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendMode {
    TopSeller,
    RuleBasedBrand,
}

/// A candidate with its qty total across all committed transaction items.
/// The ranking score is `sold_count + items_qty_sum`; both terms move on
/// every checkout, so the score intentionally weights recent sales double.
#[derive(Debug, Clone, Serialize)]
pub struct RankedProduct {
    pub product: Product,
    pub items_qty_sum: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub mode: RecommendMode,
    pub base_product: Option<Product>,
    pub brands: Option<Vec<String>>,
    pub data: Vec<RankedProduct>,
    pub limit: usize,
}

/// Read-only ranking over the catalog and sales aggregates.
///
/// Without `product_id`: top sellers across the whole catalog. With it:
/// recommendations within the configured brand set of the base product,
/// excluding the base product itself; a base product without a brand
/// falls back to the top-seller ranking wholesale.
pub fn recommend(
    conn: &Connection,
    cfg: &RecommendConfig,
    product_id: Option<i64>,
    limit: Option<usize>,
) -> Result<Recommendations, CoreError> {
    match product_id {
        Some(id) => rule_based_by_brand(conn, cfg, id, limit),
        None => top_seller(conn, cfg, limit),
    }
}

fn top_seller(
    conn: &Connection,
    cfg: &RecommendConfig,
    limit: Option<usize>,
) -> Result<Recommendations, CoreError> {
    let limit = limit.unwrap_or(cfg.top_seller_limit);
    let data = ranked(conn, None, None, limit)?;
    Ok(Recommendations {
        mode: RecommendMode::TopSeller,
        base_product: None,
        brands: None,
        data,
        limit,
    })
}

fn rule_based_by_brand(
    conn: &Connection,
    cfg: &RecommendConfig,
    product_id: i64,
    limit: Option<usize>,
) -> Result<Recommendations, CoreError> {
    let base = products::get(conn, product_id)?;

    let brand = match base.brand.as_deref().map(str::trim) {
        Some(b) if !b.is_empty() => b.to_string(),
        _ => return top_seller(conn, cfg, limit),
    };

    let limit = limit.unwrap_or(cfg.rule_based_limit);
    let brands = cfg
        .brand_rules
        .get(&brand)
        .cloned()
        .unwrap_or_else(|| vec![brand.clone()]);
    let data = ranked(conn, Some(&brands), Some(base.id), limit)?;
    Ok(Recommendations {
        mode: RecommendMode::RuleBasedBrand,
        base_product: Some(base),
        brands: Some(brands),
        data,
        limit,
    })
}

fn ranked(
    conn: &Connection,
    brands: Option<&[String]>,
    exclude_id: Option<i64>,
    limit: usize,
) -> Result<Vec<RankedProduct>, CoreError> {
    let mut sql = format!(
        "SELECT {}, COALESCE(s.qty_sum, 0) AS items_qty_sum
         FROM products p
         LEFT JOIN (SELECT product_id, SUM(qty) AS qty_sum
                    FROM transaction_items GROUP BY product_id) s
           ON s.product_id = p.id",
        prefixed_cols("p")
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(brands) = brands {
        let placeholders = vec!["?"; brands.len()].join(", ");
        sql.push_str(&format!(" WHERE p.brand IN ({})", placeholders));
        params_vec.extend(brands.iter().cloned());
        if let Some(id) = exclude_id {
            sql.push_str(" AND p.id != ?");
            params_vec.push(id.to_string());
        }
    }
    sql.push_str(" ORDER BY p.sold_count + COALESCE(s.qty_sum, 0) DESC LIMIT ?");
    params_vec.push(limit.to_string());

    let mut stmt = conn.prepare(&sql)?;
    let args: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let rows = stmt.query_map(rusqlite::params_from_iter(args), |r| {
        Ok(RankedProduct {
            product: product_from_row_at(r, 0)?,
            items_qty_sum: r.get(12)?,
        })
    })?;

    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let cfg_path = m.get_one::<String>("config").map(PathBuf::from);
    let cfg = RecommendConfig::load(cfg_path.as_deref())?;
    let product_id = m.get_one::<i64>("product-id").copied();
    let limit = m.get_one::<usize>("limit").copied();

    let recs = recommend(conn, &cfg, product_id, limit)?;
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &recs)? {
        match recs.mode {
            RecommendMode::TopSeller => println!("Top sellers (limit {})", recs.limit),
            RecommendMode::RuleBasedBrand => println!(
                "Recommendations for '{}' via brands [{}] (limit {})",
                recs.base_product
                    .as_ref()
                    .map(|p| p.name.as_str())
                    .unwrap_or(""),
                recs.brands.as_deref().unwrap_or(&[]).join(", "),
                recs.limit
            ),
        }
        let rows: Vec<Vec<String>> = recs
            .data
            .iter()
            .map(|r| {
                vec![
                    r.product.id.to_string(),
                    r.product.name.clone(),
                    r.product.brand.clone().unwrap_or_default(),
                    r.product.price.to_string(),
                    r.product.sold_count.to_string(),
                    r.items_qty_sum.to_string(),
                    (r.product.sold_count + r.items_qty_sum).to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Name", "Brand", "Price", "Sold", "Item Qty", "Score"],
                rows
            )
        );
    }
    Ok(())
}
