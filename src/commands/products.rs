// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::CoreError;
use crate::models::Product;
use crate::utils::{
    maybe_print_json, non_negative_decimal, non_negative_int, optional_text, parse_decimal,
    pretty_table, require_text,
};
use anyhow::Result;
use regex::RegexBuilder;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

pub(crate) const PRODUCT_COLS: &str =
    "id, name, brand, category, color, size_range, price, stock, sold_count, image_url, description, created_at";

#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub size_range: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// Partial update: only `Some` fields are written. `sold_count` is absent
/// on purpose; it belongs to the checkout path alone.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub size_range: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// `PRODUCT_COLS` with a table alias in front of each column, for joins.
pub(crate) fn prefixed_cols(alias: &str) -> String {
    PRODUCT_COLS
        .split(", ")
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn product_from_row(r: &Row<'_>) -> rusqlite::Result<Product> {
    product_from_row_at(r, 0)
}

/// Map the `PRODUCT_COLS` column list starting at offset `o`, for queries
/// that join products behind other columns.
pub(crate) fn product_from_row_at(r: &Row<'_>, o: usize) -> rusqlite::Result<Product> {
    let price_raw: String = r.get(o + 6)?;
    let price = price_raw.parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(o + 6, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Product {
        id: r.get(o)?,
        name: r.get(o + 1)?,
        brand: r.get(o + 2)?,
        category: r.get(o + 3)?,
        color: r.get(o + 4)?,
        size_range: r.get(o + 5)?,
        price,
        stock: r.get(o + 7)?,
        sold_count: r.get(o + 8)?,
        image_url: r.get(o + 9)?,
        description: r.get(o + 10)?,
        created_at: r.get(o + 11)?,
    })
}

pub fn create(conn: &Connection, input: &NewProduct) -> Result<Product, CoreError> {
    let name = require_text("name", &input.name, 255)?;
    let brand = optional_text("brand", input.brand.as_deref(), 255)?;
    let category = optional_text("category", input.category.as_deref(), 255)?;
    let color = optional_text("color", input.color.as_deref(), 255)?;
    let size_range = optional_text("size_range", input.size_range.as_deref(), 255)?;
    let price = non_negative_decimal("price", input.price)?;
    let stock = non_negative_int("stock", input.stock)?;
    let image_url = optional_text("image_url", input.image_url.as_deref(), 2048)?;
    let description = input.description.as_deref().map(|s| s.trim().to_string());

    conn.execute(
        "INSERT INTO products(name, brand, category, color, size_range, price, stock, image_url, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            name,
            brand,
            category,
            color,
            size_range,
            price.to_string(),
            stock,
            image_url,
            description
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn list(conn: &Connection) -> Result<Vec<Product>, CoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM products ORDER BY id DESC",
        PRODUCT_COLS
    ))?;
    let rows = stmt.query_map([], product_from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn get(conn: &Connection, id: i64) -> Result<Product, CoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM products WHERE id=?1",
        PRODUCT_COLS
    ))?;
    stmt.query_row(params![id], product_from_row)
        .optional()?
        .ok_or_else(|| CoreError::product_not_found(id))
}

pub fn update(conn: &Connection, id: i64, patch: &ProductPatch) -> Result<Product, CoreError> {
    // Existence first, so an unknown id is NotFound even for empty patches.
    get(conn, id)?;

    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(ref name) = patch.name {
        sets.push("name=?");
        values.push(require_text("name", name, 255)?);
    }
    if let Some(ref brand) = patch.brand {
        sets.push("brand=?");
        values.push(require_text("brand", brand, 255)?);
    }
    if let Some(ref category) = patch.category {
        sets.push("category=?");
        values.push(require_text("category", category, 255)?);
    }
    if let Some(ref color) = patch.color {
        sets.push("color=?");
        values.push(require_text("color", color, 255)?);
    }
    if let Some(ref size_range) = patch.size_range {
        sets.push("size_range=?");
        values.push(require_text("size_range", size_range, 255)?);
    }
    if let Some(price) = patch.price {
        sets.push("price=?");
        values.push(non_negative_decimal("price", price)?.to_string());
    }
    if let Some(stock) = patch.stock {
        sets.push("stock=?");
        values.push(non_negative_int("stock", stock)?.to_string());
    }
    if let Some(ref image_url) = patch.image_url {
        sets.push("image_url=?");
        values.push(require_text("image_url", image_url, 2048)?);
    }
    if let Some(ref description) = patch.description {
        sets.push("description=?");
        values.push(description.trim().to_string());
    }

    if !sets.is_empty() {
        let sql = format!("UPDATE products SET {} WHERE id=?", sets.join(", "));
        let mut args: Vec<&dyn rusqlite::ToSql> =
            values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
        args.push(&id);
        conn.execute(&sql, rusqlite::params_from_iter(args))?;
    }
    get(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<(), CoreError> {
    let affected = conn.execute("DELETE FROM products WHERE id=?1", params![id])?;
    if affected == 0 {
        return Err(CoreError::product_not_found(id));
    }
    Ok(())
}

/// Case-insensitive regex match over name, brand, and description.
pub fn find(conn: &Connection, pattern: &str) -> Result<Vec<Product>, CoreError> {
    let re = RegexBuilder::new(pattern.trim())
        .case_insensitive(true)
        .build()
        .map_err(|e| CoreError::validation("pattern", format!("invalid regex: {}", e)))?;
    let mut out = Vec::new();
    for p in list(conn)? {
        let hay = format!(
            "{} {} {}",
            p.name,
            p.brand.as_deref().unwrap_or(""),
            p.description.as_deref().unwrap_or("")
        );
        if re.is_match(&hay) {
            out.push(p);
        }
    }
    Ok(out)
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewProduct {
                name: sub.get_one::<String>("name").unwrap().clone(),
                brand: sub.get_one::<String>("brand").cloned(),
                category: sub.get_one::<String>("category").cloned(),
                color: sub.get_one::<String>("color").cloned(),
                size_range: sub.get_one::<String>("size-range").cloned(),
                price: parse_decimal(sub.get_one::<String>("price").unwrap())?,
                stock: *sub.get_one::<i64>("stock").unwrap(),
                image_url: sub.get_one::<String>("image-url").cloned(),
                description: sub.get_one::<String>("description").cloned(),
            };
            let p = create(conn, &input)?;
            println!("Added product '{}' (id {})", p.name, p.id);
        }
        Some(("list", sub)) => {
            let data = list(conn)?;
            print_products(sub, &data)?;
        }
        Some(("show", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let p = get(conn, id)?;
            if !maybe_print_json(sub.get_flag("json"), false, &p)? {
                println!("{}", product_table(std::slice::from_ref(&p)));
            }
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let price = match sub.get_one::<String>("price") {
                Some(raw) => Some(parse_decimal(raw)?),
                None => None,
            };
            let patch = ProductPatch {
                name: sub.get_one::<String>("name").cloned(),
                brand: sub.get_one::<String>("brand").cloned(),
                category: sub.get_one::<String>("category").cloned(),
                color: sub.get_one::<String>("color").cloned(),
                size_range: sub.get_one::<String>("size-range").cloned(),
                price,
                stock: sub.get_one::<i64>("stock").copied(),
                image_url: sub.get_one::<String>("image-url").cloned(),
                description: sub.get_one::<String>("description").cloned(),
            };
            let p = update(conn, id, &patch)?;
            println!("Updated product '{}' (id {})", p.name, p.id);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            delete(conn, id)?;
            println!("Removed product {}", id);
        }
        Some(("find", sub)) => {
            let pattern = sub.get_one::<String>("pattern").unwrap();
            let data = find(conn, pattern)?;
            print_products(sub, &data)?;
        }
        _ => {}
    }
    Ok(())
}

fn print_products(sub: &clap::ArgMatches, data: &[Product]) -> Result<()> {
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!("{}", product_table(data));
    }
    Ok(())
}

fn product_table(data: &[Product]) -> comfy_table::Table {
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.brand.clone().unwrap_or_default(),
                p.category.clone().unwrap_or_default(),
                p.price.to_string(),
                p.stock.to_string(),
                p.sold_count.to_string(),
            ]
        })
        .collect();
    pretty_table(
        &["ID", "Name", "Brand", "Category", "Price", "Stock", "Sold"],
        rows,
    )
}
