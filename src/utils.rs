// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;

use crate::error::CoreError;

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parse a `PRODUCT_ID:QTY` cart argument as passed on the command line.
pub fn parse_cart_line(s: &str) -> Result<(i64, i64)> {
    let (id_raw, qty_raw) = s
        .split_once(':')
        .with_context(|| format!("Invalid item '{}', expected PRODUCT_ID:QTY", s))?;
    let id = id_raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid product id '{}'", id_raw))?;
    let qty = qty_raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid quantity '{}'", qty_raw))?;
    Ok((id, qty))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Required text field: trimmed, non-empty, length-capped.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<String, CoreError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(CoreError::validation(field, "must not be empty"));
    }
    if v.len() > max {
        return Err(CoreError::validation(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(v.to_string())
}

/// Optional text field: trimmed, empty collapses to None, length-capped.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, CoreError> {
    match value.map(str::trim) {
        None => Ok(None),
        Some("") => Ok(None),
        Some(v) if v.len() > max => Err(CoreError::validation(
            field,
            format!("must be at most {} characters", max),
        )),
        Some(v) => Ok(Some(v.to_string())),
    }
}

pub fn non_negative_decimal(field: &'static str, value: Decimal) -> Result<Decimal, CoreError> {
    if value.is_sign_negative() {
        return Err(CoreError::validation(field, "must not be negative"));
    }
    Ok(value)
}

pub fn non_negative_int(field: &'static str, value: i64) -> Result<i64, CoreError> {
    if value < 0 {
        return Err(CoreError::validation(field, "must not be negative"));
    }
    Ok(value)
}
