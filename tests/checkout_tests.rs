// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use shopkeep::commands::transactions::{self, CartLine};
use shopkeep::commands::products::{self, ProductPatch};
use shopkeep::error::CoreError;
use tempfile::NamedTempFile;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    shopkeep::db::init_schema(&mut conn).unwrap();
    conn
}

fn seed_product(conn: &Connection, name: &str, price: &str, stock: i64) -> i64 {
    conn.execute(
        "INSERT INTO products(name, price, stock) VALUES (?1, ?2, ?3)",
        params![name, price, stock],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn line(product_id: i64, qty: i64) -> CartLine {
    CartLine { product_id, qty }
}

#[test]
fn totals_match_line_items() {
    let mut conn = setup();
    let shoe = seed_product(&conn, "Runner", "59.90", 10);
    let sock = seed_product(&conn, "Crew Sock", "4.50", 30);

    let detail = transactions::checkout(
        &mut conn,
        "John Doe",
        "cash",
        &[line(shoe, 2), line(sock, 3)],
    )
    .unwrap();

    assert_eq!(detail.items.len(), 2);
    let mut sum = Decimal::ZERO;
    for l in &detail.items {
        assert_eq!(l.item.subtotal, l.item.price_each * Decimal::from(l.item.qty));
        sum += l.item.subtotal;
    }
    assert_eq!(detail.transaction.total_amount, sum);
    assert_eq!(
        detail.transaction.total_amount,
        "133.30".parse::<Decimal>().unwrap()
    );
}

#[test]
fn stock_and_sold_count_adjusted() {
    let mut conn = setup();
    let id = seed_product(&conn, "Runner", "50", 10);

    transactions::checkout(&mut conn, "Jane", "card", &[line(id, 4)]).unwrap();

    let p = products::get(&conn, id).unwrap();
    assert_eq!(p.stock, 6);
    assert_eq!(p.sold_count, 4);
}

#[test]
fn price_snapshot_survives_catalog_price_change() {
    let mut conn = setup();
    let id = seed_product(&conn, "Runner", "50", 10);
    let detail = transactions::checkout(&mut conn, "Jane", "card", &[line(id, 1)]).unwrap();

    let patch = ProductPatch {
        price: Some("99".parse().unwrap()),
        ..Default::default()
    };
    products::update(&conn, id, &patch).unwrap();

    let reread = transactions::get(&conn, detail.transaction.id).unwrap();
    assert_eq!(
        reread.items[0].item.price_each,
        "50".parse::<Decimal>().unwrap()
    );
    assert_eq!(
        reread.transaction.total_amount,
        "50".parse::<Decimal>().unwrap()
    );
}

#[test]
fn short_line_rolls_back_the_whole_cart() {
    let mut conn = setup();
    let plenty = seed_product(&conn, "Runner", "50", 10);
    let scarce = seed_product(&conn, "Limited", "200", 1);

    let err = transactions::checkout(
        &mut conn,
        "Jane",
        "card",
        &[line(plenty, 2), line(scarce, 3)],
    )
    .unwrap_err();

    match err {
        CoreError::InsufficientStock {
            product_id,
            available,
            requested,
        } => {
            assert_eq!(product_id, scarce);
            assert_eq!(available, 1);
            assert_eq!(requested, 3);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Nothing committed, nothing adjusted, including the line that would
    // have succeeded on its own.
    let p = products::get(&conn, plenty).unwrap();
    assert_eq!((p.stock, p.sold_count), (10, 0));
    let txns: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    let items: i64 = conn
        .query_row("SELECT COUNT(*) FROM transaction_items", [], |r| r.get(0))
        .unwrap();
    assert_eq!((txns, items), (0, 0));
}

#[test]
fn unknown_product_fails_fast_as_not_found() {
    let mut conn = setup();
    let id = seed_product(&conn, "Runner", "50", 10);

    let err =
        transactions::checkout(&mut conn, "Jane", "card", &[line(id, 1), line(999, 1)])
            .unwrap_err();
    assert!(matches!(
        err,
        CoreError::NotFound {
            entity: "product",
            id: 999
        }
    ));

    let txns: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(txns, 0);
}

#[test]
fn input_validation() {
    let mut conn = setup();
    let id = seed_product(&conn, "Runner", "50", 10);

    let err = transactions::checkout(&mut conn, "Jane", "card", &[]).unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "items", .. }));

    let err = transactions::checkout(&mut conn, "Jane", "card", &[line(id, 0)]).unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "qty", .. }));

    let err = transactions::checkout(&mut conn, "   ", "card", &[line(id, 1)]).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation {
            field: "customer_name",
            ..
        }
    ));
}

#[test]
fn repeated_lines_cannot_jointly_overdraw() {
    let mut conn = setup();
    let id = seed_product(&conn, "Runner", "50", 10);

    let err =
        transactions::checkout(&mut conn, "Jane", "card", &[line(id, 6), line(id, 6)])
            .unwrap_err();
    match err {
        CoreError::InsufficientStock {
            available,
            requested,
            ..
        } => {
            // the second line sees what the first already took
            assert_eq!(available, 4);
            assert_eq!(requested, 6);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    let p = products::get(&conn, id).unwrap();
    assert_eq!((p.stock, p.sold_count), (10, 0));
}

#[test]
fn list_is_newest_first_with_nested_items() {
    let mut conn = setup();
    let a = seed_product(&conn, "Runner", "50", 10);
    let b = seed_product(&conn, "Walker", "30", 10);

    transactions::checkout(&mut conn, "First", "cash", &[line(a, 1)]).unwrap();
    transactions::checkout(&mut conn, "Second", "card", &[line(a, 2), line(b, 1)]).unwrap();

    let all = transactions::list(&conn).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].transaction.customer_name, "Second");
    assert_eq!(all[0].items.len(), 2);
    assert_eq!(all[1].transaction.customer_name, "First");
    assert_eq!(
        all[0].items[0].product.as_ref().unwrap().name,
        "Runner"
    );
}

#[test]
fn deleted_product_leaves_item_history_intact() {
    let mut conn = setup();
    let id = seed_product(&conn, "Runner", "50", 10);
    let detail = transactions::checkout(&mut conn, "Jane", "card", &[line(id, 2)]).unwrap();

    products::delete(&conn, id).unwrap();

    let reread = transactions::get(&conn, detail.transaction.id).unwrap();
    assert!(reread.items[0].product.is_none());
    assert_eq!(
        reread.items[0].item.subtotal,
        "100".parse::<Decimal>().unwrap()
    );
}

#[test]
fn get_unknown_transaction_is_not_found() {
    let conn = setup();
    let err = transactions::get(&conn, 42).unwrap_err();
    assert!(matches!(
        err,
        CoreError::NotFound {
            entity: "transaction",
            id: 42
        }
    ));
}

#[test]
fn update_and_delete_are_always_unsupported() {
    let mut conn = setup();
    let id = seed_product(&conn, "Runner", "50", 10);
    let detail = transactions::checkout(&mut conn, "Jane", "card", &[line(id, 1)]).unwrap();

    // existing id
    let err = transactions::update(&conn, detail.transaction.id).unwrap_err();
    assert!(matches!(err, CoreError::Unsupported(_)));
    let err = transactions::delete(&conn, detail.transaction.id).unwrap_err();
    assert!(matches!(err, CoreError::Unsupported(_)));

    // missing id: still Unsupported, never NotFound
    let err = transactions::update(&conn, 9999).unwrap_err();
    assert!(matches!(err, CoreError::Unsupported(_)));
    let err = transactions::delete(&conn, 9999).unwrap_err();
    assert!(matches!(err, CoreError::Unsupported(_)));
}

#[test]
fn concurrent_checkouts_cannot_jointly_overdraw() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path().to_path_buf();
    {
        let mut conn = Connection::open(&path).unwrap();
        shopkeep::db::init_schema(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO products(name, price, stock) VALUES ('Runner', '50', 10)",
            [],
        )
        .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..2 {
        let path = path.clone();
        handles.push(std::thread::spawn(move || {
            let mut conn = Connection::open(&path).unwrap();
            conn.busy_timeout(std::time::Duration::from_secs(10)).unwrap();
            transactions::checkout(
                &mut conn,
                "Racer",
                "cash",
                &[CartLine {
                    product_id: 1,
                    qty: 6,
                }],
            )
        }));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let err = results.into_iter().find_map(|r| r.err()).unwrap();
    assert!(matches!(
        err,
        CoreError::InsufficientStock {
            available: 4,
            requested: 6,
            ..
        }
    ));

    let conn = Connection::open(&path).unwrap();
    let (stock, sold): (i64, i64) = conn
        .query_row("SELECT stock, sold_count FROM products WHERE id=1", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!((stock, sold), (4, 6));
}
