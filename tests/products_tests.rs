// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use shopkeep::cli;
use shopkeep::commands::products::{self, NewProduct, ProductPatch};
use shopkeep::error::CoreError;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    shopkeep::db::init_schema(&mut conn).unwrap();
    conn
}

fn new_product(name: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: "10".parse().unwrap(),
        stock: 5,
        ..Default::default()
    }
}

#[test]
fn create_sets_defaults_and_returns_the_row() {
    let conn = setup();
    let p = products::create(
        &conn,
        &NewProduct {
            name: "Air Zoom".into(),
            brand: Some("Nike".into()),
            price: "129.99".parse().unwrap(),
            stock: 12,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(p.name, "Air Zoom");
    assert_eq!(p.brand.as_deref(), Some("Nike"));
    assert_eq!(p.sold_count, 0);
    assert_eq!(p.stock, 12);
}

#[test]
fn create_validation() {
    let conn = setup();

    let err = products::create(&conn, &new_product("   ")).unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "name", .. }));

    let err = products::create(&conn, &new_product(&"x".repeat(256))).unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "name", .. }));

    let mut neg_price = new_product("Runner");
    neg_price.price = "-1".parse().unwrap();
    let err = products::create(&conn, &neg_price).unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "price", .. }));

    let mut neg_stock = new_product("Runner");
    neg_stock.stock = -3;
    let err = products::create(&conn, &neg_stock).unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "stock", .. }));
}

#[test]
fn list_is_newest_first() {
    let conn = setup();
    products::create(&conn, &new_product("First")).unwrap();
    products::create(&conn, &new_product("Second")).unwrap();
    products::create(&conn, &new_product("Third")).unwrap();

    let names: Vec<String> = products::list(&conn)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["Third", "Second", "First"]);
}

#[test]
fn update_changes_only_supplied_fields() {
    let conn = setup();
    let p = products::create(
        &conn,
        &NewProduct {
            name: "Runner".into(),
            brand: Some("Nike".into()),
            color: Some("red".into()),
            price: "50".parse().unwrap(),
            stock: 10,
            ..Default::default()
        },
    )
    .unwrap();

    let updated = products::update(
        &conn,
        p.id,
        &ProductPatch {
            price: Some("45".parse().unwrap()),
            stock: Some(8),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(updated.price, "45".parse().unwrap());
    assert_eq!(updated.stock, 8);
    assert_eq!(updated.name, "Runner");
    assert_eq!(updated.brand.as_deref(), Some("Nike"));
    assert_eq!(updated.color.as_deref(), Some("red"));
}

#[test]
fn update_validates_supplied_fields() {
    let conn = setup();
    let p = products::create(&conn, &new_product("Runner")).unwrap();

    let err = products::update(
        &conn,
        p.id,
        &ProductPatch {
            price: Some("-5".parse().unwrap()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "price", .. }));
}

#[test]
fn unknown_ids_are_not_found() {
    let conn = setup();

    let err = products::get(&conn, 7).unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "product", id: 7 }));

    let err = products::update(&conn, 7, &ProductPatch::default()).unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    let err = products::delete(&conn, 7).unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[test]
fn delete_removes_the_row() {
    let conn = setup();
    let p = products::create(&conn, &new_product("Runner")).unwrap();
    products::delete(&conn, p.id).unwrap();
    assert!(products::get(&conn, p.id).is_err());
    assert!(products::list(&conn).unwrap().is_empty());
}

#[test]
fn find_matches_name_brand_description_case_insensitively() {
    let conn = setup();
    products::create(
        &conn,
        &NewProduct {
            name: "Air Zoom".into(),
            brand: Some("Nike".into()),
            price: "100".parse().unwrap(),
            stock: 1,
            ..Default::default()
        },
    )
    .unwrap();
    products::create(
        &conn,
        &NewProduct {
            name: "Gel Lyte".into(),
            description: Some("classic nike-style runner".into()),
            price: "80".parse().unwrap(),
            stock: 1,
            ..Default::default()
        },
    )
    .unwrap();
    products::create(&conn, &new_product("Plain Tee")).unwrap();

    let hits = products::find(&conn, "NIKE").unwrap();
    assert_eq!(hits.len(), 2);

    let err = products::find(&conn, "(?P<").unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "pattern", .. }));
}

#[test]
fn cli_add_then_list() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "shopkeep", "product", "add", "--name", "Court Vision", "--brand", "Nike", "--price",
        "74.99", "--stock", "6",
    ]);
    if let Some(("product", sub)) = matches.subcommand() {
        products::handle(&conn, sub).unwrap();
    } else {
        panic!("product command not parsed");
    }

    let all = products::list(&conn).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Court Vision");
    assert_eq!(all[0].price, "74.99".parse().unwrap());
}
