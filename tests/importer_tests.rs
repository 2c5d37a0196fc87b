// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use shopkeep::cli;
use shopkeep::commands::{importer, products};
use std::io::Write;
use tempfile::NamedTempFile;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    shopkeep::db::init_schema(&mut conn).unwrap();
    conn
}

fn run_import(conn: &mut Connection, path: &str) -> anyhow::Result<()> {
    let matches =
        cli::build_cli().get_matches_from(["shopkeep", "import", "products", "--path", path]);
    if let Some(("import", sub)) = matches.subcommand() {
        importer::handle(conn, sub)
    } else {
        panic!("import command not parsed");
    }
}

#[test]
fn csv_rows_become_products() {
    let mut conn = setup();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "name,brand,category,color,size_range,price,stock,image_url,description").unwrap();
    writeln!(file, "Air Zoom,Nike,shoes,red,40-45,129.99,12,,fast one").unwrap();
    writeln!(file, "Samba,Adidas,shoes,,,89.90,7,,").unwrap();
    file.flush().unwrap();

    run_import(&mut conn, file.path().to_str().unwrap()).unwrap();

    let all = products::list(&conn).unwrap();
    assert_eq!(all.len(), 2);
    let zoom = all.iter().find(|p| p.name == "Air Zoom").unwrap();
    assert_eq!(zoom.brand.as_deref(), Some("Nike"));
    assert_eq!(zoom.price, "129.99".parse().unwrap());
    assert_eq!(zoom.stock, 12);
    assert_eq!(zoom.sold_count, 0);
    let samba = all.iter().find(|p| p.name == "Samba").unwrap();
    assert!(samba.color.is_none());
}

#[test]
fn bad_row_aborts_the_whole_file() {
    let mut conn = setup();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "name,brand,category,color,size_range,price,stock,image_url,description").unwrap();
    writeln!(file, "Good One,,,,,10,5,,").unwrap();
    writeln!(file, "Bad One,,,,,-3,5,,").unwrap();
    file.flush().unwrap();

    let err = run_import(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Row 3"));

    assert!(products::list(&conn).unwrap().is_empty());
}
