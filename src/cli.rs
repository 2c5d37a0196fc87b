// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print output as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print output as JSON lines"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn product_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("name").long("name").required(required))
        .arg(Arg::new("brand").long("brand"))
        .arg(Arg::new("category").long("category"))
        .arg(Arg::new("color").long("color"))
        .arg(Arg::new("size-range").long("size-range"))
        .arg(Arg::new("price").long("price").required(required))
        .arg(
            Arg::new("stock")
                .long("stock")
                .required(required)
                .value_parser(value_parser!(i64)),
        )
        .arg(Arg::new("image-url").long("image-url"))
        .arg(Arg::new("description").long("description"))
}

pub fn build_cli() -> Command {
    Command::new("shopkeep")
        .about("Product catalog, atomic checkout, and sales-driven recommendations")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("product")
                .about("Manage the product catalog")
                .subcommand(product_fields(
                    Command::new("add").about("Add a product"),
                    true,
                ))
                .subcommand(json_flags(
                    Command::new("list").about("List products, newest first"),
                ))
                .subcommand(
                    Command::new("show")
                        .about("Show one product")
                        .arg(id_arg())
                        .arg(
                            Arg::new("json")
                                .long("json")
                                .action(ArgAction::SetTrue)
                                .help("Print output as pretty JSON"),
                        ),
                )
                .subcommand(product_fields(
                    Command::new("update")
                        .about("Update supplied fields of a product")
                        .arg(id_arg()),
                    false,
                ))
                .subcommand(Command::new("rm").about("Delete a product").arg(id_arg()))
                .subcommand(json_flags(
                    Command::new("find")
                        .about("Search name/brand/description by regex")
                        .arg(Arg::new("pattern").long("pattern").required(true)),
                )),
        )
        .subcommand(
            Command::new("tx")
                .about("Checkout and transaction history")
                .subcommand(
                    Command::new("checkout")
                        .about("Commit a cart as a transaction")
                        .arg(Arg::new("customer").long("customer").required(true))
                        .arg(Arg::new("method").long("method").required(true))
                        .arg(
                            Arg::new("item")
                                .long("item")
                                .required(true)
                                .action(ArgAction::Append)
                                .value_name("PRODUCT_ID:QTY")
                                .help("Cart line, repeatable"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List transactions, newest first"),
                ))
                .subcommand(
                    Command::new("show")
                        .about("Show one transaction with its items")
                        .arg(id_arg())
                        .arg(
                            Arg::new("json")
                                .long("json")
                                .action(ArgAction::SetTrue)
                                .help("Print output as pretty JSON"),
                        ),
                )
                .subcommand(
                    Command::new("update")
                        .about("Unsupported; transactions are immutable")
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Unsupported; transactions are immutable")
                        .arg(id_arg()),
                ),
        )
        .subcommand(json_flags(
            Command::new("recommend")
                .about("Top sellers, or brand-based picks for a product")
                .arg(
                    Arg::new("product-id")
                        .long("product-id")
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_name("PATH")
                        .help("Recommendation config file (JSON)"),
                ),
        ))
        .subcommand(
            Command::new("import").about("Import data").subcommand(
                Command::new("products")
                    .about("Import products from CSV")
                    .arg(Arg::new("path").long("path").required(true)),
            ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(export_target("products"))
                .subcommand(export_target("transactions")),
        )
        .subcommand(Command::new("doctor").about("Check store invariants"))
}

fn export_target(name: &'static str) -> Command {
    Command::new(name)
        .about(format!("Export {} to a file", name))
        .arg(
            Arg::new("format")
                .long("format")
                .default_value("csv")
                .help("csv or json"),
        )
        .arg(Arg::new("out").long("out").required(true))
}
