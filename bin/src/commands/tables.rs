//! Tables command implementation.

use huntsize_lib::is_plain_identifier;
use huntsize_lib::prelude::*;

/// List the configured tables in processing order.
pub(crate) fn list_tables(settings: &Settings) {
    let tables = &settings.estimate.tables;

    println!("{:<5} {:<40}", "#", "TABLE");
    println!("{}", "-".repeat(46));

    for (i, table) in tables.iter().enumerate() {
        let marker = if is_plain_identifier(table) { "" } else { "  (not a plain identifier)" };
        println!("{:<5} {:<40}{marker}", i + 1, table);
    }

    println!("\nTotal: {} tables", tables.len());
}
