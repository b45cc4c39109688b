//! Smallest useful schema: two required scalars, a boolean pair, and an
//! optional string.
//!
//!     cargo run --example basic -- --a 2 --b 3.5 --c

use argrecord::{Field, Schema};

fn main() -> anyhow::Result<()> {
    let record = Schema::new("basic")
        .field(Field::new("a", "int"))
        .field(Field::new("b", "float"))
        // A `bool` field binds a linked pair of flags, `--c` and `--no-c`.
        .field(Field::new("c", "bool"))
        // A field is optional iff it has a default or its type admits `none`.
        .field(Field::new("d", "str | none"))
        .parse()?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
