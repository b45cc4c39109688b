//! Choices, enumerations, and paths.
//!
//!     cargo run --example birds -- --a 2 --b lark --c /tmp/nest

use argrecord::{EnumSpec, Field, Schema};

fn main() -> anyhow::Result<()> {
    let record = Schema::new("birds")
        .enum_def(EnumSpec::new("bird", ["puffin", "lark"]))
        // A choice forces one of the listed values.
        .field(Field::new("a", "choice[1, 2, 3]"))
        // An enum forces one of the member names.
        .field(Field::new("b", "bird").default_value("puffin"))
        .field(
            Field::new("c", "path | none")
                .help("specify a path"),
        )
        .parse()?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
