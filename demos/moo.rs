//! A tour: the same schema parsed against several token lists, then a
//! deliberately bad one in error-returning mode.
//!
//!     cargo run --example moo

use argrecord::{EnumSpec, Field, Schema};

fn show(schema: &Schema, tokens: &[&str]) -> anyhow::Result<()> {
    let record = schema.try_parse_from(tokens.iter().copied())?;
    println!("{}", serde_json::to_string(&record)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let moo = Schema::new("moo")
        .field(Field::new("a", "int | none"))
        .field(Field::new("b", "float"))
        .field(Field::new("choice", "choice[1, 2, 3] | none").help("choose wisely"))
        .field(Field::new("path", "path | none"))
        .field(Field::new("c", "bool").default_value(true))
        .field(Field::new("description", "str | none"));

    show(&moo, &["--a", "2", "--b", "3.2", "--choice", "1"])?;
    show(&moo, &["--a", "2", "--b", "3.2", "--no-c", "--choice", "3"])?;
    show(&moo, &["--b", "4", "--c"])?;
    show(&moo, &["--b", "4", "--c", "--description", "moo moo"])?;
    show(
        &moo,
        &[
            "--b",
            "4",
            "--c",
            "--description",
            "moo moo",
            "--path",
            "/somewhere/over/the/rainbow",
        ],
    )?;

    println!();

    let moo2 = Schema::new("moo2")
        .enum_def(EnumSpec::new("thingy", ["a", "b"]))
        .field(Field::new("choice", "choice[1, 2, 3] | none"))
        .field(Field::new("pick", "choice['foo', 'bar']").help("baz"))
        .field(Field::new("thingy", "thingy").default_value("a"));

    show(&moo2, &["--choice", "2", "--pick", "bar"])?;
    show(&moo2, &["--pick", "foo"])?;
    show(&moo2, &["--pick", "foo", "--thingy", "b"])?;

    // `pick` has no default and no `none` alternative, so an empty token
    // list is an error in try mode.
    if let Err(err) = moo2.try_parse_from(Vec::<&str>::new()) {
        println!("{err}");
    }
    Ok(())
}
