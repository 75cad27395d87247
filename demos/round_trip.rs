//! Loading one document and writing it in every bundled format.
//!
//! Run with: cargo run --example round_trip

use semidoc::prelude::*;
use semidoc::{from_json_str, key, Format, FormatOptions};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let input = r#"{
        "name": "inventory",
        "ports": [8080, null, 8443],
        "owners": [{"name": "ada"}, {"name": "grace"}],
        "mixed": [1, "two", true]
    }"#;

    let mut doc = from_json_str(input)?;
    doc.append_string(&key!("tags"), "internal")?
        .add_boolean(&key!("limits.enabled"), "yes")?;

    println!("ports: {:?}", doc.get_all::<u16>(&key!("ports"))?);
    println!("mixed: {:?}\n", doc.get_all::<String>(&key!("mixed"))?);

    let options = FormatOptions::pretty().with_root_element("service");
    for format in [Format::Json, Format::Xml, Format::Properties, Format::Compact] {
        println!("{format:?}:");
        println!("{}\n", format.render(&doc, &options));
    }

    Ok(())
}
