//! Generates the content octets of object identifiers.
//!
//! Provide object identifiers in dot notation and you will receive the
//! octet array for each, suitable for pasting into a constant.

use std::env;
use bertlv::Oid;
use bertlv::encode::Encode;

fn process_one(arg: &str) -> Result<(), &'static str> {
    let oid: Oid = arg.parse()?;
    let mut content = Vec::new();
    oid.write_content(&mut content).map_err(|_| "write failed")?;
    let mut first = true;
    print!("[");
    for octet in content {
        if !first { print!(", "); }
        else { first = false }
        print!("{}", octet);
    }
    println!("]");
    Ok(())
}

fn main() {
    let mut args = env::args();
    args.next(); // Skip executable name.
    for arg in args {
        if let Err(err) = process_one(arg.as_ref()) {
            println!("{}: {}.", arg, err)
        }
    }
}
