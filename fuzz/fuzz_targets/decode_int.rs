#![no_main]

use libfuzzer_sys::fuzz_target;
use bertlv::decode::decode_slice;
use bertlv::{EnumeratedTemplate, IntegerTemplate};

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = decode_slice(&IntegerTemplate, data) {
        let int = value.as_integer().unwrap();
        let _ = int.to_i128();
        let _ = int.to_i64();
        let _ = int.to_u64();
        let _ = int.to_string();
    }
    let _ = decode_slice(&EnumeratedTemplate, data);
});
