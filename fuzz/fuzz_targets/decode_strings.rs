#![no_main]

use libfuzzer_sys::fuzz_target;
use bertlv::decode::decode_slice;
use bertlv::{
    BitStringTemplate, OctetStringTemplate, StringTemplate,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = decode_slice(&BitStringTemplate, data) {
        let bs = value.as_bit_string().unwrap();
        assert!(bs.unused() < 8);
        assert!(!bs.octets().is_empty() || bs.unused() == 0);
    }
    let _ = decode_slice(&OctetStringTemplate, data);
    for template in [
        StringTemplate::PRINTABLE, StringTemplate::IA5,
        StringTemplate::TELETEX, StringTemplate::UTF8,
        StringTemplate::BMP, StringTemplate::UNIVERSAL,
    ] {
        let _ = decode_slice(&template, data);
    }
});
