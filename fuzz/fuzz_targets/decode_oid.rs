#![no_main]

use libfuzzer_sys::fuzz_target;
use bertlv::decode::decode_slice;
use bertlv::encode::Encode;
use bertlv::{Oid, OidTemplate};

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = decode_slice(&OidTemplate, data) {
        let oid = value.as_oid().unwrap();
        // Whatever decodes must survive the dotted notation round trip.
        let parsed: Oid = oid.to_string().parse().unwrap();
        assert_eq!(&parsed, oid);
        assert_eq!(parsed.to_vec(), oid.to_vec());
    }
});
