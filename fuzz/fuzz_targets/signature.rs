#![no_main]

use cilsig::metadata::signatures::{
    encode_typespec_signature, parse_type_spec_signature, DecoderOptions, SignatureParser,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = DecoderOptions::default();

    let _ = SignatureParser::with_options(data, options).parse_method_signature();
    let _ = SignatureParser::with_options(data, options).parse_field_signature();
    let _ = SignatureParser::with_options(data, options).parse_property_signature();
    let _ = SignatureParser::with_options(data, options).parse_local_var_signature();
    let _ = SignatureParser::with_options(data, options).parse_method_spec_signature();

    // Anything that decodes re-encodes to an equivalent blob, never a longer one
    let mut parser = SignatureParser::with_options(data, options);
    if let Ok(spec) = parser.parse_type_spec_signature() {
        let consumed = &data[..parser.pos()];
        let encoded = encode_typespec_signature(&spec).expect("decoded type must encode");
        assert_eq!(parse_type_spec_signature(&encoded).ok(), Some(spec));
        assert!(encoded.len() <= consumed.len());
    }
});
