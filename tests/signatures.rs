//! End-to-end decoding of signature blobs through the public API.
//!
//! The blobs below are taken from real assemblies (mscorlib, System.Core and a
//! C++/CLI module) or built to hit one specific decoder rule each.

use std::collections::HashMap;

use cilsig::{
    blob::{write_compressed_int, write_compressed_uint, ByteCursor},
    metadata::signatures::{
        encode_field_signature, encode_method_signature, encode_typespec_signature,
        parse_field_signature, parse_local_var_signature, parse_method_signature,
        parse_method_signatures_parallel, parse_type_spec_signature, CallingConvention,
        DecoderOptions, GenericInstance, MethodSignature, PrimitiveKind, SignatureParser,
        TypeNode, UnresolvedTokens, MAX_ARRAY_RANK, MAX_RECURSION_DEPTH,
    },
    Error, ErrorKind, Token,
};

#[test]
fn method_int32_int32() {
    let method = parse_method_signature(&[0x00, 0x01, 0x08, 0x08]).unwrap();

    assert_eq!(method.calling_convention, CallingConvention::Default);
    assert!(!method.generic);
    assert_eq!(method.generic_param_count, 0);
    assert_eq!(method.return_type, TypeNode::Primitive(PrimitiveKind::I4));
    assert_eq!(method.params, vec![TypeNode::Primitive(PrimitiveKind::I4)]);
    assert_eq!(method.sentinel, None);
}

#[test]
fn szarray_of_int8() {
    let spec = parse_type_spec_signature(&[0x1D, 0x04]).unwrap();
    assert_eq!(
        spec.base,
        TypeNode::SzArray(Box::new(TypeNode::Primitive(PrimitiveKind::I1)))
    );
}

#[test]
fn generic_instantiation_keeps_argument_order() {
    let spec =
        parse_type_spec_signature(&[0x15, 0x12, 0x49, 0x03, 0x08, 0x0E, 0x08]).unwrap();

    assert_eq!(
        spec.base,
        TypeNode::GenericInst(GenericInstance {
            base: Token::new(0x0100_0012),
            value_type: false,
            args: vec![
                TypeNode::Primitive(PrimitiveKind::I4),
                TypeNode::Primitive(PrimitiveKind::String),
                TypeNode::Primitive(PrimitiveKind::I4),
            ],
        })
    );

    let spec = parse_type_spec_signature(&[0x15, 0x12, 0x49, 0x02, 0x08, 0x08]).unwrap();
    let TypeNode::GenericInst(inst) = spec.base else {
        panic!("expected a generic instantiation");
    };
    assert_eq!(
        inst.args,
        vec![
            TypeNode::Primitive(PrimitiveKind::I4),
            TypeNode::Primitive(PrimitiveKind::I4)
        ]
    );
}

#[test]
fn string_concat_object_array() {
    // System.String::Concat(object[]) from mscorlib
    let method = parse_method_signature(&[0x00, 0x01, 0x0E, 0x1D, 0x1C]).unwrap();
    assert_eq!(method.to_string(), "string (object[])");
    assert_eq!(
        method.parameter_type_names(&UnresolvedTokens),
        "System.Object[]"
    );
}

#[test]
fn enumerable_select_extension_method() {
    // IEnumerable<!!1> Select<TSource, TResult>(IEnumerable<!!0>, Func<!!0, !!1>)
    let blob = [
        0x10, 0x02, 0x02, // GENERIC, 2 generic params, 2 params
        0x15, 0x12, 0x09, 0x01, 0x1E, 0x01, // IEnumerable<!!1>
        0x15, 0x12, 0x09, 0x01, 0x1E, 0x00, // IEnumerable<!!0>
        0x15, 0x12, 0x0D, 0x02, 0x1E, 0x00, 0x1E, 0x01, // Func<!!0, !!1>
    ];
    let method = parse_method_signature(&blob).unwrap();
    assert!(method.generic);
    assert_eq!(method.generic_param_count, 2);

    let mut names = HashMap::new();
    names.insert(
        Token::new(0x0100_0002),
        "System.Collections.Generic.IEnumerable`1".to_string(),
    );
    names.insert(Token::new(0x0100_0003), "System.Func`2".to_string());

    assert_eq!(
        method.return_type.type_name(&names),
        "System.Collections.Generic.IEnumerable`1[!!1]"
    );
    assert_eq!(
        method.parameter_type_names(&names),
        "System.Collections.Generic.IEnumerable`1[!!0],System.Func`2[!!0,!!1]"
    );
    assert_eq!(encode_method_signature(&method).unwrap(), blob);
}

#[test]
fn cpp_cli_modified_pointer_field() {
    // modopt(IsConst) int8* field
    let field = parse_field_signature(&[0x06, 0x0F, 0x20, 0x09, 0x04]).unwrap();
    assert_eq!(
        field.field_type,
        TypeNode::ptr(TypeNode::modified(
            Token::new(0x0100_0002),
            false,
            PrimitiveKind::I1.into()
        ))
    );
    assert_eq!(field.to_string(), "field int8 modopt(0x01000002)*");
    assert_eq!(
        encode_field_signature(&field).unwrap(),
        [0x06, 0x0F, 0x20, 0x09, 0x04]
    );
}

#[test]
fn stacked_modifiers_nest_in_encoded_order() {
    let field = parse_field_signature(&[0x06, 0x1F, 0x05, 0x20, 0x09, 0x1F, 0x0D, 0x08]).unwrap();

    let mut node = &field.field_type;
    let mut seen = Vec::new();
    while let TypeNode::Modified(modified) = node {
        seen.push((modified.modifier.row(), modified.required));
        node = &modified.inner;
    }
    assert_eq!(seen, [(1, true), (2, false), (3, true)]);
    assert_eq!(node, &TypeNode::Primitive(PrimitiveKind::I4));
}

#[test]
fn locals_with_pinned_and_typedref() {
    let locals =
        parse_local_var_signature(&[0x07, 0x03, 0x45, 0x10, 0x05, 0x16, 0x1D, 0x13, 0x00])
            .unwrap();
    assert_eq!(
        locals.locals,
        vec![
            TypeNode::pinned(TypeNode::by_ref(PrimitiveKind::U1.into())),
            TypeNode::Primitive(PrimitiveKind::TypedByRef),
            TypeNode::sz_array(TypeNode::GenericParam {
                index: 0,
                method: false
            }),
        ]
    );
}

#[test]
fn vararg_call_site() {
    // vararg void (string, ..., int32, int64)
    let method = parse_method_signature(&[0x05, 0x03, 0x01, 0x0E, 0x41, 0x08, 0x0A]).unwrap();
    assert_eq!(method.params.len(), 3);
    assert_eq!(method.sentinel, Some(1));
    assert_eq!(
        method.vararg_params(),
        &[
            TypeNode::Primitive(PrimitiveKind::I4),
            TypeNode::Primitive(PrimitiveKind::I8)
        ]
    );
}

#[test]
fn unknown_element_type_reports_byte_and_offset() {
    let err = parse_method_signature(&[0x00, 0x02, 0x01, 0x08, 0xFF]).unwrap_err();
    assert_eq!(
        err,
        Error::UnknownElementType {
            offset: 4,
            value: 0xFF
        }
    );
    assert_eq!(err.kind(), ErrorKind::UnknownElementType);
    assert_eq!(err.observed(), Some(0xFF));
}

#[test]
fn truncation_anywhere_is_an_error() {
    let blob = [
        0x20, 0x02, 0x15, 0x11, 0x05, 0x01, 0x08, 0x14, 0x0E, 0x02, 0x01, 0x03, 0x01, 0x7F, 0x1B,
        0x00, 0x00, 0x01,
    ];
    assert!(parse_method_signature(&blob).is_ok());

    for end in 0..blob.len() {
        let err = parse_method_signature(&blob[..end]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncated, "prefix of {end} bytes");
        assert_eq!(err.offset(), end, "prefix of {end} bytes");
    }
}

#[test]
fn depth_guard_at_default_limit() {
    let mut deepest = vec![0x1D; MAX_RECURSION_DEPTH - 1];
    deepest.push(0x08);
    assert_eq!(
        parse_type_spec_signature(&deepest).unwrap().base.depth(),
        MAX_RECURSION_DEPTH
    );

    let mut too_deep = vec![0x1D; MAX_RECURSION_DEPTH];
    too_deep.push(0x08);
    assert_eq!(
        parse_type_spec_signature(&too_deep).unwrap_err(),
        Error::MaxDepthExceeded {
            limit: MAX_RECURSION_DEPTH,
            offset: MAX_RECURSION_DEPTH
        }
    );
}

#[test]
fn depth_guard_ignores_byte_content() {
    // Each level is individually valid; only the nesting is too deep
    let options = DecoderOptions {
        max_depth: 3,
        ..Default::default()
    };

    for blob in [
        &[0x0F, 0x10, 0x45, 0x08][..],
        &[0x1F, 0x05, 0x1F, 0x05, 0x1F, 0x05, 0x08],
        &[0x15, 0x12, 0x05, 0x01, 0x15, 0x12, 0x05, 0x01, 0x1D, 0x08],
        &[0x1B, 0x00, 0x00, 0x1B, 0x00, 0x00, 0x1B, 0x00, 0x00, 0x01],
    ] {
        let err = SignatureParser::with_options(blob, options)
            .parse_type_spec_signature()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MaxDepthExceeded, "{blob:02X?}");
    }
}

#[test]
fn hostile_blob_does_not_overflow_the_stack() {
    let blob = vec![0x0F; 1 << 20];
    assert_eq!(
        parse_type_spec_signature(&blob).unwrap_err().kind(),
        ErrorKind::MaxDepthExceeded
    );
}

#[test]
fn oversized_token_rows_are_rejected() {
    // class with a coded index whose row would overwrite the table byte
    let err = parse_type_spec_signature(&[0x12, 0xDC, 0x00, 0x00, 0x00]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
    assert_eq!(err.offset(), 1);
    assert_eq!(err.observed(), Some(0xDC));

    // the widest row still decodes and encodes back to the same bytes
    let spec = parse_type_spec_signature(&[0x11, 0xC3, 0xFF, 0xFF, 0xFE]).unwrap();
    assert_eq!(spec.base, TypeNode::ValueType(Token::new(0x1BFF_FFFF)));
    assert_eq!(
        encode_typespec_signature(&spec).unwrap(),
        [0x11, 0xC3, 0xFF, 0xFF, 0xFE]
    );
}

#[test]
fn array_rank_is_bounded() {
    // void (int32[<rank 0x1FFF_FFFF>])
    let blob = [0x00, 0x01, 0x01, 0x14, 0x08, 0xDF, 0xFF, 0xFF, 0xFF, 0x00, 0x00];
    let err = parse_method_signature(&blob).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
    assert_eq!(err.offset(), 5);

    let method =
        parse_method_signature(&[0x00, 0x01, 0x01, 0x14, 0x08, 0x20, 0x00, 0x00]).unwrap();
    assert_eq!(
        method.parameter_type_names(&UnresolvedTokens),
        format!("System.Int32[{}]", ",".repeat(MAX_ARRAY_RANK as usize - 1))
    );
}

#[test]
fn compressed_integer_thresholds() {
    let mut blob = Vec::new();
    for value in [0x7F, 0x80, 0x3FFF, 0x4000] {
        write_compressed_uint(value, &mut blob).unwrap();
    }
    assert_eq!(blob, [0x7F, 0x80, 0x80, 0xBF, 0xFF, 0xC0, 0x00, 0x40, 0x00]);

    let mut cursor = ByteCursor::new(&blob);
    let mut positions = Vec::new();
    while cursor.has_more_data() {
        cursor.read_compressed_uint().unwrap();
        positions.push(cursor.pos());
    }
    assert_eq!(positions, [1, 3, 5, 9]);

    let mut blob = Vec::new();
    write_compressed_int(-0x2000, &mut blob).unwrap();
    assert_eq!(ByteCursor::new(&blob).read_compressed_int().unwrap(), -0x2000);
}

#[test]
fn batch_matches_sequential() {
    let blobs: Vec<&[u8]> = vec![
        &[0x00, 0x01, 0x08, 0x08],
        &[0x20, 0x00, 0x01],
        &[0x00, 0x01],
        &[0x05, 0x02, 0x01, 0x08, 0x41, 0x0E],
        &[0x8F, 0x00, 0x01],
    ];

    let parallel = parse_method_signatures_parallel(&blobs);
    let sequential: Vec<_> = blobs.iter().map(|blob| parse_method_signature(blob)).collect();
    assert_eq!(parallel, sequential);
}

#[test]
fn function_pointer_round_trip() {
    let inner = MethodSignature {
        calling_convention: CallingConvention::StdCall,
        return_type: PrimitiveKind::I4.into(),
        params: vec![TypeNode::ptr(PrimitiveKind::Void.into())],
        ..Default::default()
    };
    let outer = MethodSignature {
        return_type: TypeNode::FnPtr(Box::new(inner)),
        ..Default::default()
    };

    let blob = encode_method_signature(&outer).unwrap();
    assert_eq!(blob, [0x00, 0x00, 0x1B, 0x02, 0x01, 0x08, 0x0F, 0x01]);
    assert_eq!(parse_method_signature(&blob).unwrap(), outer);
    assert_eq!(
        outer.to_string(),
        "method unmanaged stdcall int32 *(void*) ()"
    );
}
