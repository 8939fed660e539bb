//! Signature decoding and encoding through the public API.

use dotmeta::{
    metadata::{
        signatures::{
            encode_method_signature, encode_signature, parse_method_signature,
            parse_property_signature, parse_signature, parse_signature_with_options,
            parse_type_spec_signature, CallingConvention, CallingConventionSig, FullNameBuilder,
            GenericInstSig, MethodSig, PropertySig, TypeNameResolver, TypeSig,
        },
        token::Token,
    },
    Error, ReaderOptions,
};

#[test]
fn every_convention_byte_splits_into_kind_and_flags() {
    for byte in 0..=u8::MAX {
        let convention = CallingConvention::from(byte);

        assert_eq!(convention.kind(), byte & 0x0F);
        assert_eq!(convention.generic(), byte & 0x10 != 0);
        assert_eq!(convention.has_this(), byte & 0x20 != 0);
        assert_eq!(convention.explicit_this(), byte & 0x40 != 0);
        assert_eq!(convention.reserved_by_clr(), byte & 0x80 != 0);

        let mut rebuilt = CallingConvention::from(byte & 0x0F);
        rebuilt.set_generic(convention.generic());
        rebuilt.set_has_this(convention.has_this());
        rebuilt.set_explicit_this(convention.explicit_this());
        rebuilt.set_reserved_by_clr(convention.reserved_by_clr());
        assert_eq!(u8::from(rebuilt), byte);
    }
}

#[test]
fn clearing_a_flag_keeps_the_others() {
    let mut convention = CallingConvention::from(0xF5);
    convention.set_has_this(false);
    assert_eq!(convention.value(), 0xD5);
    assert!(convention.is_vararg());
    assert!(convention.generic());
}

#[test]
fn factories_set_the_expected_flags() {
    let sig = MethodSig::create_instance_generic(1, TypeSig::MVar(0), [TypeSig::MVar(0)]);
    assert_eq!(sig.convention.value(), 0x30);
    assert_eq!(encode_method_signature(&sig).unwrap(), [0x30, 0x01, 0x01, 0x1E, 0x00, 0x1E, 0x00]);

    let getter = PropertySig::create_instance(TypeSig::String, []);
    assert!(getter.convention.is_property());
    assert!(getter.has_this());
    assert!(!getter.generic());
}

#[test]
fn vararg_sentinel_present_or_absent() {
    let with_tail = parse_method_signature(&[0x05, 0x02, 0x01, 0x08, 0x41, 0x0E]).unwrap();
    assert_eq!(with_tail.params, vec![TypeSig::I4]);
    assert_eq!(with_tail.params_after_sentinel, Some(vec![TypeSig::String]));
    assert_eq!(with_tail.param_count(), 2);

    let empty_tail = parse_method_signature(&[0x05, 0x01, 0x01, 0x08, 0x41]).unwrap();
    assert_eq!(empty_tail.params_after_sentinel, Some(Vec::new()));

    let no_tail = parse_method_signature(&[0x05, 0x01, 0x01, 0x08]).unwrap();
    assert_eq!(no_tail.params_after_sentinel, None);

    assert_eq!(encode_method_signature(&empty_tail).unwrap(), [0x05, 0x01, 0x01, 0x08, 0x41]);
    assert_eq!(encode_method_signature(&no_tail).unwrap(), [0x05, 0x01, 0x01, 0x08]);
}

#[test]
fn function_pointer_parameter_before_the_sentinel() {
    // vararg void (method void *(), ..., int32)
    let blob = [0x05, 0x02, 0x01, 0x1B, 0x00, 0x00, 0x01, 0x41, 0x08];
    let sig = parse_method_signature(&blob).unwrap();

    assert_eq!(sig.params.len(), 1);
    assert!(matches!(&sig.params[0], TypeSig::FnPtr(inner) if inner.params_after_sentinel.is_none()));
    assert_eq!(sig.params_after_sentinel, Some(vec![TypeSig::I4]));
    assert_eq!(encode_method_signature(&sig).unwrap(), blob);
}

#[test]
fn second_sentinel_is_malformed() {
    let blob = [0x05, 0x02, 0x01, 0x41, 0x08, 0x41, 0x09];
    assert!(matches!(parse_method_signature(&blob), Err(Error::Malformed { .. })));
}

#[test]
fn blobs_are_reproduced() {
    #[rustfmt::skip]
    let blobs: &[&[u8]] = &[
        // int32 field with an optional modifier
        &[0x06, 0x20, 0x49, 0x08],
        // instance string get_Item(int32) property
        &[0x28, 0x01, 0x0E, 0x08],
        // locals: pinned byref uint8, List`1<!!0>, int32[,]
        &[0x07, 0x03, 0x45, 0x10, 0x05, 0x15, 0x12, 0x49, 0x01, 0x1E, 0x00, 0x14, 0x08, 0x02, 0x00, 0x00],
        // method instantiation <string, valuetype [TypeDef 3]>
        &[0x0A, 0x02, 0x0E, 0x11, 0x0C],
        // static method taking a function pointer
        &[0x00, 0x01, 0x01, 0x1B, 0x00, 0x01, 0x08, 0x08],
    ];

    for blob in blobs {
        let sig = parse_signature(blob).unwrap();
        assert_eq!(&encode_signature(&sig).unwrap(), blob);
    }
}

#[test]
fn property_with_generic_flag() {
    let sig = parse_property_signature(&[0x38, 0x01, 0x00, 0x13, 0x00]).unwrap();
    assert!(sig.generic());
    assert_eq!(sig.gen_param_count, 1);
    assert_eq!(sig.ret_type, TypeSig::Var(0));
}

#[test]
fn nesting_limit_comes_from_options() {
    let mut blob = vec![0x06];
    blob.extend(std::iter::repeat(0x1D).take(40));
    blob.push(0x08);

    assert!(parse_signature(&blob).is_ok());
    assert!(matches!(
        parse_signature_with_options(&blob, &ReaderOptions::strict()),
        Err(Error::RecursionLimit(32))
    ));
    assert!(parse_signature_with_options(&blob, &ReaderOptions::lenient()).is_ok());
}

#[test]
fn truncated_blobs_fail() {
    assert!(parse_signature(&[]).is_err());
    assert!(parse_signature(&[0x00, 0x02, 0x01, 0x08]).is_err());
    assert!(parse_signature(&[0x0A, 0x01]).is_err());
}

#[test]
fn type_spec_full_name() {
    // List`1<int32[]>
    let sig = parse_type_spec_signature(&[0x15, 0x12, 0x1D, 0x01, 0x1D, 0x08]).unwrap();
    let expected = TypeSig::GenericInst(GenericInstSig {
        generic_type: Box::new(TypeSig::Class(Token::new(0x0100_0007))),
        generic_arguments: vec![TypeSig::SzArray(Box::new(TypeSig::I4))],
    });
    assert_eq!(sig, expected);

    struct Names;
    impl TypeNameResolver for Names {
        fn type_full_name(&self, token: Token) -> Option<String> {
            (token.value() == 0x0100_0007).then(|| "System.Collections.Generic.List`1".to_string())
        }
    }

    assert_eq!(
        FullNameBuilder::new(Some(&Names)).type_full_name(&sig),
        "System.Collections.Generic.List`1<System.Int32[]>"
    );
    assert_eq!(FullNameBuilder::new(None).type_full_name(&sig), "<System.Int32[]>");
}

#[test]
fn generic_inst_accessors() {
    let sig = parse_signature(&[0x0A, 0x01, 0x1E, 0x00]).unwrap();
    assert!(sig.as_method().is_none());
    assert!(sig.as_generic_inst().unwrap().contains_generic_parameter());
    assert!(matches!(sig, CallingConventionSig::GenericInst(_)));
}
