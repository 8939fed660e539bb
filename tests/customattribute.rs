//! Custom attribute blobs: decoding against a constructor, lazy blob access, re-encoding.

use std::{sync::Arc, thread};

use dotmeta::{
    file::cursor::SliceCursor,
    metadata::{
        customattributes::{CAArgument, CAValue, CustomAttribute},
        module::{MethodDefInfo, MethodDefOrRef},
        signatures::{MethodSig, TypeSig},
        token::Token,
    },
};

fn constructor(params: Vec<TypeSig>) -> MethodDefOrRef {
    MethodDefOrRef::MethodDef(MethodDefInfo {
        token: Token::new(0x0600_0010),
        name: ".ctor".to_string(),
        declaring_type: Some("Demo.InfoAttribute".to_string()),
        signature: Some(MethodSig::create_instance(TypeSig::Void, params)),
    })
}

/// `[Info("abc", 42, Name = "hi")]`
#[rustfmt::skip]
const INFO_BLOB: &[u8] = &[
    0x01, 0x00,
    0x03, b'a', b'b', b'c',
    0x2A, 0x00, 0x00, 0x00,
    0x01, 0x00,
    0x54, 0x0E, 0x04, b'N', b'a', b'm', b'e', 0x02, b'h', b'i',
];

#[test]
fn decoded_attribute_exposes_its_arguments() {
    let ctor = constructor(vec![TypeSig::String, TypeSig::I4]);
    let attribute = CustomAttribute::from_blob(Some(ctor), INFO_BLOB, None);

    assert!(!attribute.is_raw());
    assert_eq!(
        attribute.constructor_arguments(),
        &[
            CAArgument::new(TypeSig::String, CAValue::String(Some("abc".to_string()))),
            CAArgument::new(TypeSig::I4, CAValue::I4(42)),
        ]
    );

    let name = attribute.property("Name").unwrap();
    assert_eq!(name.field_type, TypeSig::String);
    assert_eq!(name.argument.value, CAValue::String(Some("hi".to_string())));
    assert!(attribute.field("Name").is_none());
    assert_eq!(attribute.fields().count(), 0);
    assert_eq!(attribute.type_full_name(None), "Demo.InfoAttribute");

    assert_eq!(attribute.get_blob(), INFO_BLOB);
    assert_eq!(attribute.to_blob(None).unwrap(), INFO_BLOB);
}

#[test]
fn null_string_and_null_array() {
    let ctor = constructor(vec![
        TypeSig::String,
        TypeSig::SzArray(Box::new(TypeSig::I4)),
    ]);
    let blob = [0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00];
    let attribute = CustomAttribute::from_blob(Some(ctor), &blob, None);

    let arguments = attribute.constructor_arguments();
    assert_eq!(arguments[0].value, CAValue::String(None));
    assert_eq!(arguments[1].value, CAValue::Array(None));
    assert_eq!(attribute.to_blob(None).unwrap(), blob);
}

#[test]
fn undecodable_blobs_stay_raw() {
    let ctor = constructor(vec![TypeSig::I4]);

    let bad_prolog = [0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
    let attribute = CustomAttribute::from_blob(Some(ctor.clone()), &bad_prolog, None);
    assert!(attribute.is_raw());
    assert!(attribute.constructor_arguments().is_empty());
    assert_eq!(attribute.get_blob(), bad_prolog);

    let truncated = [0x01, 0x00, 0x2A];
    assert!(CustomAttribute::from_blob(Some(ctor), &truncated, None).is_raw());

    let unknown_ctor = CustomAttribute::from_blob(None, INFO_BLOB, None);
    assert!(unknown_ctor.is_raw());
    assert_eq!(unknown_ctor.to_blob(None).unwrap(), INFO_BLOB);
}

#[test]
fn deferred_blob_is_read_once_for_all_threads() {
    let attribute = Arc::new(
        CustomAttribute::new(
            None,
            vec![CAArgument::new(TypeSig::Boolean, CAValue::Bool(true))],
            Vec::new(),
        )
        .with_blob_source(Box::new(SliceCursor::new(vec![0x01, 0x00, 0x01, 0x00, 0x00]))),
    );

    let pointers: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let attribute = Arc::clone(&attribute);
                scope.spawn(move || {
                    let blob = attribute.get_blob();
                    assert_eq!(blob, [0x01, 0x00, 0x01, 0x00, 0x00]);
                    blob.as_ptr() as usize
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert!(pointers.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn attribute_without_source_has_an_empty_blob() {
    let attribute = CustomAttribute::new(None, Vec::new(), Vec::new());
    assert!(attribute.get_blob().is_empty());
    assert_eq!(attribute.to_blob(None).unwrap(), [0x01, 0x00, 0x00, 0x00]);
}

#[test]
fn cloned_arguments_are_independent() {
    let original = CAArgument::new(
        TypeSig::SzArray(Box::new(TypeSig::Object)),
        CAValue::Array(Some(vec![CAArgument::new(
            TypeSig::Object,
            CAValue::Boxed(Box::new(CAArgument::new(TypeSig::I4, CAValue::I4(1)))),
        )])),
    );

    let mut copy = original.clone();
    if let CAValue::Array(Some(items)) = &mut copy.value {
        items[0].value = CAValue::Boxed(Box::new(CAArgument::new(TypeSig::I4, CAValue::I4(2))));
    }

    assert_ne!(copy, original);
    let CAValue::Array(Some(items)) = &original.value else {
        panic!("array expected");
    };
    assert_eq!(
        items[0].value,
        CAValue::Boxed(Box::new(CAArgument::new(TypeSig::I4, CAValue::I4(1))))
    );
}
