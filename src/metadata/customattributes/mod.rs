//! Custom attributes, ECMA-335 II.22.10 and II.23.3.
//!
//! A [`CustomAttribute`] is either kept as its undecoded blob or decoded into constructor
//! and named arguments. A decoded attribute can still hand out the exact bytes it was read
//! from: [`CustomAttribute::get_blob`] drains a deferred [`ByteCursor`] once and caches the
//! result.
//!
//! # Examples
//!
//! ```rust
//! use dotmeta::metadata::customattributes::CustomAttribute;
//!
//! let attribute = CustomAttribute::new_raw(None, vec![0x01, 0x00, 0x00, 0x00]);
//! assert!(attribute.is_raw());
//! assert_eq!(attribute.get_blob(), &[0x01, 0x00, 0x00, 0x00]);
//! ```

mod encoder;
mod parser;
mod types;

pub use encoder::encode_custom_attribute;
pub use parser::{parse_custom_attribute_blob, CustomAttributeParser, MAX_NESTING_DEPTH, PROLOG};
pub use types::*;

use std::{
    fmt,
    sync::{Arc, Mutex, OnceLock},
};

use tracing::warn;

use crate::{
    file::cursor::{ByteCursor, SliceCursor},
    metadata::{
        module::MethodDefOrRef,
        signatures::{TypeNameResolver, TypeSig},
        token::Token,
    },
    Result,
};

/// A reference-counted `CustomAttribute`
pub type CustomAttributeRc = Arc<CustomAttribute>;
/// The custom attributes owned by one entity
pub type CustomAttributeList = Arc<boxcar::Vec<CustomAttributeRc>>;

/// Type information the blob decoder cannot find in the blob itself
pub trait CustomAttributeTypes {
    /// The underlying integer type of the enum `token`
    fn enum_underlying_type(&self, token: Token) -> Option<TypeSig>;

    /// Token of the type with the serialized name `name`
    fn type_by_name(&self, name: &str) -> Option<Token>;
}

/// The payload of a custom attribute
#[derive(Debug, Clone, PartialEq)]
pub enum CustomAttributeData {
    /// The blob was not decoded
    RawBlob(Vec<u8>),
    /// The decoded arguments
    Parsed {
        /// Constructor arguments in parameter order
        constructor_arguments: Vec<CAArgument>,
        /// Field and property assignments
        named_arguments: Vec<CANamedArgument>,
    },
}

/// A custom attribute attached to a metadata row
pub struct CustomAttribute {
    /// The attribute constructor, `None` if it could not be resolved
    pub constructor: Option<MethodDefOrRef>,
    /// Raw or decoded payload
    pub data: CustomAttributeData,
    blob: OnceLock<Vec<u8>>,
    blob_source: Mutex<Option<Box<dyn ByteCursor>>>,
}

impl CustomAttribute {
    /// An attribute whose blob stays undecoded
    #[must_use]
    pub fn new_raw(constructor: Option<MethodDefOrRef>, blob: Vec<u8>) -> Self {
        CustomAttribute {
            constructor,
            data: CustomAttributeData::RawBlob(blob),
            blob: OnceLock::new(),
            blob_source: Mutex::new(None),
        }
    }

    /// A decoded attribute without a stored blob
    #[must_use]
    pub fn new(
        constructor: Option<MethodDefOrRef>,
        constructor_arguments: Vec<CAArgument>,
        named_arguments: Vec<CANamedArgument>,
    ) -> Self {
        CustomAttribute {
            constructor,
            data: CustomAttributeData::Parsed {
                constructor_arguments,
                named_arguments,
            },
            blob: OnceLock::new(),
            blob_source: Mutex::new(None),
        }
    }

    /// Attach the source [`CustomAttribute::get_blob`] reads the original bytes from
    #[must_use]
    pub fn with_blob_source(self, source: Box<dyn ByteCursor>) -> Self {
        CustomAttribute {
            blob_source: Mutex::new(Some(source)),
            ..self
        }
    }

    /// Decode `blob` against the constructor's signature.
    ///
    /// Attributes whose constructor or signature is unknown, or whose blob fails to decode,
    /// are kept raw.
    #[must_use]
    pub fn from_blob(
        constructor: Option<MethodDefOrRef>,
        blob: &[u8],
        types: Option<&dyn CustomAttributeTypes>,
    ) -> Self {
        let Some(signature) = constructor.as_ref().and_then(MethodDefOrRef::method_sig) else {
            return CustomAttribute::new_raw(constructor, blob.to_vec());
        };

        match parse_custom_attribute_blob(blob, signature, types) {
            Ok((constructor_arguments, named_arguments)) => {
                CustomAttribute::new(constructor, constructor_arguments, named_arguments)
                    .with_blob_source(Box::new(SliceCursor::new(blob.to_vec())))
            }
            Err(error) => {
                warn!(
                    constructor = constructor.as_ref().map(MethodDefOrRef::name),
                    %error,
                    "keeping undecodable custom attribute blob raw"
                );
                CustomAttribute::new_raw(constructor, blob.to_vec())
            }
        }
    }

    /// `true` if the blob was not decoded
    #[must_use]
    pub fn is_raw(&self) -> bool {
        matches!(self.data, CustomAttributeData::RawBlob(_))
    }

    /// The original blob bytes.
    ///
    /// For a decoded attribute the deferred source is drained on the first call, released and
    /// cached; later calls return the cached bytes. Without a source this is empty.
    pub fn get_blob(&self) -> &[u8] {
        if let CustomAttributeData::RawBlob(blob) = &self.data {
            return blob;
        }

        // get_or_init blocks concurrent callers so the source is drained exactly once
        self.blob.get_or_init(|| {
            let Some(mut source) = lock!(self.blob_source).take() else {
                return Vec::new();
            };

            source.set_position(0);
            let bytes = source.read_to_end().unwrap_or_else(|error| {
                warn!(%error, "failed to read custom attribute blob");
                Vec::new()
            });
            source.dispose();
            bytes
        })
    }

    /// Encode the decoded arguments into a fresh blob
    ///
    /// # Errors
    /// See [`encode_custom_attribute`]
    pub fn to_blob(&self, names: Option<&dyn TypeNameResolver>) -> Result<Vec<u8>> {
        match &self.data {
            CustomAttributeData::RawBlob(blob) => Ok(blob.clone()),
            CustomAttributeData::Parsed {
                constructor_arguments,
                named_arguments,
            } => encode_custom_attribute(constructor_arguments, named_arguments, names),
        }
    }

    /// Constructor arguments, empty for a raw attribute
    #[must_use]
    pub fn constructor_arguments(&self) -> &[CAArgument] {
        match &self.data {
            CustomAttributeData::Parsed {
                constructor_arguments,
                ..
            } => constructor_arguments,
            CustomAttributeData::RawBlob(_) => &[],
        }
    }

    /// Named arguments, empty for a raw attribute
    #[must_use]
    pub fn named_arguments(&self) -> &[CANamedArgument] {
        match &self.data {
            CustomAttributeData::Parsed {
                named_arguments, ..
            } => named_arguments,
            CustomAttributeData::RawBlob(_) => &[],
        }
    }

    /// Named arguments that assign fields
    pub fn fields(&self) -> impl Iterator<Item = &CANamedArgument> {
        self.named_arguments().iter().filter(|named| named.is_field)
    }

    /// Named arguments that assign properties
    pub fn properties(&self) -> impl Iterator<Item = &CANamedArgument> {
        self.named_arguments().iter().filter(|named| named.is_property())
    }

    /// The field assignment named `name`
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&CANamedArgument> {
        self.named_argument(name, true)
    }

    /// The property assignment named `name`
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&CANamedArgument> {
        self.named_argument(name, false)
    }

    /// The named argument `name` of the given kind
    #[must_use]
    pub fn named_argument(&self, name: &str, is_field: bool) -> Option<&CANamedArgument> {
        self.named_arguments()
            .iter()
            .find(|named| named.is_field == is_field && named.name == name)
    }

    /// Full name of the attribute type, taken from the constructor's declaring type
    #[must_use]
    pub fn type_full_name(&self, names: Option<&dyn TypeNameResolver>) -> String {
        self.constructor
            .as_ref()
            .and_then(|ctor| ctor.declaring_type_full_name(names))
            .unwrap_or_default()
    }
}

impl fmt::Debug for CustomAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAttribute")
            .field("constructor", &self.constructor)
            .field("data", &self.data)
            .field("blob_cached", &self.blob.get().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::metadata::{
        module::MethodDefInfo,
        signatures::MethodSig,
    };

    fn constructor(params: Vec<TypeSig>) -> MethodDefOrRef {
        MethodDefOrRef::MethodDef(MethodDefInfo {
            token: Token::new(0x0600_0001),
            name: ".ctor".to_string(),
            declaring_type: Some("Demo.MarkerAttribute".to_string()),
            signature: Some(MethodSig::create_instance(TypeSig::Void, params)),
        })
    }

    struct CountingCursor {
        inner: SliceCursor,
        reads: Arc<AtomicUsize>,
    }

    impl ByteCursor for CountingCursor {
        fn len(&self) -> u64 {
            self.inner.len()
        }

        fn position(&self) -> u64 {
            self.inner.position()
        }

        fn set_position(&mut self, position: u64) {
            self.inner.set_position(position);
        }

        fn read_into(&mut self, buffer: &mut [u8]) -> Result<()> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read_into(buffer)
        }

        fn dispose(&mut self) {
            self.inner.dispose();
        }
    }

    #[test]
    fn decoded_attribute_keeps_its_blob() {
        let blob = vec![0x01, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x00, 0x00];
        let attribute = CustomAttribute::from_blob(Some(constructor(vec![TypeSig::I4])), &blob, None);

        assert!(!attribute.is_raw());
        assert_eq!(attribute.constructor_arguments()[0].value, CAValue::I4(42));
        assert_eq!(attribute.get_blob(), blob.as_slice());
        assert_eq!(attribute.to_blob(None).unwrap(), blob);
        assert_eq!(attribute.type_full_name(None), "Demo.MarkerAttribute");
    }

    #[test]
    fn deferred_source_is_read_once() {
        let reads = Arc::new(AtomicUsize::new(0));
        let source = CountingCursor {
            inner: SliceCursor::new(vec![0x01, 0x00, 0x00, 0x00]),
            reads: reads.clone(),
        };
        let attribute = CustomAttribute::new(None, vec![], vec![]).with_blob_source(Box::new(source));

        let first = attribute.get_blob().to_vec();
        let second = attribute.get_blob();
        assert_eq!(first, vec![0x01, 0x00, 0x00, 0x00]);
        assert_eq!(second, first.as_slice());
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_source_means_empty_blob() {
        let attribute = CustomAttribute::new(None, vec![], vec![]);
        assert!(attribute.get_blob().is_empty());
    }

    #[test]
    fn undecodable_blob_stays_raw() {
        let attribute =
            CustomAttribute::from_blob(Some(constructor(vec![TypeSig::I8])), &[0x01, 0x00, 0x01], None);
        assert!(attribute.is_raw());
        assert_eq!(attribute.get_blob(), &[0x01, 0x00, 0x01]);
        assert!(attribute.constructor_arguments().is_empty());

        let unresolved = CustomAttribute::from_blob(None, &[0x01, 0x00], None);
        assert!(unresolved.is_raw());
    }

    #[test]
    fn named_argument_lookup() {
        let flag = |is_field, name: &str| CANamedArgument {
            is_field,
            field_type: TypeSig::Boolean,
            name: name.to_string(),
            argument: CAArgument::new(TypeSig::Boolean, CAValue::Bool(true)),
        };
        let attribute = CustomAttribute::new(
            None,
            vec![],
            vec![flag(true, "Hidden"), flag(false, "Hidden"), flag(false, "Inherited")],
        );

        assert_eq!(attribute.fields().count(), 1);
        assert_eq!(attribute.properties().count(), 2);
        assert!(attribute.field("Hidden").unwrap().is_field);
        assert!(attribute.property("Hidden").unwrap().is_property());
        assert!(attribute.field("Inherited").is_none());
        assert!(attribute.named_argument("Inherited", false).is_some());
    }

    #[test]
    fn concurrent_get_blob() {
        let attribute = Arc::new(
            CustomAttribute::new(None, vec![], vec![])
                .with_blob_source(Box::new(SliceCursor::new(vec![0x01, 0x00, 0x05]))),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let attribute = attribute.clone();
                std::thread::spawn(move || attribute.get_blob().to_vec())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![0x01, 0x00, 0x05]);
        }
    }
}
