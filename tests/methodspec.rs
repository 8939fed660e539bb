//! Row-backed and user-created `MethodSpec` entities against an in-memory module.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Barrier,
    },
    thread,
    time::Duration,
};

use dotmeta::metadata::{
    customattributes::CustomAttribute,
    customdebuginformation::{CustomDebugKind, PdbCustomDebugInfo},
    module::{
        GenericParamContext, MemberRefInfo, MemberRefParent, MethodDefInfo, MethodDefOrRef,
        ModuleContext, RidList,
    },
    signatures::{
        CallingConventionSig, GenericInstMethodSig, GenericInstSig, MethodSig, TypeNameResolver,
        TypeSig,
    },
    tables::{
        load_method_specs, CodedIndexType, MethodSpec, MethodSpecMd, MethodSpecRaw,
        MethodSpecUser, TableId,
    },
    token::Token,
};

const LIST_TYPE: Token = Token(0x0100_0007);

/// Rows: 1 = `Enumerable.Cast<T>` (MethodDef), 2 = `List<int>.ConvertAll<U>` (MemberRef),
/// 3 = an unresolvable method
#[derive(Default)]
struct Module {
    attribute_lists: AtomicUsize,
    attribute_reads: AtomicUsize,
}

impl TypeNameResolver for Module {
    fn type_full_name(&self, token: Token) -> Option<String> {
        (token == LIST_TYPE).then(|| "System.Collections.Generic.List`1".to_string())
    }
}

impl ModuleContext for Module {
    fn method_spec_count(&self) -> u32 {
        3
    }

    fn method_spec_row(&self, rid: u32) -> Option<MethodSpecRaw> {
        let method = match rid {
            1 => Token::from_parts(TableId::MethodDef, 1),
            2 => Token::from_parts(TableId::MemberRef, 1),
            3 => Token::from_parts(TableId::MemberRef, 2),
            _ => return None,
        };

        Some(MethodSpecRaw {
            rid,
            token: Token::from_parts(TableId::MethodSpec, rid),
            offset: (rid as usize - 1) * 4,
            method: CodedIndexType::MethodDefOrRef.encode(method).ok()?,
            instantiation: rid * 0x10,
        })
    }

    fn resolve_method_def_or_ref(
        &self,
        coded_index: u32,
        _context: &GenericParamContext,
    ) -> Option<MethodDefOrRef> {
        let token = CodedIndexType::MethodDefOrRef.decode(coded_index).ok()?;
        if token == Token::from_parts(TableId::MethodDef, 1) {
            Some(MethodDefOrRef::MethodDef(MethodDefInfo {
                token,
                name: "Cast".to_string(),
                declaring_type: Some("System.Linq.Enumerable".to_string()),
                signature: Some(MethodSig::create_static_generic(
                    1,
                    TypeSig::SzArray(Box::new(TypeSig::MVar(0))),
                    [TypeSig::Object],
                )),
            }))
        } else if token == Token::from_parts(TableId::MemberRef, 1) {
            Some(MethodDefOrRef::MemberRef(MemberRefInfo {
                token,
                name: "ConvertAll".to_string(),
                class: MemberRefParent::TypeSpec {
                    token: Token::from_parts(TableId::TypeSpec, 1),
                    signature: TypeSig::GenericInst(GenericInstSig {
                        generic_type: Box::new(TypeSig::Class(LIST_TYPE)),
                        generic_arguments: vec![TypeSig::I4],
                    }),
                },
                signature: Some(MethodSig::create_instance_generic(
                    1,
                    TypeSig::SzArray(Box::new(TypeSig::MVar(0))),
                    [TypeSig::Var(0)],
                )),
            }))
        } else {
            None
        }
    }

    fn read_signature(
        &self,
        blob_index: u32,
        _context: &GenericParamContext,
    ) -> Option<CallingConventionSig> {
        match blob_index {
            0x10 | 0x30 => Some(GenericInstMethodSig::new([TypeSig::String]).into()),
            0x20 => Some(GenericInstMethodSig::new([TypeSig::R8]).into()),
            _ => None,
        }
    }

    fn custom_attribute_rids(&self, table: TableId, rid: u32) -> RidList {
        self.attribute_lists.fetch_add(1, Ordering::SeqCst);
        // widen the window in which concurrent first accesses overlap
        thread::sleep(Duration::from_millis(20));

        match (table, rid) {
            (TableId::MethodSpec, 1) => RidList::List(vec![4, 9, 11]),
            _ => RidList::empty(),
        }
    }

    fn read_custom_attribute(&self, rid: u32) -> Option<CustomAttribute> {
        self.attribute_reads.fetch_add(1, Ordering::SeqCst);
        Some(CustomAttribute::new_raw(None, vec![0x01, 0x00, rid as u8, 0x00, 0x00]))
    }

    fn custom_debug_infos(
        &self,
        token: Token,
        _context: &GenericParamContext,
    ) -> Vec<PdbCustomDebugInfo> {
        if token.rid() == 2 {
            vec![PdbCustomDebugInfo::Unknown {
                kind: CustomDebugKind::from_guid([7; 16]),
                data: vec![1, 2, 3],
            }]
        } else {
            Vec::new()
        }
    }
}

fn module() -> (Arc<Module>, Arc<dyn ModuleContext>) {
    let module = Arc::new(Module::default());
    let context: Arc<dyn ModuleContext> = module.clone();
    (module, context)
}

#[test]
fn full_names() {
    let (names, module) = module();
    let context = GenericParamContext::default();

    let cast = MethodSpecMd::new(&module, 1, context).unwrap();
    assert_eq!(
        cast.full_name(Some(names.as_ref())),
        "System.String[] System.Linq.Enumerable::Cast<System.String>(System.Object)"
    );

    let convert = MethodSpecMd::new(&module, 2, context).unwrap();
    assert_eq!(
        convert.full_name(Some(names.as_ref())),
        "System.Double[] System.Collections.Generic.List`1<System.Int32>::ConvertAll<System.Double>(System.Int32)"
    );

    let unresolved = MethodSpecMd::new(&module, 3, context).unwrap();
    assert!(unresolved.method().is_none());
    assert_eq!(unresolved.full_name(Some(names.as_ref())), "");
    assert_eq!(unresolved.number_of_generic_parameters(), 1);
}

#[test]
fn concurrent_first_access_installs_one_list() {
    const THREADS: usize = 8;

    let (counters, module) = module();
    let spec = Arc::new(MethodSpecMd::new(&module, 1, GenericParamContext::default()).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let spec = spec.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                spec.custom_attributes().clone()
            })
        })
        .collect();

    let lists: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for list in &lists {
        assert!(Arc::ptr_eq(list, &lists[0]));
    }
    assert_eq!(lists[0].count(), 3);
    assert!(Arc::ptr_eq(spec.custom_attributes(), &lists[0]));

    // every racing thread may compute, but later calls never do
    let computed = counters.attribute_lists.load(Ordering::SeqCst);
    assert!((1..=THREADS).contains(&computed));
    let _ = spec.custom_attributes();
    assert_eq!(counters.attribute_lists.load(Ordering::SeqCst), computed);
}

#[test]
fn custom_attributes_keep_row_order() {
    let (_, module) = module();
    let spec = MethodSpecMd::new(&module, 1, GenericParamContext::default()).unwrap();

    let markers: Vec<u8> = spec
        .custom_attributes()
        .iter()
        .map(|(_, attribute)| attribute.get_blob()[2])
        .collect();
    assert_eq!(markers, vec![4, 9, 11]);
}

#[test]
fn custom_debug_infos_use_the_original_rid() {
    let (_, module) = module();
    let spec = MethodSpecMd::new(&module, 2, GenericParamContext::default()).unwrap();

    spec.set_rid(40);
    assert_eq!(spec.token(), Token::new(0x2B00_0028));
    assert_eq!(spec.orig_rid(), 2);

    let infos = spec.custom_debug_infos();
    assert_eq!(infos.count(), 1);
    assert_eq!(infos.get(0).unwrap().kind(), CustomDebugKind::Unknown([7; 16]));
}

#[test]
fn bulk_load() {
    let (_, module) = module();
    let map = load_method_specs(&module, GenericParamContext::default()).unwrap();

    assert_eq!(map.len(), 3);
    let tokens: Vec<u32> = map.iter().map(|entry| entry.key().value()).collect();
    assert_eq!(tokens, vec![0x2B00_0001, 0x2B00_0002, 0x2B00_0003]);
    assert_eq!(map.get(&Token::new(0x2B00_0002)).unwrap().value().name(), "ConvertAll");
}

#[test]
fn user_created_entity() {
    let method = MethodDefOrRef::MethodDef(MethodDefInfo {
        token: Token::new(0x0600_0010),
        name: "Empty".to_string(),
        declaring_type: Some("System.Array".to_string()),
        signature: Some(MethodSig::create_static_generic(
            1,
            TypeSig::SzArray(Box::new(TypeSig::MVar(0))),
            [],
        )),
    });

    let spec = MethodSpecUser::with_generic_arguments(method, GenericInstMethodSig::new([TypeSig::U1]));
    assert_eq!(spec.rid(), 0);
    assert_eq!(
        spec.full_name(None),
        "System.Byte[] System.Array::Empty<System.Byte>()"
    );
    assert!(!spec.has_custom_attributes());
    assert!(!spec.has_custom_debug_infos());
}
