//! Row-backed `MethodSpec` entities read from a module

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Weak,
};

use crate::{
    metadata::{
        customattributes::CustomAttributeList,
        customdebuginformation::PdbCustomDebugInfoList,
        module::{GenericParamContext, MethodDefOrRef, ModuleContext},
        signatures::CallingConventionSig,
        tables::{MethodSpec, TableId},
        token::Token,
    },
    utils::synchronization::InstallOnce,
    Result,
};

/// A `MethodSpec` read from a module.
///
/// The row is read and both of its columns resolved when the entity is created. Custom
/// attributes and custom debug information are materialized on first access and cached.
pub struct MethodSpecMd {
    rid: AtomicU32,
    orig_rid: u32,
    module: Weak<dyn ModuleContext>,
    context: GenericParamContext,
    method: Option<MethodDefOrRef>,
    instantiation: Option<CallingConventionSig>,
    custom_attributes: InstallOnce<CustomAttributeList>,
    custom_debug_infos: InstallOnce<PdbCustomDebugInfoList>,
}

impl MethodSpecMd {
    /// Read row `rid` of the `MethodSpec` table of `module`
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the row does not exist
    pub fn new(
        module: &Arc<dyn ModuleContext>,
        rid: u32,
        context: GenericParamContext,
    ) -> Result<Self> {
        let row = module
            .method_spec_row(rid)
            .ok_or_else(|| malformed_error!("MethodSpec row {} does not exist", rid))?;

        Ok(MethodSpecMd {
            rid: AtomicU32::new(rid),
            orig_rid: rid,
            module: Arc::downgrade(module),
            context,
            method: module.resolve_method_def_or_ref(row.method, &context),
            instantiation: module.read_signature(row.instantiation, &context),
            custom_attributes: InstallOnce::new(),
            custom_debug_infos: InstallOnce::new(),
        })
    }

    /// The row id this entity was read from
    #[must_use]
    pub fn orig_rid(&self) -> u32 {
        self.orig_rid
    }

    /// The generic parameter context the row was resolved in
    #[must_use]
    pub fn context(&self) -> &GenericParamContext {
        &self.context
    }

    /// The owning module, `None` once it has been dropped
    #[must_use]
    pub fn module(&self) -> Option<Arc<dyn ModuleContext>> {
        self.module.upgrade()
    }

    fn read_custom_attributes(&self) -> CustomAttributeList {
        let list = Arc::new(boxcar::Vec::new());
        if let Some(module) = self.module.upgrade() {
            for rid in module
                .custom_attribute_rids(TableId::MethodSpec, self.orig_rid)
                .iter()
            {
                if let Some(attribute) = module.read_custom_attribute(rid) {
                    list.push(Arc::new(attribute));
                }
            }
        }
        list
    }

    fn read_custom_debug_infos(&self) -> PdbCustomDebugInfoList {
        let list = Arc::new(boxcar::Vec::new());
        if let Some(module) = self.module.upgrade() {
            let token = Token::from_parts(TableId::MethodSpec, self.orig_rid);
            for info in module.custom_debug_infos(token, &self.context) {
                list.push(info);
            }
        }
        list
    }
}

impl MethodSpec for MethodSpecMd {
    fn rid(&self) -> u32 {
        self.rid.load(Ordering::Acquire)
    }

    fn set_rid(&self, rid: u32) {
        self.rid.store(rid, Ordering::Release);
    }

    fn method(&self) -> Option<&MethodDefOrRef> {
        self.method.as_ref()
    }

    fn instantiation(&self) -> Option<&CallingConventionSig> {
        self.instantiation.as_ref()
    }

    fn custom_attributes(&self) -> &CustomAttributeList {
        self.custom_attributes
            .get_or_install(|| self.read_custom_attributes())
    }

    fn custom_debug_infos(&self) -> &PdbCustomDebugInfoList {
        self.custom_debug_infos
            .get_or_install(|| self.read_custom_debug_infos())
    }
}
