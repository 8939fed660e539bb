//! Bulk materialization of the `MethodSpec` table
use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    metadata::{
        module::{GenericParamContext, ModuleContext},
        tables::{MethodSpecMap, MethodSpecMd, MethodSpecRc},
    },
    Result,
};

/// Read every `MethodSpec` row of `module` in parallel.
///
/// # Errors
/// Returns the first error raised while reading a row
pub fn load_method_specs(
    module: &Arc<dyn ModuleContext>,
    context: GenericParamContext,
) -> Result<MethodSpecMap> {
    let map = MethodSpecMap::new();

    (1..=module.method_spec_count())
        .into_par_iter()
        .try_for_each(|rid| -> Result<()> {
            let spec: MethodSpecRc = Arc::new(MethodSpecMd::new(module, rid, context)?);
            map.insert(spec.token(), spec);
            Ok(())
        })?;

    Ok(map)
}
