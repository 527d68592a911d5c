use super::descriptor::CaseDescriptor;
use super::error::CaseError;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Creates the case directory and copies the parameter file (as `local_params_name`) and
/// the engine source into it. Safe to repeat: existing copies are overwritten and a file
/// that already is its own destination is left alone.
pub fn stage_case(descriptor: &CaseDescriptor, local_params_name: &str) -> Result<(), CaseError> {
    let case_dir = &descriptor.case_dir;
    let staging_err = |source| CaseError::Staging {
        path: case_dir.clone(),
        source,
    };

    fs::create_dir_all(case_dir).map_err(staging_err)?;
    info!("Case directory ready: {:?}", case_dir);

    copy_into(
        &descriptor.params_file,
        &case_dir.join(local_params_name),
    )
    .map_err(staging_err)?;
    copy_into(
        &descriptor.source,
        &case_dir.join(descriptor.source_name()),
    )
    .map_err(staging_err)?;

    Ok(())
}

fn copy_into(from: &Path, to: &Path) -> std::io::Result<()> {
    if to.exists() && fs::canonicalize(from)? == fs::canonicalize(to)? {
        debug!("{:?} is already in place, not copying", to);
        return Ok(());
    }
    fs::copy(from, to)?;
    debug!("Copied {:?} -> {:?}", from, to);
    Ok(())
}
