//! Writing a resource set back to a directory tree.

use std::path::{Path, PathBuf};

use grafanactl_codec::Codec;
use grafanactl_resource::Resource;
use tracing::warn;

use crate::error::{FsError, Result};

/// Maps a resource to the relative path it should be written at.
pub trait Namer: Send + Sync {
    fn name(&self, resource: &Resource) -> Result<PathBuf>;
}

/// Default namer: `"{Kind}/{Name}.{extension}"`.
pub struct GroupByKind {
    pub extension: &'static str,
}

impl Namer for GroupByKind {
    fn name(&self, resource: &Resource) -> Result<PathBuf> {
        let name = resource.name().ok_or(FsError::MissingName)?;
        Ok(PathBuf::from(format!("{}/{}.{}", resource.kind, name, self.extension)))
    }
}

pub struct WriteOptions {
    pub stop_on_error: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { stop_on_error: false }
    }
}

/// Encode and write every resource under `root`, creating directories as
/// needed. Per-file failures are logged; with `stop_on_error=false` writing
/// continues through the rest of the set.
pub fn write_tree(root: &Path, resources: &[Resource], namer: &dyn Namer, codec: &dyn Codec, opts: &WriteOptions) -> Result<()> {
    let mut last_error = None;

    for resource in resources {
        if let Err(e) = write_one(root, resource, namer, codec) {
            warn!(resource = %resource.reference(), error = %e, "failed to write resource");
            if opts.stop_on_error {
                last_error = Some(e);
                break;
            }
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn write_one(root: &Path, resource: &Resource, namer: &dyn Namer, codec: &dyn Codec) -> Result<()> {
    let relative = namer.name(resource)?;
    let full_path = root.join(&relative);

    if let Some(parent) = full_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| FsError::CreateDir { path: parent.display().to_string(), source })?;
        set_permissions(parent, 0o755);
    }

    let bytes = codec.encode(resource).map_err(|source| FsError::Encode { path: full_path.display().to_string(), source })?;
    std::fs::write(&full_path, &bytes).map_err(|source| FsError::Write { path: full_path.display().to_string(), source })?;
    set_permissions(&full_path, 0o644);

    Ok(())
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)) {
        warn!(path = %path.display(), error = %e, "failed to set permissions");
    }
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) {}
