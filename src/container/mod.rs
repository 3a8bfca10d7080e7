//! Image carriers (components C5/C6) and container-format dispatch.

pub mod jpeg;
pub mod png;

use std::path::Path;

use crate::error::Error;
use crate::header::ContainerExt;

/// Infer the container format from a file extension. Case-insensitive;
/// unsupported or missing extensions are rejected per §4.6.
pub fn detect_extension(path: &Path) -> Result<ContainerExt, Error> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => Ok(ContainerExt::Png),
        Some("jpg") | Some("jpeg") => Ok(ContainerExt::Jpeg),
        _ => Err(Error::UnsupportedContainer),
    }
}
