//! Filesystem listing: one `df`-style row per mount

use hostagent_api::Filesystem;

use super::Fields;
use crate::error::MarshalError;

/// Parse the filesystem gatherer output
///
/// Columns, in order: device, type, size, used, available, use%, mount point.
/// The use% column is never read.
///
/// # Errors
/// Returns the first numeric conversion failure; no partial list is returned.
pub fn filesystems(output: &str) -> Result<Vec<Filesystem>, MarshalError> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(filesystem)
        .collect()
}

fn filesystem(line: &str) -> Result<Filesystem, MarshalError> {
    let mut fields = Fields::new(line);

    let filesystem = fields.text().to_string();
    let fs_type = fields.text().to_string();
    let size = fields.int("size")?;
    let used_space = fields.int("used space")?;
    let available_space = fields.int("available space")?;
    fields.skip();
    let mounted_on = fields.text().to_string();

    Ok(Filesystem {
        filesystem,
        fs_type,
        size,
        used_space,
        available_space,
        mounted_on,
    })
}
