use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// Read a file from disk in full.
pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Write `data` to `path`, replacing any existing file.
///
/// Writes to a sibling temp file first and renames over the destination on
/// success, so a crash mid-write never leaves a half-written output file in
/// place of the caller's requested path (recommended, not mandated, but
/// free on every platform we target).
pub fn write_file<P: AsRef<Path>>(path: P, data: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let tmp_path = path.with_extension("stegophoto.tmp");
    {
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(data)?;
        tmp.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
