use crate::error::Result;
use cobot_catalog::definitions::action_path;
use cobot_catalog::ActionCatalog;
use cobot_vector_store::{BinaryReader, BinaryWriter};
use std::io::Cursor;
use std::path::Path;

/// CRC32 (IEEE) over the loaded action names (newline-terminated, in entry order) followed
/// by the concatenated raw bytes of the `changed` actions. Entries that cannot be read
/// contribute nothing.
///
/// Entry ids are positions in `loaded`, so reordering or substituting actions changes the
/// checksum even when no definition file did.
pub fn actions_checksum<L, C>(catalog: &dyn ActionCatalog, loaded: &[L], changed: &[C]) -> i64
where
    L: AsRef<str>,
    C: AsRef<str>,
{
    let mut hasher = crc32fast::Hasher::new();
    for name in loaded {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(b"\n");
    }
    for name in changed {
        let path = action_path(name.as_ref());
        match catalog.read_bytes(&path) {
            Ok(bytes) => hasher.update(&bytes),
            Err(err) => log::warn!("Excluding {path} from checksum: {err}"),
        }
    }
    i64::from(hasher.finalize())
}

/// Stored checksum, or `None` when the record is missing or cannot be decoded.
pub fn read_checksum(path: &Path) -> Result<Option<i64>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut reader = BinaryReader::new(Cursor::new(bytes.as_slice()));
    let decoded = reader
        .read_i64()
        .and_then(|value| reader.expect_end().map(|()| value));
    match decoded {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            log::warn!("Ignoring unreadable checksum record {:?}: {err}", path);
            Ok(None)
        }
    }
}

pub fn write_checksum(path: &Path, value: i64) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BinaryWriter::new(Vec::with_capacity(8));
    writer.write_i64(value)?;
    let tmp = path.with_extension("checksum.tmp");
    std::fs::write(&tmp, writer.into_inner())?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}
