//! On-disk cache for compiled [`crate::material::MaterialRecord`]s, so a
//! host program can skip recompiling a material's cross-section tables on
//! every run.
//!
//! Mirrors `pineappl::grid::Grid::{read, write}`'s `bincode` framing, plus a
//! small versioned header (magic, format version, endianness tag) so a
//! cache file written on one machine is rejected cleanly, rather than
//! silently misread, on another with a different native byte order
//! (`spec.md` §6, "Physics data files").

use crate::error::{Error, Result};
use crate::material::MaterialRecord;
use std::io::{Read, Write};

const MAGIC: [u8; 4] = *b"GTC1";
const FORMAT_VERSION: u32 = 1;
const ENDIAN_LITTLE: u8 = 0;
const ENDIAN_BIG: u8 = 1;

#[cfg(target_endian = "little")]
const NATIVE_ENDIAN: u8 = ENDIAN_LITTLE;
#[cfg(target_endian = "big")]
const NATIVE_ENDIAN: u8 = ENDIAN_BIG;

/// Serializes `record` to `writer`, preceded by a header identifying the
/// format version and the writer's native endianness.
///
/// # Errors
///
/// Returns [`Error::Numerical`] if the header or payload cannot be written.
pub fn write_record(mut writer: impl Write, record: &MaterialRecord) -> Result<()> {
    writer
        .write_all(&MAGIC)
        .and_then(|()| writer.write_all(&FORMAT_VERSION.to_le_bytes()))
        .and_then(|()| writer.write_all(&[NATIVE_ENDIAN]))
        .map_err(|e| Error::Numerical(format!("failed writing cache header: {e}")))?;
    bincode::serialize_into(writer, record)
        .map_err(|e| Error::Numerical(format!("failed writing cache payload: {e}")))
}

/// Reads a [`MaterialRecord`] previously written by [`write_record`].
///
/// # Errors
///
/// Returns [`Error::Numerical`] if the magic bytes don't match, the format
/// version is unrecognized, the endianness tag doesn't match this host, or
/// the payload fails to deserialize.
pub fn read_record(mut reader: impl Read) -> Result<MaterialRecord> {
    let mut magic = [0u8; 4];
    let mut version = [0u8; 4];
    let mut endian = [0u8; 1];
    reader
        .read_exact(&mut magic)
        .and_then(|()| reader.read_exact(&mut version))
        .and_then(|()| reader.read_exact(&mut endian))
        .map_err(|e| Error::Numerical(format!("failed reading cache header: {e}")))?;

    if magic != MAGIC {
        return Err(Error::Numerical("not a gamma-transport cache file (bad magic)".to_string()));
    }
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(Error::Numerical(format!(
            "unsupported cache format version {version}, expected {FORMAT_VERSION}"
        )));
    }
    if endian[0] != NATIVE_ENDIAN {
        return Err(Error::Numerical(
            "cache file was written on a host with different byte order".to_string(),
        ));
    }

    bincode::deserialize_from(reader)
        .map_err(|e| Error::Numerical(format!("failed reading cache payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialDefinition, MaterialRegistry};
    use crate::xsection::XSectionConfig;

    fn water_record() -> MaterialRecord {
        let mut registry = MaterialRegistry::new();
        registry.register(MaterialDefinition::from_formula("water", "H2O").unwrap());
        registry.compile(&XSectionConfig::default());
        registry.get("water").unwrap().clone()
    }

    #[test]
    fn round_trips_a_compiled_record() {
        let record = water_record();
        let mut buffer = Vec::new();
        write_record(&mut buffer, &record).unwrap();
        let read_back = read_record(buffer.as_slice()).unwrap();
        assert_eq!(read_back.definition.name, record.definition.name);
        assert!((read_back.table.total(1.0) - record.table.total(1.0)).abs() < 1.0e-15);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buffer = vec![0u8; 16];
        buffer[0..4].copy_from_slice(b"XXXX");
        assert!(matches!(read_record(buffer.as_slice()), Err(Error::Numerical(_))));
    }

    #[test]
    fn rejects_truncated_header() {
        let buffer = vec![0u8; 2];
        assert!(matches!(read_record(buffer.as_slice()), Err(Error::Numerical(_))));
    }
}
