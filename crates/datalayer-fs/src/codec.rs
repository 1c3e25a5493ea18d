//! Conversion between wire keys and directory entry names.

use datalayer_rpc::RawKey;

/// Decode a wire key into the name shown in its store directory.
///
/// The hex body is decoded and read as UTF-8; invalid sequences become
/// U+FFFD rather than failing the whole listing.
pub fn decode_key(raw: &RawKey) -> datalayer_rpc::Result<String> {
    let bytes = raw.to_bytes()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Encode an entry name back into wire form.
pub fn encode_key(name: &str) -> RawKey {
    RawKey::from_bytes(name.as_bytes())
}

/// Whether `name` can be addressed as a single path component.
pub fn is_valid_entry_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\0'])
}
