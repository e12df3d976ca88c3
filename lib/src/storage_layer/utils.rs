use super::error::StorageError;
use super::page::Page;
use bincode::{
    Decode, Encode,
    config::{self, Config},
};

/// Upper bound on what a single decode may claim, keeps a corrupted length
/// prefix from turning into a huge allocation
pub const DECODE_LIMIT: usize = 64 * 1024;

/// Fixed-width little-endian integers so node layouts have a predictable size
pub fn bincode_config() -> impl Config {
    config::standard()
        .with_fixed_int_encoding()
        .with_limit::<DECODE_LIMIT>()
}

pub fn save<T: Encode>(item: &T, page: &mut Page) -> Result<(), StorageError> {
    let encoded: Vec<u8> = bincode::encode_to_vec(item, bincode_config())?;
    if encoded.len() > page.data.len() {
        return Err(StorageError::PageFull(page.id));
    }

    page.data[..encoded.len()].copy_from_slice(&encoded);
    page.data[encoded.len()..].fill(0);
    Ok(())
}

pub fn load<T: Decode<()>>(page: &Page) -> Result<T, StorageError> {
    let (item, _): (T, usize) = bincode::decode_from_slice(&page.data[..], bincode_config())?;
    Ok(item)
}
