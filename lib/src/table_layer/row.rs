use std::fmt;

use super::error::RowError;

pub const ID_SIZE: usize = size_of::<i32>();
pub const USERNAME_SIZE: usize = 32;
pub const EMAIL_SIZE: usize = 255;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

/// A serialized row as it sits in a leaf cell
pub type RowBytes = [u8; ROW_SIZE];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: i32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

fn check_field(field: &'static str, value: &str, max: usize) -> Result<(), RowError> {
    if value.len() > max {
        return Err(RowError::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }

    // NUL is the padding byte, a field containing one would not survive decoding
    if value.as_bytes().contains(&0) {
        return Err(RowError::NulByte { field });
    }

    Ok(())
}

/// Check that a row fits its fixed-width slot
pub fn validate(row: &Row) -> Result<(), RowError> {
    check_field("username", &row.username, USERNAME_SIZE)?;
    check_field("email", &row.email, EMAIL_SIZE)
}

/// Serialize a row, rejecting it instead of truncating oversized fields
pub fn encode(row: &Row) -> Result<RowBytes, RowError> {
    validate(row)?;

    let mut bytes = [0u8; ROW_SIZE];
    bytes[ID_OFFSET..USERNAME_OFFSET].copy_from_slice(&row.id.to_le_bytes());

    let username = row.username.as_bytes();
    bytes[USERNAME_OFFSET..USERNAME_OFFSET + username.len()].copy_from_slice(username);

    let email = row.email.as_bytes();
    bytes[EMAIL_OFFSET..EMAIL_OFFSET + email.len()].copy_from_slice(email);

    Ok(bytes)
}

fn read_padded(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

pub fn decode(bytes: &RowBytes) -> Row {
    let mut id = [0u8; ID_SIZE];
    id.copy_from_slice(&bytes[ID_OFFSET..USERNAME_OFFSET]);

    Row {
        id: i32::from_le_bytes(id),
        username: read_padded(&bytes[USERNAME_OFFSET..EMAIL_OFFSET]),
        email: read_padded(&bytes[EMAIL_OFFSET..]),
    }
}
