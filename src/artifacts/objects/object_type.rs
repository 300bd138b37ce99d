/// Object variant, read from the leading token of a serialized object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    /// Any leading token that is not one of the persisted variants
    Invalid,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Invalid => "invalid",
        }
    }

    /// Parse the type token of a serialized object (everything before the first space)
    ///
    /// Never fails: unknown tokens and buffers without a space map to `Invalid`.
    pub fn parse_header(bytes: &[u8]) -> ObjectType {
        match bytes.iter().position(|&b| b == b' ') {
            Some(space) => ObjectType::from(&bytes[..space]),
            None => ObjectType::Invalid,
        }
    }

    /// Three-bit type code used in pack object records
    pub fn pack_code(&self) -> u8 {
        match self {
            ObjectType::Commit => 1,
            ObjectType::Tree => 2,
            ObjectType::Blob => 3,
            ObjectType::Invalid => 0,
        }
    }

    pub fn from_pack_code(code: u8) -> ObjectType {
        match code {
            1 => ObjectType::Commit,
            2 => ObjectType::Tree,
            3 => ObjectType::Blob,
            _ => ObjectType::Invalid,
        }
    }
}

impl From<&[u8]> for ObjectType {
    fn from(token: &[u8]) -> Self {
        match token {
            b"blob" => ObjectType::Blob,
            b"tree" => ObjectType::Tree,
            b"commit" => ObjectType::Commit,
            _ => ObjectType::Invalid,
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
