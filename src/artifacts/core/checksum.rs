use crate::artifacts::objects::OBJECT_ID_SIZE;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use sha1::{Digest, Sha1};
use std::io::Write;

/// Writer that digests everything passing through it
///
/// Index and pack files both end with the SHA-1 of every preceding byte;
/// `write_checksum` appends that trailer.
#[derive(Debug)]
pub struct Checksum<W> {
    inner: W,
    digest: Sha1,
    written: u64,
}

impl<W: Write> Checksum<W> {
    pub fn new(inner: W) -> Self {
        Checksum {
            inner,
            digest: Sha1::new(),
            written: 0,
        }
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.digest.update(data);
        self.written += data.len() as u64;

        Ok(())
    }

    /// Number of bytes written so far, trailer excluded
    pub fn position(&self) -> u64 {
        self.written
    }

    /// Append the digest of everything written so far
    ///
    /// # Returns
    ///
    /// The inner writer and the digest that was appended
    pub fn write_checksum(mut self) -> Result<(W, ObjectId)> {
        let checksum: [u8; OBJECT_ID_SIZE] = self.digest.finalize().into();
        self.inner.write_all(&checksum)?;
        self.inner.flush()?;

        Ok((self.inner, ObjectId::from_bytes(checksum)))
    }
}

/// Split a buffer into its body and trailing digest, checking one against the other
///
/// # Returns
///
/// The body (every byte before the trailer) and the trailer digest
pub fn verify<'b>(bytes: &'b [u8], what: &'static str) -> Result<(&'b [u8], ObjectId)> {
    if bytes.len() < OBJECT_ID_SIZE {
        return Err(Error::ChecksumMismatch { what });
    }

    let (body, trailer) = bytes.split_at(bytes.len() - OBJECT_ID_SIZE);
    let expected = ObjectId::try_from_slice(trailer)?;

    if ObjectId::hash(body) != expected {
        return Err(Error::ChecksumMismatch { what });
    }

    Ok((body, expected))
}
