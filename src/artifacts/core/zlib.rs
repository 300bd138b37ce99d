use crate::errors::{Error, Result};
use std::io::{Read, Write};

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;

    Ok(encoder.finish()?)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::malformed("zlib stream", e.to_string()))?;

    Ok(decompressed)
}

/// Decompress the zlib stream at the front of `data`
///
/// Streams carry no length prefix, so running the decompressor to the end of
/// the stream is the only way to learn where the next record starts.
///
/// # Returns
///
/// The decompressed bytes and the number of compressed bytes consumed
pub fn decompress_prefix(data: &[u8]) -> Result<(Vec<u8>, usize)> {
    let mut decoder = flate2::bufread::ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::malformed("zlib stream", e.to_string()))?;

    Ok((decompressed, decoder.total_in() as usize))
}
