//! Block codecs

use std::io::{self, Read};

use bzip2::read::MultiBzDecoder;

/// Compression applied to data blocks and secondary index blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockCodec {
    /// bzip2 streams (the format's native codec)
    #[default]
    Bzip2,
    /// Stored as-is
    Raw,
}

impl BlockCodec {
    pub fn decompress(self, input: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            BlockCodec::Bzip2 => {
                let mut out = Vec::with_capacity(input.len() * 4);
                MultiBzDecoder::new(input).read_to_end(&mut out)?;
                Ok(out)
            }
            BlockCodec::Raw => Ok(input.to_vec()),
        }
    }
}
