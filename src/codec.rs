use bytes::{Buf, BytesMut};
use std::io;
use tokio_util::codec::Decoder;

/// Decodes a byte stream in any `encoding_rs` encoding into UTF-8 text chunks.
///
/// A leading BOM is sniffed and removed; malformed input becomes U+FFFD.
pub struct Transcoder {
    decoder: encoding_rs::Decoder,
    flushed: bool,
}

impl Transcoder {
    pub fn new(encoding: &'static encoding_rs::Encoding) -> Self {
        Self {
            decoder: encoding.new_decoder(),
            flushed: false,
        }
    }

    fn capacity_for(&self, len: usize) -> usize {
        self.decoder
            .max_utf8_buffer_length(len)
            .unwrap_or_else(|| len * 3 + 16)
    }
}

impl Decoder for Transcoder {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut out = String::with_capacity(self.capacity_for(src.len()));
        let (_result, bytes_read, _had_replacements) =
            self.decoder.decode_to_string(src, &mut out, false);
        src.advance(bytes_read);

        // Partial sequences stay buffered inside the decoder until more input arrives.
        if out.is_empty() {
            return Ok(None);
        }
        Ok(Some(out))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.flushed {
            return Ok(None);
        }
        self.flushed = true;

        let mut out = String::with_capacity(self.capacity_for(buf.len()));
        let (_result, _bytes_read, _had_replacements) =
            self.decoder.decode_to_string(buf, &mut out, true);
        buf.clear();

        if out.is_empty() {
            Ok(None)
        } else {
            Ok(Some(out))
        }
    }
}
