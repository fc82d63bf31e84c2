//! Splits a streamed newline-delimited JSON body into lines.

use std::io;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::TryStreamExt;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::io::StreamReader;

use crate::error::{Error, Result};

/// Frames `body` into lines without their `\n` (or `\r\n`) terminator.
///
/// Chunk boundaries may fall anywhere, including inside a multi-byte
/// character. An unterminated last line is yielded at end of body. Blank lines
/// are passed through for the caller to skip. A line that is not valid UTF-8
/// ends the stream with an error.
pub fn ndjson_lines<S, E>(body: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let reader = StreamReader::new(body.map_err(io::Error::other));
    FramedRead::new(reader, LinesCodec::new()).map_err(framing_error)
}

fn framing_error(e: LinesCodecError) -> Error {
    match e {
        LinesCodecError::Io(e) => Error::Io(e),
        other => Error::Io(io::Error::other(other)),
    }
}
