//! Runtime input parsing for `in` and `get`.

use std::io::{self, BufRead};

/// Look at the next byte without consuming it.
fn peek_byte<R: BufRead>(input: &mut R) -> io::Result<Option<u8>> {
    loop {
        match input.fill_buf() {
            Ok(buf) => return Ok(buf.first().copied()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Read one raw byte. `Ok(None)` at end of input.
pub(crate) fn read_byte<R: BufRead>(input: &mut R) -> io::Result<Option<u8>> {
    let byte = peek_byte(input)?;
    if byte.is_some() {
        input.consume(1);
    }
    Ok(byte)
}

/// Read a whitespace-delimited signed decimal integer.
///
/// Leading whitespace is skipped. Returns `Ok(None)` if the input ends
/// before any other byte. The byte that terminates the number is left
/// unread. A missing digit sequence or a value outside `i32` is reported
/// as [`io::ErrorKind::InvalidData`].
pub(crate) fn read_integer<R: BufRead>(input: &mut R) -> io::Result<Option<i32>> {
    while let Some(byte) = peek_byte(input)? {
        if !byte.is_ascii_whitespace() {
            break;
        }
        input.consume(1);
    }

    let negative = match peek_byte(input)? {
        None => return Ok(None),
        Some(b'-') => {
            input.consume(1);
            true
        }
        Some(b'+') => {
            input.consume(1);
            false
        }
        Some(_) => false,
    };

    let mut magnitude: i64 = 0;
    let mut digits = 0usize;
    while let Some(byte) = peek_byte(input)? {
        if !byte.is_ascii_digit() {
            break;
        }
        input.consume(1);
        digits += 1;
        // Saturate past the i32 range; the range check below rejects it.
        magnitude = magnitude
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if digits == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "expected a decimal integer",
        ));
    }

    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value)
        .map(Some)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "integer out of range"))
}
