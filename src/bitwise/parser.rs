// Parser combinators using nom for record text and fixed-width payload fields

use crate::error::{HexError, Result};
use nom::{
    bytes::complete::{take, take_while_m_n},
    error::{Error, ErrorKind},
    IResult,
};

/// Parse one byte written as two hexadecimal digits
pub fn hex_byte(input: &str) -> IResult<&str, u8> {
    let (rest, digits) = take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit())(input)?;
    let value = u8::from_str_radix(digits, 16)
        .map_err(|_| nom::Err::Error(Error::new(input, ErrorKind::HexDigit)))?;
    Ok((rest, value))
}

/// Parse hexadecimal byte pairs until the input is exhausted
pub fn hex_bytes(mut input: &str) -> IResult<&str, Vec<u8>> {
    let mut bytes = Vec::with_capacity(input.len() / 2);
    while !input.is_empty() {
        let (rest, value) = hex_byte(input)?;
        bytes.push(value);
        input = rest;
    }
    Ok((input, bytes))
}

/// Decode a whole string of hexadecimal byte pairs
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    match hex_bytes(text) {
        Ok((_, bytes)) => Ok(bytes),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = text.len() - e.input.len();
            Err(HexError::value(format!(
                "Invalid hexadecimal pair at offset {}: {:?}",
                offset,
                e.input.chars().take(2).collect::<String>()
            )))
        }
        Err(nom::Err::Incomplete(_)) => Err(HexError::value("Incomplete hexadecimal data")),
    }
}

/// Parse a u16 big-endian
pub fn parse_u16_be(input: &[u8]) -> IResult<&[u8], u16> {
    let (input, bytes) = take(2usize)(input)?;
    Ok((input, u16::from_be_bytes([bytes[0], bytes[1]])))
}

/// Parse a u32 big-endian
pub fn parse_u32_be(input: &[u8]) -> IResult<&[u8], u32> {
    let (input, bytes) = take(4usize)(input)?;
    Ok((
        input,
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    ))
}
