//! Binary payload reading utilities.
//!
//! This module provides bounds-checked little-endian reads over record payloads
//! and the [`FieldReader`] cursor used by every record decoder. No read ever
//! returns data past the end of the slice: underflow is reported as
//! [`BinaryError::InsufficientData`].

use encoding_rs::UTF_16LE;
use thiserror::Error;
use zerocopy::{F64, FromBytes, I16, I32, LE, U16, U32};

/// Largest character count accepted for a length-prefixed string.
pub const MAX_STRING_CHARS: u32 = 0x3FFF_FFFF;

/// Binary parsing error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    #[error("Insufficient data: expected {expected}, got {available}")]
    InsufficientData { expected: usize, available: usize },
    /// String character count outside the representable range
    #[error("Invalid string length: {0} characters")]
    InvalidStringLength(u32),
}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

#[inline]
fn window(data: &[u8], offset: usize, width: usize) -> BinaryResult<&[u8]> {
    let end = offset.checked_add(width).ok_or(BinaryError::InsufficientData {
        expected: usize::MAX,
        available: data.len(),
    })?;
    data.get(offset..end).ok_or(BinaryError::InsufficientData {
        expected: end,
        available: data.len(),
    })
}

/// Read a little-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use binsheet::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> BinaryResult<u16> {
    let bytes = window(data, offset, 2)?;
    Ok(U16::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use binsheet::common::binary::read_u32_le;
/// let data = [0x78, 0x56, 0x34, 0x12];
/// assert_eq!(read_u32_le(&data, 0).unwrap(), 0x12345678);
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    let bytes = window(data, offset, 4)?;
    Ok(U32::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian i16 from a byte slice at the given offset.
#[inline]
pub fn read_i16_le(data: &[u8], offset: usize) -> BinaryResult<i16> {
    let bytes = window(data, offset, 2)?;
    Ok(I16::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian i32 from a byte slice at the given offset.
#[inline]
pub fn read_i32_le(data: &[u8], offset: usize) -> BinaryResult<i32> {
    let bytes = window(data, offset, 4)?;
    Ok(I32::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian f64 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use binsheet::common::binary::read_f64_le;
/// let data = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0x3F];
/// assert!((read_f64_le(&data, 0).unwrap() - 1.0).abs() < f64::EPSILON);
/// ```
#[inline]
pub fn read_f64_le(data: &[u8], offset: usize) -> BinaryResult<f64> {
    let bytes = window(data, offset, 8)?;
    Ok(F64::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Decode the packed 4-byte numeric ("RK") encoding.
///
/// Bit 1 selects the integer path (arithmetic shift right by two); otherwise
/// the value is the high half of a double whose low 32 bits are zero. Bit 0
/// divides the result by 100.
#[inline]
pub fn decode_rk(raw: i32) -> f64 {
    let value = if raw & 0x02 != 0 {
        (raw >> 2) as f64
    } else {
        f64::from_bits(((raw as u32 & 0xFFFF_FFFC) as u64) << 32)
    };
    if raw & 0x01 != 0 { value / 100.0 } else { value }
}

/// Sequential typed cursor over one record payload.
///
/// Every read checks the remaining length first; a failed read leaves the
/// cursor where it was.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Create a reader positioned at the start of `data`.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        FieldReader { data, pos: 0 }
    }

    /// Current offset from the start of the payload.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    fn take(&mut self, n: usize) -> BinaryResult<&'a [u8]> {
        let bytes = window(self.data, self.pos, n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Advance past `n` bytes.
    #[inline]
    pub fn skip(&mut self, n: usize) -> BinaryResult<()> {
        self.take(n).map(|_| ())
    }

    #[inline]
    pub fn read_u8(&mut self) -> BinaryResult<u8> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> BinaryResult<u16> {
        let v = read_u16_le(self.data, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    #[inline]
    pub fn read_u32(&mut self) -> BinaryResult<u32> {
        let v = read_u32_le(self.data, self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    #[inline]
    pub fn read_i8(&mut self) -> BinaryResult<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    #[inline]
    pub fn read_i16(&mut self) -> BinaryResult<i16> {
        let v = read_i16_le(self.data, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    #[inline]
    pub fn read_i32(&mut self) -> BinaryResult<i32> {
        let v = read_i32_le(self.data, self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    #[inline]
    pub fn read_f64(&mut self) -> BinaryResult<f64> {
        let v = read_f64_le(self.data, self.pos)?;
        self.pos += 8;
        Ok(v)
    }

    /// Read a packed 4-byte numeric value. See [`decode_rk`].
    #[inline]
    pub fn read_rk(&mut self) -> BinaryResult<f64> {
        self.read_i32().map(decode_rk)
    }

    /// Read a `u32` character count followed by that many UTF-16LE code units.
    ///
    /// Unpaired surrogates decode to U+FFFD. On error the cursor is not moved.
    pub fn read_string(&mut self) -> BinaryResult<String> {
        let start = self.pos;
        let count = self.read_u32()?;
        if count > MAX_STRING_CHARS {
            self.pos = start;
            return Err(BinaryError::InvalidStringLength(count));
        }
        match self.take(count as usize * 2) {
            Ok(units) => Ok(UTF_16LE
                .decode_without_bom_handling(units)
                .0
                .into_owned()),
            Err(e) => {
                self.pos = start;
                Err(e)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(s: &str) -> Vec<u8> {
        let units: Vec<u16> = s.encode_utf16().collect();
        let mut out = (units.len() as u32).to_le_bytes().to_vec();
        for u in units {
            out.extend_from_slice(&u.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_fixed_width_reads() {
        let data = [0xAB, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut r = FieldReader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 0xAB);
        assert_eq!(r.read_u16().unwrap(), 1);
        assert_eq!(r.read_i32().unwrap(), -1);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_underflow_is_explicit() {
        let data = [0x01, 0x02, 0x03];
        let mut r = FieldReader::new(&data);
        assert_eq!(
            r.read_u32(),
            Err(BinaryError::InsufficientData {
                expected: 4,
                available: 3
            })
        );
        // Cursor unchanged after a failed read
        assert_eq!(r.position(), 0);
        assert!(r.skip(4).is_err());
        assert!(r.skip(3).is_ok());
        assert!(r.read_u8().is_err());
    }

    #[test]
    fn test_read_f64() {
        let data = 42.0f64.to_le_bytes();
        let mut r = FieldReader::new(&data);
        assert_eq!(r.read_f64().unwrap(), 42.0);
    }

    #[test]
    fn test_signed_narrow_reads() {
        let data = [0xFE, 0x00, 0x80, 0xFF, 0x7F];
        let mut r = FieldReader::new(&data);
        assert_eq!(r.read_i8().unwrap(), -2);
        assert_eq!(r.read_i16().unwrap(), i16::MIN);
        assert_eq!(r.read_i16().unwrap(), 0x7FFF);
        assert_eq!(r.remaining(), 0);
        assert_eq!(read_i16_le(&[0x01, 0x80], 0).unwrap(), -32767);
    }

    #[test]
    fn test_signed_narrow_underflow() {
        let mut r = FieldReader::new(&[]);
        assert_eq!(
            r.read_i8(),
            Err(BinaryError::InsufficientData {
                expected: 1,
                available: 0
            })
        );

        let data = [0x01];
        let mut r = FieldReader::new(&data);
        assert_eq!(
            r.read_i16(),
            Err(BinaryError::InsufficientData {
                expected: 2,
                available: 1
            })
        );
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_i8().unwrap(), 1);
    }

    #[test]
    fn test_rk_integer_path() {
        // 1 << 2 with the integer flag
        assert_eq!(decode_rk((1 << 2) | 0x02), 1.0);
        // Arithmetic shift keeps the sign
        assert_eq!(decode_rk((-5 << 2) | 0x02), -5.0);
        // Integer path divided by 100
        assert_eq!(decode_rk((1234 << 2) | 0x03), 12.34);
    }

    #[test]
    fn test_rk_float_path() {
        let hi = (1.0f64.to_bits() >> 32) as u32;
        assert_eq!(decode_rk(hi as i32), 1.0);
        assert_eq!(decode_rk((hi | 0x01) as i32), 0.01);
        let neg = ((-2.5f64).to_bits() >> 32) as u32;
        assert_eq!(decode_rk(neg as i32), -2.5);
    }

    #[test]
    fn test_read_string() {
        let data = wide("Hi");
        let mut r = FieldReader::new(&data);
        assert_eq!(r.read_string().unwrap(), "Hi");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_read_string_truncated_does_not_move() {
        let mut data = wide("Hello");
        data.truncate(7);
        let mut r = FieldReader::new(&data);
        assert!(r.read_string().is_err());
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_read_string_rejects_huge_count() {
        let data = 0x4000_0000u32.to_le_bytes();
        let mut r = FieldReader::new(&data);
        assert_eq!(
            r.read_string(),
            Err(BinaryError::InvalidStringLength(0x4000_0000))
        );
    }

    #[test]
    fn test_read_string_lone_surrogate() {
        let mut data = 1u32.to_le_bytes().to_vec();
        data.extend_from_slice(&0xD800u16.to_le_bytes());
        let mut r = FieldReader::new(&data);
        assert_eq!(r.read_string().unwrap(), "\u{FFFD}");
    }
}
