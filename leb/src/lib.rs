use std::io::{self, ErrorKind, Read, Write};

use thiserror::Error;

const CONTINUE_MASK: u8 = 0x80;
const VALUE_MASK: u8 = 0x7F;
const SIGN_MASK: u8 = 0x40;

/*
A LEB128 variable-length integer, limited to N bits (i.e., the values [0, 2^N-1]),
represented by at most ceil(N/7) bytes that may contain padding 0x80 bytes.

Signed integers are the two's complement form of the same thing, the top bit of the
last group (0x40) tells the reader which way to extend.
*/

#[derive(Debug, Error)]
pub enum Error {
    #[error("integer does not fit in {bits} bits")]
    IntegerRange { bits: u32 },
    #[error("unexpected end of input while reading LEB128 integer")]
    UnexpectedEndOfInput,
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        match err.kind() {
            ErrorKind::UnexpectedEof => Error::UnexpectedEndOfInput,
            _ => Error::Io(err),
        }
    }
}

fn next_byte<R: Read + ?Sized>(reader: &mut R) -> Result<u8, Error> {
    let mut byte = [0u8; 1];
    loop {
        return match reader.read(&mut byte) {
            Ok(0) => Err(Error::UnexpectedEndOfInput),
            Ok(_) => Ok(byte[0]),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => Err(e.into()),
        };
    }
}

pub fn push_unsigned(out: &mut Vec<u8>, mut value: u64) -> usize {
    let start = out.len();
    loop {
        let byte = value as u8 & VALUE_MASK;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | CONTINUE_MASK);
    }
    out.len() - start
}

pub fn push_signed(out: &mut Vec<u8>, mut value: i64) -> usize {
    let start = out.len();
    loop {
        let byte = value as u8 & VALUE_MASK;
        // arithmetic shift, keeps the sign
        value >>= 7;
        let done = (value == 0 && byte & SIGN_MASK == 0) || (value == -1 && byte & SIGN_MASK != 0);
        if done {
            out.push(byte);
            break;
        }
        out.push(byte | CONTINUE_MASK);
    }
    out.len() - start
}

pub fn encode_unsigned(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    push_unsigned(&mut out, value);
    out
}

pub fn encode_signed(value: i64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    push_signed(&mut out, value);
    out
}

pub fn decode_unsigned(mut bytes: &[u8]) -> Result<u64, Error> {
    bytes.read_varuint(64)
}

pub fn decode_signed(mut bytes: &[u8]) -> Result<i64, Error> {
    bytes.read_varint(64)
}

pub trait ReadLEB {
    /// Reads an unsigned integer of at most `bits` bits.
    fn read_varuint(&mut self, bits: u32) -> Result<u64, Error>;

    /// Reads a signed integer of at most `bits` bits, sign-extended to 64.
    fn read_varint(&mut self, bits: u32) -> Result<i64, Error>;
}

impl<R: Read + ?Sized> ReadLEB for R {
    fn read_varuint(&mut self, bits: u32) -> Result<u64, Error> {
        assert!(bits > 0 && bits <= 64);
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = next_byte(self)?;
            if shift >= bits {
                // Continue flag present beyond max bits to read.
                return Err(Error::IntegerRange { bits });
            }
            let value = (byte & VALUE_MASK) as u64;
            let remaining = bits - shift;
            if remaining < 7 && value >> remaining != 0 {
                return Err(Error::IntegerRange { bits });
            }
            result |= value << shift;
            if byte & CONTINUE_MASK == 0 {
                break;
            }
            shift += 7;
        }
        Ok(result)
    }

    fn read_varint(&mut self, bits: u32) -> Result<i64, Error> {
        assert!(bits > 0 && bits <= 64);
        let mut result: i64 = 0;
        let mut shift = 0;
        loop {
            let byte = next_byte(self)?;
            if shift >= bits {
                return Err(Error::IntegerRange { bits });
            }
            // the tenth byte of a varint64 carries bit 63 and the sign extension only
            if shift == 63 && byte != 0x00 && byte != VALUE_MASK {
                return Err(Error::IntegerRange { bits });
            }
            result |= ((byte & VALUE_MASK) as i64) << shift;
            shift += 7;
            if byte & CONTINUE_MASK == 0 {
                if shift < 64 && byte & SIGN_MASK != 0 {
                    result |= -1i64 << shift;
                }
                break;
            }
        }
        if bits < 64 {
            let max = (1i64 << (bits - 1)) - 1;
            let min = -(1i64 << (bits - 1));
            if result < min || result > max {
                return Err(Error::IntegerRange { bits });
            }
        }
        Ok(result)
    }
}

pub trait WriteLEB {
    fn write_varuint(&mut self, value: u64) -> io::Result<usize>;

    fn write_varint(&mut self, value: i64) -> io::Result<usize>;
}

impl<W: Write + ?Sized> WriteLEB for W {
    fn write_varuint(&mut self, value: u64) -> io::Result<usize> {
        let bytes = encode_unsigned(value);
        self.write_all(&bytes)?;
        Ok(bytes.len())
    }

    fn write_varint(&mut self, value: i64) -> io::Result<usize> {
        let bytes = encode_signed(value);
        self.write_all(&bytes)?;
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn test_varuint(max: u32, to_read: Vec<u8>) -> Result<u64, Error> {
        let mut c = Cursor::new(to_read);
        c.read_varuint(max)
    }

    fn test_varint(max: u32, to_read: Vec<u8>) -> Result<i64, Error> {
        let mut c = Cursor::new(to_read);
        c.read_varint(max)
    }

    #[test]
    fn test_varuint_does_read() {
        assert_eq!(test_varuint(1, vec![0]).unwrap(), 0);
        assert_eq!(test_varuint(1, vec![1]).unwrap(), 1);
        assert_eq!(test_varuint(7, vec![1]).unwrap(), 1);
        assert_eq!(test_varuint(7, vec![7]).unwrap(), 7);
        assert_eq!(test_varuint(7, vec![127]).unwrap(), 127);
        assert_eq!(test_varuint(32, vec![0xff, 0xff, 0xff, 0xff, 0x0f]).unwrap(), u32::MAX as u64);
    }

    #[test]
    fn test_varuint_doesnt_read() {
        assert!(matches!(test_varuint(1, vec![7]), Err(Error::IntegerRange { bits: 1 })));
        // fifth byte may only carry four more bits
        assert!(matches!(
            test_varuint(32, vec![0xff, 0xff, 0xff, 0xff, 0x1f]),
            Err(Error::IntegerRange { bits: 32 })
        ));
        assert!(matches!(
            test_varuint(32, vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x00]),
            Err(Error::IntegerRange { bits: 32 })
        ));
    }

    #[test]
    fn unsigned_runs_off_the_end() {
        assert!(matches!(test_varuint(32, vec![]), Err(Error::UnexpectedEndOfInput)));
        assert!(matches!(test_varuint(32, vec![0x80, 0x80]), Err(Error::UnexpectedEndOfInput)));
        assert!(matches!(test_varint(32, vec![0xff]), Err(Error::UnexpectedEndOfInput)));
    }

    #[test]
    fn unsigned_reads_500_32() {
        let buff = vec![
            0b1111_0100u8,
            0b0000_0011u8,
        ];
        assert_eq!(test_varuint(32, buff).unwrap(), 500);
    }

    #[test]
    fn unsigned_reads_padded() {
        // 0x80 padding is allowed within the width
        assert_eq!(test_varuint(32, vec![0x81, 0x80, 0x00]).unwrap(), 1);
    }

    #[test]
    fn encode_unsigned_300() {
        assert_eq!(encode_unsigned(300), vec![0xAC, 0x02]);
        assert_eq!(encode_unsigned(0), vec![0x00]);
        assert_eq!(encode_unsigned(127), vec![0x7f]);
        assert_eq!(encode_unsigned(128), vec![0x80, 0x01]);
    }

    #[test]
    fn encode_signed_small() {
        assert_eq!(encode_signed(-1), vec![0x7F]);
        assert_eq!(encode_signed(63), vec![0x3f]);
        assert_eq!(encode_signed(64), vec![0xc0, 0x00]);
        assert_eq!(encode_signed(-64), vec![0x40]);
        assert_eq!(encode_signed(-65), vec![0xbf, 0x7f]);
        assert_eq!(encode_signed(-123456), vec![0xc0, 0xbb, 0x78]);
    }

    #[test]
    fn signed_reads_1() {
        assert_eq!(test_varint(32, vec![1]).unwrap(), 1);
        assert_eq!(test_varint(32, vec![0x7f]).unwrap(), -1);
        assert_eq!(test_varint(32, vec![0xc0, 0xbb, 0x78]).unwrap(), -123456);
    }

    #[test]
    fn signed_range_is_checked() {
        assert_eq!(
            test_varint(32, vec![0x80, 0x80, 0x80, 0x80, 0x78]).unwrap(),
            i32::MIN as i64
        );
        // 2^31 does not fit in a varint32
        assert!(matches!(
            test_varint(32, vec![0x80, 0x80, 0x80, 0x80, 0x08]),
            Err(Error::IntegerRange { bits: 32 })
        ));

        let mut too_big = vec![0x80; 9];
        too_big.push(0x01);
        assert!(matches!(test_varint(64, too_big), Err(Error::IntegerRange { bits: 64 })));
        let mut stray_bits = vec![0x80; 9];
        stray_bits.push(0x7e);
        assert!(matches!(test_varint(64, stray_bits), Err(Error::IntegerRange { bits: 64 })));
        let mut min = vec![0x80; 9];
        min.push(0x7f);
        assert_eq!(test_varint(64, min).unwrap(), i64::MIN);
    }

    #[test]
    fn writers_report_length() {
        let mut out = vec![];
        assert_eq!(out.write_varuint(624485).unwrap(), 3);
        assert_eq!(out, vec![0xe5, 0x8e, 0x26]);
        let mut out = vec![];
        assert_eq!(out.write_varint(i64::MIN).unwrap(), 10);
        assert_eq!(decode_signed(&out).unwrap(), i64::MIN);
    }

    proptest! {
        #[test]
        fn unsigned_round_trips(n in any::<u32>()) {
            let bytes = encode_unsigned(n as u64);
            prop_assert!(bytes.len() <= 5);
            prop_assert_eq!(Cursor::new(bytes).read_varuint(32).unwrap(), n as u64);
        }

        #[test]
        fn unsigned_64_round_trips(n in any::<u64>()) {
            prop_assert_eq!(decode_unsigned(&encode_unsigned(n)).unwrap(), n);
        }

        #[test]
        fn signed_round_trips(n in any::<i32>()) {
            let bytes = encode_signed(n as i64);
            prop_assert_eq!(Cursor::new(bytes).read_varint(32).unwrap(), n as i64);
        }

        #[test]
        fn signed_64_round_trips(n in any::<i64>()) {
            prop_assert_eq!(decode_signed(&encode_signed(n)).unwrap(), n);
        }
    }
}
