// Helper functions for reading JDWP data types from buffers

use bytes::Buf;
use crate::protocol::{JdwpError, JdwpResult};

/// Read a JDWP string (4-byte length prefix + UTF-8 bytes)
pub fn read_string(buf: &mut &[u8]) -> JdwpResult<String> {
    let len = read_u32(buf)? as usize;

    if buf.remaining() < len {
        return Err(JdwpError::Protocol(format!(
            "Not enough data for string: expected {}, got {}",
            len,
            buf.remaining()
        )));
    }

    let bytes = &buf[..len];
    buf.advance(len);

    String::from_utf8(bytes.to_vec())
        .map_err(|e| JdwpError::Protocol(format!("Invalid UTF-8 in string: {}", e)))
}

/// Read a u32
pub fn read_u32(buf: &mut &[u8]) -> JdwpResult<u32> {
    if buf.remaining() < 4 {
        return Err(JdwpError::Protocol("Not enough data for u32".to_string()));
    }
    Ok(buf.get_u32())
}

/// Read a i32
pub fn read_i32(buf: &mut &[u8]) -> JdwpResult<i32> {
    if buf.remaining() < 4 {
        return Err(JdwpError::Protocol("Not enough data for i32".to_string()));
    }
    Ok(buf.get_i32())
}

/// Read a repeat count for entries of at least `min_entry_size` bytes
///
/// A count the remaining data can't hold is rejected before anything is
/// allocated for it.
pub fn read_count(buf: &mut &[u8], min_entry_size: usize) -> JdwpResult<usize> {
    let count = read_i32(buf)?;
    if count < 0 {
        return Err(JdwpError::Protocol(format!("Invalid count: {}", count)));
    }

    let count = count as usize;
    let needed = count.saturating_mul(min_entry_size);
    if needed > buf.remaining() {
        return Err(JdwpError::Protocol(format!(
            "Count {} needs at least {} bytes, got {}",
            count,
            needed,
            buf.remaining()
        )));
    }

    Ok(count)
}

/// Read a u8
pub fn read_u8(buf: &mut &[u8]) -> JdwpResult<u8> {
    if buf.remaining() < 1 {
        return Err(JdwpError::Protocol("Not enough data for u8".to_string()));
    }
    Ok(buf.get_u8())
}

/// Read a u64
pub fn read_u64(buf: &mut &[u8]) -> JdwpResult<u64> {
    if buf.remaining() < 8 {
        return Err(JdwpError::Protocol("Not enough data for u64".to_string()));
    }
    Ok(buf.get_u64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_string_checks_length() {
        let data = [0u8, 0, 0, 5, b'a', b'b'];
        let mut buf = &data[..];
        assert!(read_string(&mut buf).is_err());

        let data = [0u8, 0, 0, 2, b'o', b'k', 9];
        let mut buf = &data[..];
        assert_eq!(read_string(&mut buf).unwrap(), "ok");
        assert_eq!(buf, &[9]);
    }

    #[test]
    fn test_read_count_bounded_by_remaining_data() {
        let data = [0u8, 0, 0, 2, 1, 2, 3, 4, 5, 6, 7, 8];
        let mut buf = &data[..];
        assert_eq!(read_count(&mut buf, 4).unwrap(), 2);
        assert_eq!(buf.len(), 8);

        let mut buf = &data[..];
        assert!(read_count(&mut buf, 8).is_err());

        let huge = [0x7fu8, 0xff, 0xff, 0xff];
        let mut buf = &huge[..];
        assert!(matches!(read_count(&mut buf, 1), Err(JdwpError::Protocol(_))));

        let negative = [0xffu8, 0xff, 0xff, 0xff];
        let mut buf = &negative[..];
        assert!(read_count(&mut buf, 1).is_err());
    }
}
