//! Bit Cursor: akses bit-granular ke fixed buffer
//!
//! Satu posisi dalam BITS yang naik monoton di atas sebuah byte buffer.
//! Field ditulis/dibaca MSB-first, satu bit per iterasi. Byte ops
//! (payload) mensyaratkan cursor sudah byte-aligned - kontrak ini yang
//! memaksa struktur "header dulu, payload kemudian" di level interface.
//!
//! Invariant: `0 <= bitpos <= cap_bytes * 8`.

use super::error::{DbinError, Result};

#[inline(always)]
fn check_nbits(nbits: u32) -> Result<()> {
    if nbits == 0 || nbits > 32 {
        return Err(DbinError::InvalidParameter);
    }
    Ok(())
}

/// Write cursor di atas `&mut [u8]`.
pub struct BitWriter<'a> {
    buf: &'a mut [u8],
    bitpos: usize,
}

impl<'a> BitWriter<'a> {
    #[inline(always)]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, bitpos: 0 }
    }

    /// Tulis `nbits` bit terendah dari `value`, MSB-first.
    ///
    /// `nbits` harus di [1, 32]. Gagal `BufferInsufficient` jika
    /// `bitpos + nbits` melewati kapasitas.
    pub fn write_bits(&mut self, value: u32, nbits: u32) -> Result<()> {
        check_nbits(nbits)?;
        if self.bitpos + nbits as usize > self.buf.len() * 8 {
            return Err(DbinError::BufferInsufficient);
        }

        for i in 0..nbits {
            let bit = (value >> (nbits - 1 - i)) & 1;

            let byte = self.bitpos / 8;
            let bit_in_byte = 7 - (self.bitpos % 8) as u32;

            if bit != 0 {
                self.buf[byte] |= 1 << bit_in_byte;
            } else {
                self.buf[byte] &= !(1 << bit_in_byte);
            }

            self.bitpos += 1;
        }
        Ok(())
    }

    /// Majukan cursor ke byte boundary berikutnya (no-op jika sudah aligned).
    pub fn align_to_byte(&mut self) -> Result<()> {
        let rem = self.bitpos % 8;
        if rem == 0 {
            return Ok(());
        }
        let add = 8 - rem;
        if self.bitpos + add > self.buf.len() * 8 {
            return Err(DbinError::BufferInsufficient);
        }
        self.bitpos += add;
        Ok(())
    }

    /// Bulk write byte-granular. Cursor HARUS sudah byte-aligned.
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        if self.bitpos % 8 != 0 {
            return Err(DbinError::FormatViolation);
        }
        let byte_pos = self.bitpos / 8;
        if byte_pos + src.len() > self.buf.len() {
            return Err(DbinError::BufferInsufficient);
        }
        self.buf[byte_pos..byte_pos + src.len()].copy_from_slice(src);
        self.bitpos += src.len() * 8;
        Ok(())
    }

    /// Bytes terpakai sejauh ini: ceil(bitpos / 8).
    #[inline(always)]
    pub fn bytes_used(&self) -> usize {
        (self.bitpos + 7) / 8
    }

    #[inline(always)]
    pub fn bit_pos(&self) -> usize {
        self.bitpos
    }
}

/// Read cursor di atas `&[u8]`. Lifetime `'a` mengikat hasil
/// `read_bytes` ke input buffer (zero-copy).
pub struct BitReader<'a> {
    buf: &'a [u8],
    bitpos: usize,
}

impl<'a> BitReader<'a> {
    #[inline(always)]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, bitpos: 0 }
    }

    /// Baca `nbits` bit MSB-first. Check yang sama dengan `write_bits`.
    pub fn read_bits(&mut self, nbits: u32) -> Result<u32> {
        check_nbits(nbits)?;
        if self.bitpos + nbits as usize > self.buf.len() * 8 {
            return Err(DbinError::BufferInsufficient);
        }

        let mut value = 0u32;
        for _ in 0..nbits {
            let byte = self.bitpos / 8;
            let bit_in_byte = 7 - (self.bitpos % 8) as u32;
            let bit = (self.buf[byte] >> bit_in_byte) & 1;

            value = (value << 1) | bit as u32;
            self.bitpos += 1;
        }
        Ok(value)
    }

    /// Majukan cursor ke byte boundary berikutnya (no-op jika sudah aligned).
    pub fn align_to_byte(&mut self) -> Result<()> {
        let rem = self.bitpos % 8;
        if rem == 0 {
            return Ok(());
        }
        let add = 8 - rem;
        if self.bitpos + add > self.buf.len() * 8 {
            return Err(DbinError::BufferInsufficient);
        }
        self.bitpos += add;
        Ok(())
    }

    /// Bulk read: kembalikan subslice `n` bytes dari input (zero-copy).
    /// Cursor HARUS sudah byte-aligned.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.bitpos % 8 != 0 {
            return Err(DbinError::FormatViolation);
        }
        let byte_pos = self.bitpos / 8;
        if byte_pos + n > self.buf.len() {
            return Err(DbinError::BufferInsufficient);
        }
        let out = &self.buf[byte_pos..byte_pos + n];
        self.bitpos += n * 8;
        Ok(out)
    }

    /// Bytes terpakai sejauh ini: ceil(bitpos / 8).
    #[inline(always)]
    pub fn bytes_used(&self) -> usize {
        (self.bitpos + 7) / 8
    }

    #[inline(always)]
    pub fn bit_pos(&self) -> usize {
        self.bitpos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_across_byte_boundary() {
        let mut buf = [0u8; 4];
        let mut w = BitWriter::new(&mut buf);
        w.write_bits(0xDB1, 12).unwrap();
        w.write_bits(0x1, 4).unwrap();
        w.write_bits(0b101, 3).unwrap();
        assert_eq!(w.bit_pos(), 19);

        let mut r = BitReader::new(&buf);
        assert_eq!(r.read_bits(12).unwrap(), 0xDB1);
        assert_eq!(r.read_bits(4).unwrap(), 0x1);
        assert_eq!(r.read_bits(3).unwrap(), 0b101);
    }

    #[test]
    fn test_msb_first_layout() {
        let mut buf = [0u8; 2];
        let mut w = BitWriter::new(&mut buf);
        // 0xDB1 = 1101 1011 0001 -> byte0 harus 0xDB
        w.write_bits(0xDB1, 12).unwrap();
        assert_eq!(buf[0], 0xDB);
        assert_eq!(buf[1] & 0xF0, 0x10);
    }

    #[test]
    fn test_write_clears_stale_bits() {
        // Buffer kotor: encode harus tetap deterministik per-bit
        let mut buf = [0xFFu8; 2];
        let mut w = BitWriter::new(&mut buf);
        w.write_bits(0, 8).unwrap();
        assert_eq!(buf[0], 0x00);
        assert_eq!(buf[1], 0xFF); // belum tersentuh
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buf = [0u8; 1];
        let mut w = BitWriter::new(&mut buf);
        w.write_bits(0x3F, 6).unwrap();
        assert_eq!(w.write_bits(0x7, 3), Err(DbinError::BufferInsufficient));

        let small = [0u8; 1];
        let mut r = BitReader::new(&small);
        r.read_bits(6).unwrap();
        assert_eq!(r.read_bits(3), Err(DbinError::BufferInsufficient));
    }

    #[test]
    fn test_nbits_range() {
        let mut buf = [0u8; 8];
        let mut w = BitWriter::new(&mut buf);
        assert_eq!(w.write_bits(0, 0), Err(DbinError::InvalidParameter));
        assert_eq!(w.write_bits(0, 33), Err(DbinError::InvalidParameter));
        w.write_bits(0xDEADBEEF, 32).unwrap();

        let mut r = BitReader::new(&buf);
        assert_eq!(r.read_bits(0), Err(DbinError::InvalidParameter));
        assert_eq!(r.read_bits(32).unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn test_align_then_bytes() {
        let mut buf = [0u8; 4];
        let mut w = BitWriter::new(&mut buf);
        w.write_bits(0b11, 2).unwrap();

        // Byte ops tanpa alignment harus ditolak
        assert_eq!(w.write_bytes(b"x"), Err(DbinError::FormatViolation));

        w.align_to_byte().unwrap();
        assert_eq!(w.bit_pos(), 8);
        w.write_bytes(b"ab").unwrap();
        assert_eq!(w.bytes_used(), 3);

        let mut r = BitReader::new(&buf);
        r.read_bits(2).unwrap();
        assert_eq!(r.read_bytes(1), Err(DbinError::FormatViolation));
        r.align_to_byte().unwrap();
        assert_eq!(r.read_bytes(2).unwrap(), b"ab");
    }

    #[test]
    fn test_align_is_noop_when_aligned() {
        let mut buf = [0u8; 2];
        let mut w = BitWriter::new(&mut buf);
        w.write_bits(0xAB, 8).unwrap();
        w.align_to_byte().unwrap();
        assert_eq!(w.bit_pos(), 8);
    }

    #[test]
    fn test_bytes_used_rounds_up() {
        let mut buf = [0u8; 2];
        let mut w = BitWriter::new(&mut buf);
        assert_eq!(w.bytes_used(), 0);
        w.write_bits(0, 1).unwrap();
        assert_eq!(w.bytes_used(), 1);
        w.write_bits(0, 7).unwrap();
        assert_eq!(w.bytes_used(), 1);
        w.write_bits(0, 1).unwrap();
        assert_eq!(w.bytes_used(), 2);
    }

    #[test]
    fn test_read_bytes_is_borrowed_from_input() {
        let buf = [1u8, 2, 3, 4];
        let mut r = BitReader::new(&buf);
        let view = r.read_bytes(4).unwrap();
        assert!(std::ptr::eq(view.as_ptr(), buf.as_ptr()));
    }
}
