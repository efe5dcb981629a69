//! Codec: validate / encode / decode
//!
//! Encoder dan decoder menulis/membaca field dengan urutan wire yang
//! sama, tapi urutan CHECK-nya berbeda dan keduanya dipertahankan:
//! validate (sebelum encode) memeriksa range dulu dan magic terakhir,
//! decode memeriksa magic pertama begitu field-nya terbaca. Keduanya
//! observable lewat error yang dikembalikan, jadi jangan disatukan.

use super::bitio::{BitReader, BitWriter};
use super::error::{DbinError, Result};
use super::message::{Message, MessageType, HEADER_SIZE, MAGIC, MAX_ID, MAX_MSG_LEN, VERSION};

/// Periksa satu record terhadap invariant protokol.
///
/// Pure, tanpa I/O. Mengembalikan pelanggaran PERTAMA dalam urutan
/// tetap: range -> reserved -> identifiers -> msg_len -> struktural ->
/// payload source -> version -> magic.
pub fn validate(m: &Message<'_>) -> Result<()> {
    if m.magic > 0xFFF {
        return Err(DbinError::RangeViolation);
    }
    if m.version > 0xF {
        return Err(DbinError::RangeViolation);
    }
    if m.msg_type > 0x7 {
        return Err(DbinError::RangeViolation);
    }

    if m.reserved & 0x7 != 0 {
        return Err(DbinError::FormatViolation);
    }

    if m.user_id > MAX_ID {
        return Err(DbinError::RangeViolation);
    }
    if m.route > MAX_ID {
        return Err(DbinError::RangeViolation);
    }

    if m.msg_len as usize > MAX_MSG_LEN {
        return Err(DbinError::RangeViolation);
    }

    if MessageType::forbids_payload(m.msg_type) && m.msg_len != 0 {
        return Err(DbinError::FormatViolation);
    }
    if m.msg_len > 0 && m.payload.len() < m.msg_len as usize {
        return Err(DbinError::InvalidParameter);
    }

    if m.version != VERSION {
        return Err(DbinError::VersionMismatch);
    }
    if m.magic != MAGIC {
        return Err(DbinError::MagicMismatch);
    }

    Ok(())
}

/// Encode `m` ke `out`, return total bytes tertulis.
///
/// Region yang akan ditulis di-zero dulu supaya output deterministik
/// (termasuk pad bits 92..95) apapun isi buffer sebelumnya. Pada
/// kegagalan, prefix buffer mungkin sudah tertulis sebagian - caller
/// harus menganggap isinya invalid.
pub fn encode(m: &Message<'_>, out: &mut [u8]) -> Result<usize> {
    validate(m)?;

    let need = m.encoded_size();
    if out.len() < need {
        return Err(DbinError::BufferInsufficient);
    }
    out[..need].fill(0);

    let mut w = BitWriter::new(out);

    w.write_bits(m.magic as u32, 12)?;
    w.write_bits(m.version as u32, 4)?;
    w.write_bits(m.msg_type as u32, 3)?;
    w.write_bits(m.valid as u32, 1)?;
    w.write_bits(m.is_room as u32, 1)?;
    w.write_bits((m.reserved & 0x7) as u32, 3)?;

    w.write_bits(m.user_id, 20)?;
    w.write_bits(m.route, 20)?;
    w.write_bits(m.msg_id as u32, 16)?;
    w.write_bits(m.msg_len as u32, 12)?;

    w.align_to_byte()?;

    if m.msg_len > 0 {
        w.write_bytes(&m.payload[..m.msg_len as usize])?;
    }

    Ok(w.bytes_used())
}

/// Decode satu frame lengkap dari `input`.
///
/// Field dibaca dengan urutan wire, dengan inline check begitu tiap
/// field tersedia (magic dulu, lalu version, dst). Payload hasil decode
/// adalah borrow dari `input` - decoder tidak mengalokasi apapun.
/// Setiap panggilan independen; tidak ada dukungan partial frame.
pub fn decode(input: &[u8]) -> Result<Message<'_>> {
    if input.len() < HEADER_SIZE {
        return Err(DbinError::BufferInsufficient);
    }

    let mut r = BitReader::new(input);

    let magic = r.read_bits(12)? as u16;
    if magic != MAGIC {
        return Err(DbinError::MagicMismatch);
    }

    let version = r.read_bits(4)? as u8;
    if version != VERSION {
        return Err(DbinError::VersionMismatch);
    }

    let msg_type = r.read_bits(3)? as u8;
    let valid = r.read_bits(1)? != 0;
    let is_room = r.read_bits(1)? != 0;

    let reserved = r.read_bits(3)? as u8;
    if reserved & 0x7 != 0 {
        return Err(DbinError::FormatViolation);
    }

    let user_id = r.read_bits(20)?;
    let route = r.read_bits(20)?;
    let msg_id = r.read_bits(16)? as u16;

    let msg_len = r.read_bits(12)? as u16;
    if msg_len as usize > MAX_MSG_LEN {
        return Err(DbinError::RangeViolation);
    }

    r.align_to_byte()?;
    let payload_off = r.bytes_used();
    if payload_off > input.len() {
        return Err(DbinError::BufferInsufficient);
    }
    if msg_len as usize > input.len() - payload_off {
        return Err(DbinError::BufferInsufficient);
    }

    if MessageType::forbids_payload(msg_type) && msg_len != 0 {
        return Err(DbinError::FormatViolation);
    }

    let payload = if msg_len > 0 {
        r.read_bytes(msg_len as usize)?
    } else {
        &[]
    };

    Ok(Message {
        magic,
        version,
        msg_type,
        valid,
        is_room,
        reserved,
        user_id,
        route,
        msg_id,
        msg_len,
        payload,
    })
}
