//! Message Record: representasi in-memory satu pesan dbin
//!
//! Wire layout (92 bits, MSB-first, offset dalam bits):
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ magic[0:12) version[12:16) type[16:19) valid[19:20)       │
//! │ is_room[20:21) reserved[21:24)                            │
//! │ user_id[24:44) route[44:64) msg_id[64:80) msg_len[80:92)  │
//! │ padding[92:96) = 0                                        │
//! ├───────────────────────────────────────────────────────────┤
//! │ Payload (msg_len bytes, hanya untuk frame MSG)            │
//! └───────────────────────────────────────────────────────────┘
//! ```

/// Protocol magic number, 12 bits di wire.
pub const MAGIC: u16 = 0xDB1;
/// Protocol version, 4 bits di wire.
pub const VERSION: u8 = 1;
/// Lebar header dalam bits.
pub const HEADER_BITS: usize = 92;
/// Header bytes fisik: 92 bits dibulatkan ke atas.
pub const HEADER_SIZE: usize = (HEADER_BITS + 7) / 8;
/// Payload maksimum (msg_len adalah field 12-bit).
pub const MAX_MSG_LEN: usize = 4095;
/// Batas identifier 20-bit (user_id dan route).
pub const MAX_ID: u32 = (1 << 20) - 1;

/// Tipe pesan dalam dbin
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Pesan data dengan payload
    Msg = 0,
    /// Acknowledgment (tanpa payload)
    Ack = 1,
    /// Liveness probe (tanpa payload)
    Ping = 2,
    /// Balasan probe (tanpa payload)
    Pong = 3,
}

impl MessageType {
    /// Field type di wire selebar 3 bits; nilai 4..=7 lolos range check
    /// tapi tidak punya nama di versi protokol ini.
    #[inline(always)]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Msg),
            1 => Some(Self::Ack),
            2 => Some(Self::Ping),
            3 => Some(Self::Pong),
            _ => None,
        }
    }

    /// Frame kontrol tidak boleh membawa payload.
    #[inline(always)]
    pub fn forbids_payload(raw: u8) -> bool {
        matches!(
            Self::from_u8(raw),
            Some(Self::Ack) | Some(Self::Ping) | Some(Self::Pong)
        )
    }
}

/// Satu pesan dbin.
///
/// Untuk encode: caller mengisi semua field lalu memanggil
/// [`encode`](super::encode); record hanya dibaca, tidak dimutasi.
/// Hasil decode meminjam `payload` dari input buffer (zero-copy) -
/// lifetime `'a` mengikatnya ke buffer tersebut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message<'a> {
    /// Harus [`MAGIC`]; disimpan per-record supaya frame uji negatif
    /// bisa dibentuk.
    pub magic: u16,
    /// Harus [`VERSION`].
    pub version: u8,
    /// Raw 3-bit type; lihat [`MessageType::from_u8`].
    pub msg_type: u8,
    /// Flag aplikasi, tanpa semantic check tersendiri.
    pub valid: bool,
    /// Menentukan arti `route`: false = user id, true = room id.
    pub is_room: bool,
    /// Harus nol untuk v1 (3 bits di wire).
    pub reserved: u8,
    /// Identifier pengirim, < 2^20.
    pub user_id: u32,
    /// Target (user atau room sesuai `is_room`), < 2^20.
    pub route: u32,
    /// Correlation/sequence id.
    pub msg_id: u16,
    /// Panjang payload di wire, 0..=4095.
    pub msg_len: u16,
    /// Sumber payload; minimal `msg_len` bytes saat encode.
    pub payload: &'a [u8],
}

impl<'a> Message<'a> {
    /// Pesan data ke satu user atau room.
    pub fn data(user_id: u32, route: u32, is_room: bool, msg_id: u16, payload: &'a [u8]) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            msg_type: MessageType::Msg as u8,
            valid: true,
            is_room,
            reserved: 0,
            user_id,
            route,
            msg_id,
            msg_len: payload.len() as u16,
            payload,
        }
    }

    /// Frame kontrol tanpa payload (ACK/PING/PONG).
    pub fn control(msg_type: MessageType, user_id: u32, route: u32, is_room: bool, msg_id: u16) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            msg_type: msg_type as u8,
            valid: true,
            is_room,
            reserved: 0,
            user_id,
            route,
            msg_id,
            msg_len: 0,
            payload: &[],
        }
    }

    /// ACK untuk sebuah pesan masuk: routing info disalin, payload dibuang.
    pub fn ack_for(msg: &Message<'_>) -> Self {
        Self::control(
            MessageType::Ack,
            msg.user_id,
            msg.route,
            msg.is_room,
            msg.msg_id,
        )
    }

    /// Total ukuran frame ter-encode (header + payload).
    #[inline(always)]
    pub fn encoded_size(&self) -> usize {
        HEADER_SIZE + self.msg_len as usize
    }
}
