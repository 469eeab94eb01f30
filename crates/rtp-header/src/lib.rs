//! # rtp-header
//!
//! RTP 固定ヘッダー（RFC 3550）コーデック
//!
//! 音声トランスポート層がパケットごと（通常 20ms ごと）にヘッダーを
//! 構築・更新・検証・リセットするためのクレート。
//! ソケット I/O や暗号化は行わず、ヘッダーのバイト列だけを扱う。
//! WASM（wasm32-unknown-unknown）でも動作する。
//!
//! ## ヘッダー構造（12バイト）
//!
//! ```text
//! Byte 0:     [V V P X C C C C]   V=version P=padding X=extension C=CSRC count
//! Byte 1:     [M P P P P P P P]   M=marker P=payload type
//! Bytes 2-3:  sequence number (u16 BE, mod 2^16)
//! Bytes 4-7:  timestamp       (u32 BE, mod 2^32)
//! Bytes 8-11: SSRC            (u32 BE)
//! ```
//!
//! ## Nonce（24バイト、ヘッダーとは別バッファ）
//!
//! ```text
//! bytes[0..4]  = counter as u32, big-endian
//! bytes[4..24] = 予約（ゼロ）
//! ```

extern crate alloc;

pub mod clock;
pub mod counter;
mod copy;
mod entropy;
mod error;
mod header;
mod nonce;

pub use counter::{integer_value, is_integer, is_sequence_newer, sequence_distance, timestamp_distance};
pub use error::HeaderError;
pub use header::{Header, HeaderOptions, HEADER_LEN};
pub use nonce::{Nonce, NONCE_COUNTER_LEN, NONCE_LEN};

/// 有効な RTP パケットのバージョン
pub const RTP_VERSION: u8 = 2;

/// 任意のバイト列が RTP パケットとして有効か判定する
///
/// byte 0 の上位 2 ビットが `0b10`（version 2）かどうかだけを見る。
/// 空のバイト列は無効。
///
/// # 例
/// ```
/// assert!(rtp_header::is_valid(&[0x80, 0x60]));
/// assert!(!rtp_header::is_valid(&[0x40]));
/// ```
pub fn is_valid(packet: &[u8]) -> bool {
    packet.first().map_or(false, |&first| first >> 6 == RTP_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_version_2_only() {
        for version in 0u8..=3 {
            let packet = [version << 6, 0, 0, 0];
            assert_eq!(is_valid(&packet), version == 2, "version {}", version);
        }
    }

    #[test]
    fn test_is_valid_ignores_other_bits() {
        assert!(is_valid(&[0b1011_1111]));
        assert!(is_valid(&[0x80, 0xFF, 0xFF, 0xFF]));
        assert!(!is_valid(&[0b0111_1111]));
    }

    #[test]
    fn test_is_valid_empty() {
        assert!(!is_valid(&[]));
    }

    #[test]
    fn test_is_valid_matches_header() {
        let mut header = Header::new();
        assert_eq!(is_valid(header.as_bytes()), header.is_valid());
        header.set_version(3);
        assert!(!header.is_valid());
        assert!(!is_valid(header.as_bytes()));
    }
}
