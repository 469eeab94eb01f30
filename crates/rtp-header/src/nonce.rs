//! セキュアトランスポート用 Nonce
//!
//! ## Nonce 構造（24バイト）
//! ```text
//! bytes[0..4]  = counter as u32, big-endian
//! bytes[4..24] = 予約（ゼロ埋め、必要なら外部で書き込む）
//! ```
//!
//! RTP の wire format には含まれない。暗号化レイヤーが明示的/暗黙的な
//! カウンターとして使うため、ヘッダーと同じ場所で管理する。

use alloc::vec;
use alloc::vec::Vec;

use crate::copy;

/// Header が確保する Nonce のバイト数
pub const NONCE_LEN: usize = 24;

/// 先頭のカウンター部分のバイト数
pub const NONCE_COUNTER_LEN: usize = 4;

/// セキュアトランスポート用 Nonce バッファ
///
/// 一度確保したら再確保せず、その場で上書きして使い回す。
/// 外部から渡されたバッファを採用した場合、長さは 24 バイトとは限らない。
/// 4 バイト未満のバッファでは、カウンターは存在するバイトだけを読み書きする。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce(Vec<u8>);

impl Nonce {
    /// ゼロ埋めされた 24 バイトの Nonce を確保する
    ///
    /// # 例
    /// ```
    /// use rtp_header::{Nonce, NONCE_LEN};
    /// let nonce = Nonce::zeroed();
    /// assert_eq!(nonce.len(), NONCE_LEN);
    /// assert_eq!(nonce.counter(), 0);
    /// ```
    pub fn zeroed() -> Self {
        Nonce(vec![0u8; NONCE_LEN])
    }

    /// 外部バッファをそのまま Nonce として採用する
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Nonce(bytes)
    }

    /// bytes[0..4] の big-endian カウンターを読む
    pub fn counter(&self) -> u32 {
        let mut be = [0u8; NONCE_COUNTER_LEN];
        let n = self.0.len().min(NONCE_COUNTER_LEN);
        be[..n].copy_from_slice(&self.0[..n]);
        u32::from_be_bytes(be)
    }

    /// bytes[0..4] にカウンターを big-endian で書く（残りのバイトは触らない）
    pub fn set_counter(&mut self, counter: u32) {
        let be = counter.to_be_bytes();
        let n = self.0.len().min(NONCE_COUNTER_LEN);
        self.0[..n].copy_from_slice(&be[..n]);
    }

    /// ゼロ埋めしてから `src` を先頭にコピーする
    ///
    /// 容量を超える分は切り捨てる。戻り値は実際にコピーしたバイト数。
    pub fn overwrite(&mut self, src: &[u8]) -> usize {
        copy::overwrite(&mut self.0, src)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 内部バッファを取り出す
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_roundtrip_keeps_reserved_bytes() {
        let mut nonce = Nonce::from_vec((0u8..24).collect());
        nonce.set_counter(0xDEADBEEF);
        assert_eq!(nonce.counter(), 0xDEADBEEF);
        assert_eq!(&nonce.as_bytes()[0..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
        // bytes[4..24] はそのまま
        let tail: Vec<u8> = (4u8..24).collect();
        assert_eq!(&nonce.as_bytes()[4..], tail.as_slice());
    }

    #[test]
    fn test_overwrite_reuses_buffer() {
        let mut nonce = Nonce::zeroed();
        nonce.set_counter(7);
        let n = nonce.overwrite(&[0xAA; 8]);
        assert_eq!(n, 8);
        assert_eq!(nonce.len(), NONCE_LEN);
        assert_eq!(&nonce.as_bytes()[..8], &[0xAA; 8]);
        assert!(nonce.as_bytes()[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_overwrite_truncates_to_capacity() {
        let mut nonce = Nonce::zeroed();
        let n = nonce.overwrite(&[1u8; 40]);
        assert_eq!(n, NONCE_LEN);
        assert_eq!(nonce.len(), NONCE_LEN);
    }

    #[test]
    fn test_short_buffer_counter() {
        let mut nonce = Nonce::from_vec(vec![0x12, 0x34]);
        assert_eq!(nonce.counter(), 0x1234_0000);
        nonce.set_counter(0xABCD_0000);
        assert_eq!(nonce.as_bytes(), &[0xAB, 0xCD]);

        let empty = Nonce::from_vec(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.counter(), 0);
    }
}
