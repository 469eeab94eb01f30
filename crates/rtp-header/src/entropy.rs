//! 乱数源
//!
//! - sequence / timestamp: 汎用 PRNG（`rand::random`）。暗号強度は不要
//! - nonce カウンター: 暗号化レイヤーが使うため OS の CSPRNG（getrandom）

use crate::error::HeaderError;

/// 一様分布の u16（sequence 用）
pub(crate) fn sequence_seed() -> u16 {
    rand::random::<u16>()
}

/// 一様分布の u32（timestamp 用）
pub(crate) fn timestamp_seed() -> u32 {
    rand::random::<u32>()
}

/// CSPRNG からの一様分布の u32（nonce 用）
pub(crate) fn nonce_seed() -> Result<u32, HeaderError> {
    let mut buf = [0u8; 4];
    getrandom::getrandom(&mut buf).map_err(|_| HeaderError::EntropyUnavailable)?;
    Ok(u32::from_be_bytes(buf))
}
