//! ラップアラウンド付きカウンター演算
//!
//! sequence (mod 2^16)、timestamp (mod 2^32)、nonce カウンター (mod 2^32) の
//! 更新と比較に使う。負の加算値も `rem_euclid` でフィールド範囲に折り返す。

use crate::error::HeaderError;

/// sequence のモジュロ（2^16）
pub const SEQUENCE_MODULUS: u64 = 1 << 16;

/// timestamp / nonce カウンターのモジュロ（2^32）
pub const COUNTER32_MODULUS: u64 = 1 << 32;

/// 2^63（f64 で正確に表現できる）
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// `(increment ? current + value : value) mod modulus` を計算する
///
/// 戻り値は常に `0..modulus` に収まる。
pub(crate) fn step(current: u64, value: i64, increment: bool, modulus: u64) -> u64 {
    let next = if increment {
        i128::from(current) + i128::from(value)
    } else {
        i128::from(value)
    };
    next.rem_euclid(i128::from(modulus)) as u64
}

/// JS の `Number.isInteger` と同じ判定
///
/// 有限かつ小数部を持たない値のみ true。
/// |value| >= 2^52 の有限値はすべて整数。
pub fn is_integer(value: f64) -> bool {
    if !value.is_finite() {
        return false;
    }
    if value >= I64_LIMIT || value < -I64_LIMIT {
        return true;
    }
    value as i64 as f64 == value
}

/// f64 を整数に変換する（整数でなければ `None`）
///
/// i64 に収まらない整数は mod 2^32 に縮約して返す。
/// sequence (mod 2^16) / timestamp / nonce (mod 2^32) のモジュロはすべて
/// 2^32 の約数なので、カウンター演算の結果は変わらない。
pub fn integer_value(value: f64) -> Option<i64> {
    if !is_integer(value) {
        return None;
    }
    if value >= I64_LIMIT || value < -I64_LIMIT {
        return Some(reduce_mod_2_32(value));
    }
    Some(value as i64)
}

/// |value| >= 2^63 の整数値を mod 2^32（0..2^32）に縮約する
///
/// value = mantissa * 2^exponent に分解して計算する。exponent >= 11。
fn reduce_mod_2_32(value: f64) -> i64 {
    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7FF) as i32 - 1075;
    let mantissa = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);
    let reduced = if exponent >= 32 {
        0
    } else {
        ((u128::from(mantissa) << exponent) & 0xFFFF_FFFF) as i64
    };
    if value < 0.0 {
        (COUNTER32_MODULUS as i64 - reduced) % COUNTER32_MODULUS as i64
    } else {
        reduced
    }
}

/// 緩い型付けの呼び出し元（JS など）から渡された SSRC 値を検証する
///
/// # エラー
/// - `HeaderError::InvalidArgument`: 整数でない
/// - `HeaderError::OutOfRange`: 負の値、または 2^32 - 1 を超える
pub fn checked_ssrc(value: f64) -> Result<u32, HeaderError> {
    if !is_integer(value) {
        return Err(HeaderError::InvalidArgument);
    }
    if value < 0.0 || value > f64::from(u32::MAX) {
        return Err(HeaderError::OutOfRange);
    }
    Ok(value as u32)
}

/// 2 つの sequence の差（newer - older, mod 2^16）
pub fn sequence_distance(newer: u16, older: u16) -> u16 {
    newer.wrapping_sub(older)
}

/// 2 つの timestamp の差（newer - older, mod 2^32）
pub fn timestamp_distance(newer: u32, older: u32) -> u32 {
    newer.wrapping_sub(older)
}

/// `a` が `b` より新しい sequence か（RFC 1982 のシリアル番号比較）
pub fn is_sequence_newer(a: u16, b: u16) -> bool {
    a != b && a.wrapping_sub(b) < 0x8000
}
