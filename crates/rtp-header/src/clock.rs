//! システム時計
//!
//! WASM 環境では `SystemTime` が使えないため、呼び出し側が
//! `Date.now()` の値を `Header::set_timestamp_at` に注入する。

use std::time::{SystemTime, UNIX_EPOCH};

/// Unix エポックからの経過ミリ秒
///
/// 時計がエポックより前を指している場合は 0。
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
