//! # rtp-wasm
//!
//! wasm-bindgen エクスポート：音声トランスポート層（Node.js）から呼び出す公開 API。
//!
//! ## 使用方法（TypeScript）
//!
//! ```typescript
//! import { RtpHeader, isValidRtp, init_panic_hook } from '../rtp-wasm-pkg/rtp_wasm';
//!
//! // パニック時のスタックトレースを有効化（開発時）
//! init_panic_hook();
//!
//! // ヘッダー初期化（sequence / timestamp はランダム）
//! const header = new RtpHeader('{"payloadType":120,"ssrc":999,"randomize":true}');
//!
//! // 受信パケットの検証
//! if (!isValidRtp(udpBuffer)) {
//!     return;
//! }
//!
//! // 送信パケットの組み立て
//! const packet = new Uint8Array(12 + frame.length);
//! header.copy(packet, 0, 0, 12);
//! packet.set(frame, 12);
//! ```

use wasm_bindgen::prelude::*;

pub mod header;
pub mod options;

pub use header::RtpHeader;
pub use options::{parse_options, OptionsError};

/// パニック時にブラウザコンソールにスタックトレースを出力する
///
/// 開発時に必ず呼び出すこと。本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// 任意のバイト列が RTP パケット（version 2）か判定する
#[wasm_bindgen(js_name = "isValidRtp")]
pub fn is_valid_rtp(packet: &[u8]) -> bool {
    rtp_header::is_valid(packet)
}
