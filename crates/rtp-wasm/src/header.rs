//! RtpHeader wasm-bindgen エクスポート
//!
//! 音声トランスポート層（Node.js）から呼び出すヘッダーの主エントリポイント。
//! JS の number は f64 で受け取り、整数判定は `Number.isInteger` と同じ規則で行う。

use js_sys::Uint8Array;
use wasm_bindgen::prelude::*;

use rtp_header::{integer_value, Header, HeaderError, HeaderOptions, HEADER_LEN};

use crate::options::parse_options;

fn to_js_error(e: HeaderError) -> JsError {
    JsError::new(&format!("{}", e))
}

fn to_uint8_array(bytes: &[u8]) -> Uint8Array {
    let arr = Uint8Array::new_with_length(bytes.len() as u32);
    arr.copy_from(bytes);
    arr
}

/// JS の number を整数として解釈する（整数でなければ `None`）
fn js_integer(value: Option<f64>) -> Option<i64> {
    value.and_then(integer_value)
}

/// RTP ヘッダー（12バイト）+ ペイロード + Nonce
///
/// ## 使用方法（TypeScript）
///
/// ```typescript
/// const header = new RtpHeader('{"payloadType":120,"ssrc":999,"randomize":true}');
///
/// // 20ms ごと
/// header.setSequence();
/// header.setTimestamp(960, true);
/// header.setNonce();
/// header.setPayload(opusFrame, true);
/// socket.send(header.toPacket());
/// ```
///
/// ## スレッド安全性
///
/// WASM は シングルスレッドのため、`!Send + !Sync` を満たす。
/// JS からは単一スレッドで呼び出される前提。
#[wasm_bindgen]
pub struct RtpHeader {
    inner: Header<'static>,
}

#[wasm_bindgen]
impl RtpHeader {
    /// ヘッダーを初期化する
    ///
    /// # 引数
    /// - `options_json`: オプションの JSON 文字列。省略時は version = 2 のみ設定
    ///
    /// # エラー
    /// - JSON の解析失敗、不正な SSRC
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> Result<RtpHeader, JsError> {
        let options = match options_json.as_deref() {
            Some(json) => parse_options(json).map_err(|e| JsError::new(&format!("{}", e)))?,
            None => HeaderOptions::default(),
        };
        Ok(RtpHeader {
            inner: Header::with_options(options),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> u32 {
        self.inner.len() as u32
    }

    #[wasm_bindgen(getter)]
    pub fn valid(&self) -> bool {
        self.inner.is_valid()
    }

    #[wasm_bindgen(getter)]
    pub fn version(&self) -> u8 {
        self.inner.version()
    }

    #[wasm_bindgen(getter)]
    pub fn padding(&self) -> bool {
        self.inner.padding()
    }

    #[wasm_bindgen(getter)]
    pub fn extension(&self) -> bool {
        self.inner.extension()
    }

    #[wasm_bindgen(getter, js_name = "csrcCount")]
    pub fn csrc_count(&self) -> u8 {
        self.inner.csrc_count()
    }

    #[wasm_bindgen(getter)]
    pub fn marker(&self) -> bool {
        self.inner.marker()
    }

    #[wasm_bindgen(getter, js_name = "payloadType")]
    pub fn payload_type(&self) -> u8 {
        self.inner.payload_type()
    }

    #[wasm_bindgen(getter)]
    pub fn sequence(&self) -> u16 {
        self.inner.sequence()
    }

    #[wasm_bindgen(getter)]
    pub fn timestamp(&self) -> u32 {
        self.inner.timestamp()
    }

    #[wasm_bindgen(getter)]
    pub fn ssrc(&self) -> u32 {
        self.inner.ssrc()
    }

    /// Nonce の bytes[0..4] カウンター（未確保なら undefined）
    #[wasm_bindgen(getter, js_name = "nonceNumber")]
    pub fn nonce_number(&self) -> Option<u32> {
        self.inner.nonce_counter()
    }

    /// ヘッダー 12 バイトのコピー
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Uint8Array {
        to_uint8_array(self.inner.as_bytes())
    }

    /// Nonce バイト列のコピー（未確保なら undefined）
    #[wasm_bindgen(getter)]
    pub fn nonce(&self) -> Option<Uint8Array> {
        self.inner.nonce().map(|nonce| to_uint8_array(nonce.as_bytes()))
    }

    /// ペイロードのコピー（未添付なら undefined）
    #[wasm_bindgen(getter)]
    pub fn payload(&self) -> Option<Uint8Array> {
        self.inner.payload().map(to_uint8_array)
    }

    #[wasm_bindgen(js_name = "setVersion")]
    pub fn set_version(&mut self, version: u8) {
        self.inner.set_version(version);
    }

    #[wasm_bindgen(js_name = "setPadding")]
    pub fn set_padding(&mut self, padding: bool) {
        self.inner.set_padding(padding);
    }

    #[wasm_bindgen(js_name = "setExtension")]
    pub fn set_extension(&mut self, extension: bool) {
        self.inner.set_extension(extension);
    }

    #[wasm_bindgen(js_name = "setCSRCCount")]
    pub fn set_csrc_count(&mut self, csrc_count: u8) {
        self.inner.set_csrc_count(csrc_count);
    }

    #[wasm_bindgen(js_name = "setMarker")]
    pub fn set_marker(&mut self, marker: bool) {
        self.inner.set_marker(marker);
    }

    #[wasm_bindgen(js_name = "setPayloadType")]
    pub fn set_payload_type(&mut self, payload_type: u8) {
        self.inner.set_payload_type(payload_type);
    }

    /// sequence を更新する。引数なし（または整数以外）なら 1 進める
    #[wasm_bindgen(js_name = "setSequence")]
    pub fn set_sequence(&mut self, value: Option<f64>, increment: Option<bool>) {
        self.inner.set_sequence(js_integer(value), increment.unwrap_or(false));
    }

    /// timestamp を更新する。引数なし（または整数以外）なら `Date.now()` を設定する
    #[wasm_bindgen(js_name = "setTimestamp")]
    pub fn set_timestamp(&mut self, value: Option<f64>, increment: Option<bool>) {
        let now_ms = js_sys::Date::now() as u64;
        self.inner
            .set_timestamp_at(js_integer(value), increment.unwrap_or(false), now_ms);
    }

    /// # エラー
    /// - 整数でない値
    /// - 2^32 - 1 を超える値（負の値を含む）
    #[wasm_bindgen(js_name = "setSSRC")]
    pub fn set_ssrc(&mut self, value: f64) -> Result<(), JsError> {
        self.inner.try_set_ssrc(value).map_err(to_js_error)
    }

    /// ペイロードを設定し、書き込んだバイト数を返す
    ///
    /// `replace` が false なら既存ペイロードの容量に切り詰めて上書きする。
    #[wasm_bindgen(js_name = "setPayload")]
    pub fn set_payload(&mut self, payload: Vec<u8>, replace: Option<bool>) -> u32 {
        if replace.unwrap_or(false) {
            let len = payload.len();
            self.inner.replace_payload(payload);
            len as u32
        } else {
            self.inner.set_payload(&payload, false) as u32
        }
    }

    /// Nonce カウンターを更新する。引数なし（または整数以外）なら 1 進める
    #[wasm_bindgen(js_name = "setNonce")]
    pub fn set_nonce(&mut self, value: Option<f64>, increment: Option<bool>) -> Result<(), JsError> {
        self.inner
            .set_nonce(js_integer(value), increment.unwrap_or(false))
            .map_err(to_js_error)
    }

    /// 外部バッファで Nonce を設定し、書き込んだバイト数を返す
    #[wasm_bindgen(js_name = "setNonceBytes")]
    pub fn set_nonce_bytes(&mut self, bytes: Vec<u8>) -> u32 {
        self.inner.set_nonce_bytes(bytes) as u32
    }

    #[wasm_bindgen(js_name = "randomizeSequence")]
    pub fn randomize_sequence(&mut self) {
        self.inner.randomize_sequence();
    }

    #[wasm_bindgen(js_name = "randomizeTimestamp")]
    pub fn randomize_timestamp(&mut self) {
        self.inner.randomize_timestamp();
    }

    #[wasm_bindgen(js_name = "randomizeNonce")]
    pub fn randomize_nonce(&mut self) -> Result<(), JsError> {
        self.inner.randomize_nonce().map_err(to_js_error)
    }

    /// byte 0〜1 を保持してヘッダーを初期化し、sequence / timestamp を乱数にする
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// ヘッダーの一部を `target` にコピーし、コピーしたバイト数を返す
    ///
    /// 引数の既定値は Node.js の `Buffer#copy` と同じ（0, 0, 12）。
    #[wasm_bindgen]
    pub fn copy(
        &self,
        target: &mut [u8],
        target_start: Option<u32>,
        source_start: Option<u32>,
        source_end: Option<u32>,
    ) -> u32 {
        self.inner.copy_to(
            target,
            target_start.unwrap_or(0) as usize,
            source_start.unwrap_or(0) as usize,
            source_end.map_or(HEADER_LEN, |end| end as usize),
        ) as u32
    }

    /// `[header: 12bytes][payload...]` を組み立てて返す
    #[wasm_bindgen(js_name = "toPacket")]
    pub fn to_packet(&self) -> Uint8Array {
        to_uint8_array(&self.inner.to_packet())
    }
}
