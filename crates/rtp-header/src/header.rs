//! RTP 固定ヘッダー（12バイト）
//!
//! ## Wire Format（RFC 3550 §5.1）
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |V=2|P|X|  CC   |M|     PT      |       sequence number         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           timestamp                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           synchronization source (SSRC) identifier            |
//! +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
//! ```
//!
//! CSRC リストは扱わない（CC フィールドの値のみ）。

use alloc::vec;
use alloc::vec::Vec;

use log::{debug, warn};

use crate::copy;
use crate::counter::{self, COUNTER32_MODULUS, SEQUENCE_MODULUS};
use crate::entropy;
use crate::error::HeaderError;
use crate::nonce::{Nonce, NONCE_LEN};
use crate::RTP_VERSION;

/// RTP 固定ヘッダーのバイト数
pub const HEADER_LEN: usize = 12;

const VERSION_SHIFT: u8 = 6;
const PADDING_SHIFT: u8 = 5;
const EXTENSION_SHIFT: u8 = 4;
const MARKER_SHIFT: u8 = 7;

const VERSION_BITS: u8 = 0b11;
const CSRC_COUNT_MASK: u8 = 0b0000_1111;
const PAYLOAD_TYPE_MASK: u8 = 0b0111_1111;

/// ヘッダー構築時のオプション
///
/// 指定されたフィールドだけが version → marker → payload_type → ssrc → randomize
/// の順に適用される。ビットフィールドの値はフィールド幅にマスクされる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderOptions {
    /// RTP バージョン。自前バッファで未指定なら 2
    pub version: Option<u8>,
    /// marker ビット
    pub marker: Option<bool>,
    /// ペイロードタイプ（0〜127）
    pub payload_type: Option<u8>,
    /// 同期ソース識別子
    pub ssrc: Option<u32>,
    /// sequence と timestamp をランダムな値で初期化する
    pub randomize: bool,
}

/// ヘッダーの 12 バイト領域
///
/// 自前で確保した配列か、呼び出し側から借用した領域のどちらか。
/// どちらの場合も長さは常に 12 バイトで、再確保はしない。
#[derive(Debug)]
enum Storage<'a> {
    Owned([u8; HEADER_LEN]),
    Borrowed(&'a mut [u8; HEADER_LEN]),
}

impl Storage<'_> {
    fn bytes(&self) -> &[u8; HEADER_LEN] {
        match self {
            Storage::Owned(bytes) => bytes,
            Storage::Borrowed(bytes) => &**bytes,
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8; HEADER_LEN] {
        match self {
            Storage::Owned(bytes) => bytes,
            Storage::Borrowed(bytes) => &mut **bytes,
        }
    }
}

/// RTP ヘッダー
///
/// 12 バイトのバッファ上の読み書きビューと、添付ペイロード・Nonce を保持する。
/// 各フィールドは別途保存せず、常にバッファから計算する。
///
/// ## 所有権
///
/// - `Header::new` / `Header::with_options`: 12 バイト配列を自前で所有する
/// - `Header::wrap`: 呼び出し側のバッファ（受信パケットの先頭など）を
///   排他借用し、その場で読み書きする
///
/// ## スレッド安全性
///
/// 内部で同期は行わない。1 パケット 1 ヘッダーで、並行する送信者間で
/// 共有しないこと。
#[derive(Debug)]
pub struct Header<'a> {
    buf: Storage<'a>,
    payload: Option<Vec<u8>>,
    nonce: Option<Nonce>,
}

impl Default for Header<'static> {
    fn default() -> Self {
        Header::new()
    }
}

impl Header<'static> {
    /// version = 2、それ以外ゼロの新しいヘッダーを確保する
    pub fn new() -> Self {
        let mut header = Header::from_storage(Storage::Owned([0u8; HEADER_LEN]));
        header.set_version(RTP_VERSION);
        header
    }

    /// オプションを適用した新しいヘッダーを確保する
    ///
    /// `version` が未指定なら 2 を使う。
    ///
    /// # 例
    /// ```
    /// use rtp_header::{Header, HeaderOptions};
    ///
    /// let header = Header::with_options(HeaderOptions {
    ///     payload_type: Some(96),
    ///     ssrc: Some(12345),
    ///     ..HeaderOptions::default()
    /// });
    ///
    /// assert!(header.is_valid());
    /// assert_eq!(header.payload_type(), 96);
    /// assert_eq!(header.ssrc(), 12345);
    /// ```
    pub fn with_options(options: HeaderOptions) -> Self {
        let mut header = Header::from_storage(Storage::Owned([0u8; HEADER_LEN]));
        header.apply_options(&options, true);
        header
    }
}

impl<'a> Header<'a> {
    /// 既存バッファの先頭 12 バイトをヘッダーとして借用する
    ///
    /// バッファの内容はそのまま残る（version も書き換えない）。
    ///
    /// # エラー
    /// - `HeaderError::BufferTooShort`: 12 バイト未満
    pub fn wrap(buf: &'a mut [u8]) -> Result<Self, HeaderError> {
        let actual = buf.len();
        let region: &'a mut [u8; HEADER_LEN] = buf
            .get_mut(..HEADER_LEN)
            .and_then(|region| region.try_into().ok())
            .ok_or(HeaderError::BufferTooShort {
                expected: HEADER_LEN,
                actual,
            })?;
        Ok(Header::from_storage(Storage::Borrowed(region)))
    }

    /// 既存バッファを借用してオプションを適用する
    ///
    /// 自前バッファと違い、`version` 未指定でもバージョンは書き換えない。
    pub fn wrap_with_options(buf: &'a mut [u8], options: HeaderOptions) -> Result<Self, HeaderError> {
        let mut header = Header::wrap(buf)?;
        header.apply_options(&options, false);
        Ok(header)
    }

    fn from_storage(buf: Storage<'a>) -> Self {
        Header {
            buf,
            payload: None,
            nonce: None,
        }
    }

    fn apply_options(&mut self, options: &HeaderOptions, default_version: bool) {
        let version = match options.version {
            Some(version) => Some(version),
            None if default_version => Some(RTP_VERSION),
            None => None,
        };
        if let Some(version) = version {
            self.set_version(version);
        }
        if let Some(marker) = options.marker {
            self.set_marker(marker);
        }
        if let Some(payload_type) = options.payload_type {
            self.set_payload_type(payload_type);
        }
        if let Some(ssrc) = options.ssrc {
            self.set_ssrc(ssrc);
        }
        if options.randomize {
            self.randomize_sequence();
            self.randomize_timestamp();
        }
    }

    // ----------------------------------------------------------
    // 読み出し
    // ----------------------------------------------------------

    /// ヘッダーのバイト数（常に 12）
    pub fn len(&self) -> usize {
        HEADER_LEN
    }

    /// 常に false（ヘッダーは空にならない）
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn as_bytes(&self) -> &[u8; HEADER_LEN] {
        self.buf.bytes()
    }

    /// version が 2 か
    pub fn is_valid(&self) -> bool {
        crate::is_valid(self.as_bytes())
    }

    /// byte 0: `[V V P X C C C C]`
    pub fn first_byte(&self) -> u8 {
        self.as_bytes()[0]
    }

    /// byte 1: `[M P P P P P P P]`
    pub fn second_byte(&self) -> u8 {
        self.as_bytes()[1]
    }

    pub fn version(&self) -> u8 {
        self.first_byte() >> VERSION_SHIFT
    }

    pub fn padding(&self) -> bool {
        (self.first_byte() >> PADDING_SHIFT) & 1 == 1
    }

    pub fn extension(&self) -> bool {
        (self.first_byte() >> EXTENSION_SHIFT) & 1 == 1
    }

    pub fn csrc_count(&self) -> u8 {
        self.first_byte() & CSRC_COUNT_MASK
    }

    pub fn marker(&self) -> bool {
        self.second_byte() >> MARKER_SHIFT == 1
    }

    pub fn payload_type(&self) -> u8 {
        self.second_byte() & PAYLOAD_TYPE_MASK
    }

    /// bytes[2..4]
    pub fn sequence(&self) -> u16 {
        let bytes = self.as_bytes();
        u16::from_be_bytes([bytes[2], bytes[3]])
    }

    /// bytes[4..8]
    pub fn timestamp(&self) -> u32 {
        let bytes = self.as_bytes();
        u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]])
    }

    /// bytes[8..12]
    pub fn ssrc(&self) -> u32 {
        let bytes = self.as_bytes();
        u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]])
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn nonce(&self) -> Option<&Nonce> {
        self.nonce.as_ref()
    }

    /// Nonce の bytes[0..4] カウンター（Nonce 未確保なら `None`）
    pub fn nonce_counter(&self) -> Option<u32> {
        self.nonce.as_ref().map(Nonce::counter)
    }

    // ----------------------------------------------------------
    // ビットフィールドの書き込み（read-modify-write）
    // ----------------------------------------------------------

    fn write_first_byte(&mut self, version: u8, padding: bool, extension: bool, csrc_count: u8) {
        self.buf.bytes_mut()[0] = ((version & VERSION_BITS) << VERSION_SHIFT)
            | (u8::from(padding) << PADDING_SHIFT)
            | (u8::from(extension) << EXTENSION_SHIFT)
            | (csrc_count & CSRC_COUNT_MASK);
    }

    fn write_second_byte(&mut self, marker: bool, payload_type: u8) {
        self.buf.bytes_mut()[1] = (u8::from(marker) << MARKER_SHIFT) | (payload_type & PAYLOAD_TYPE_MASK);
    }

    /// 下位 2 ビットのみ使う
    pub fn set_version(&mut self, version: u8) {
        self.write_first_byte(version, self.padding(), self.extension(), self.csrc_count());
    }

    pub fn set_padding(&mut self, padding: bool) {
        self.write_first_byte(self.version(), padding, self.extension(), self.csrc_count());
    }

    pub fn set_extension(&mut self, extension: bool) {
        self.write_first_byte(self.version(), self.padding(), extension, self.csrc_count());
    }

    /// 下位 4 ビットのみ使う
    pub fn set_csrc_count(&mut self, csrc_count: u8) {
        self.write_first_byte(self.version(), self.padding(), self.extension(), csrc_count);
    }

    pub fn set_marker(&mut self, marker: bool) {
        self.write_second_byte(marker, self.payload_type());
    }

    /// 下位 7 ビットのみ使う
    pub fn set_payload_type(&mut self, payload_type: u8) {
        self.write_second_byte(self.marker(), payload_type);
    }

    // ----------------------------------------------------------
    // カウンター
    // ----------------------------------------------------------

    /// sequence を更新する
    ///
    /// - `value = None`: 1 進める（`increment` は無視）
    /// - `increment = true`: 現在値に `value` を加算
    /// - `increment = false`: `value` をそのまま設定
    ///
    /// 結果は mod 2^16 で格納する。
    pub fn set_sequence(&mut self, value: Option<i64>, increment: bool) {
        let (value, increment) = match value {
            Some(value) => (value, increment),
            None => (1, true),
        };
        let next = counter::step(u64::from(self.sequence()), value, increment, SEQUENCE_MODULUS) as u16;
        self.buf.bytes_mut()[2..4].copy_from_slice(&next.to_be_bytes());
    }

    /// timestamp を更新する
    ///
    /// `value = None` なら現在時刻（Unix ミリ秒）を絶対値として設定する。
    /// 結果は mod 2^32 で格納する。
    pub fn set_timestamp(&mut self, value: Option<i64>, increment: bool) {
        self.set_timestamp_at(value, increment, crate::clock::now_ms());
    }

    /// 現在時刻を注入して timestamp を更新する
    ///
    /// # 引数
    /// - `now_ms`: 現在時刻（ミリ秒、WASM 環境では JS の Date.now() から注入）
    pub fn set_timestamp_at(&mut self, value: Option<i64>, increment: bool, now_ms: u64) {
        let (value, increment) = match value {
            Some(value) => (value, increment),
            None => ((now_ms % COUNTER32_MODULUS) as i64, false),
        };
        let next = counter::step(u64::from(self.timestamp()), value, increment, COUNTER32_MODULUS) as u32;
        self.buf.bytes_mut()[4..8].copy_from_slice(&next.to_be_bytes());
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        self.buf.bytes_mut()[8..12].copy_from_slice(&ssrc.to_be_bytes());
    }

    /// 緩い型の値（JS の number など）を検証して SSRC に設定する
    ///
    /// 検証に失敗した場合、バッファは変更されない。
    ///
    /// # エラー
    /// - `HeaderError::InvalidArgument`: 整数でない
    /// - `HeaderError::OutOfRange`: 負、または 2^32 - 1 を超える
    pub fn try_set_ssrc(&mut self, value: f64) -> Result<(), HeaderError> {
        match counter::checked_ssrc(value) {
            Ok(ssrc) => {
                self.set_ssrc(ssrc);
                Ok(())
            }
            Err(e) => {
                warn!("rejected SSRC {}: {}", value, e);
                Err(e)
            }
        }
    }

    /// sequence を 0〜65535 の一様乱数にする
    pub fn randomize_sequence(&mut self) {
        let value = entropy::sequence_seed();
        self.set_sequence(Some(i64::from(value)), false);
    }

    /// timestamp を 0〜2^32-1 の一様乱数にする
    pub fn randomize_timestamp(&mut self) {
        let value = entropy::timestamp_seed();
        self.set_timestamp_at(Some(i64::from(value)), false, 0);
    }

    // ----------------------------------------------------------
    // ペイロード
    // ----------------------------------------------------------

    /// ペイロードを設定する
    ///
    /// - `replace = true`、またはペイロード未添付: `payload` のコピーを新しいペイロードにする
    /// - それ以外: 既存ペイロードをゼロ埋めしてから先頭にコピーする。
    ///   既存の容量を超える分は切り捨てる
    ///
    /// 戻り値はペイロードに書き込んだバイト数。
    pub fn set_payload(&mut self, payload: &[u8], replace: bool) -> usize {
        if !replace {
            if let Some(existing) = self.payload.as_mut() {
                return copy::overwrite(existing, payload);
            }
        }
        self.replace_payload(payload.to_vec());
        payload.len()
    }

    /// ペイロードを丸ごと差し替え、以前のペイロードを返す
    pub fn replace_payload(&mut self, payload: Vec<u8>) -> Option<Vec<u8>> {
        self.payload.replace(payload)
    }

    pub fn take_payload(&mut self) -> Option<Vec<u8>> {
        self.payload.take()
    }

    // ----------------------------------------------------------
    // Nonce
    // ----------------------------------------------------------

    /// Nonce カウンター（bytes[0..4]）を更新する
    ///
    /// Nonce が未確保なら 24 バイトを確保し、カウンターを乱数で初期化してから
    /// 更新を適用する。`value = None` なら 1 進める。結果は mod 2^32。
    /// bytes[4..] は変更しない。
    ///
    /// # エラー
    /// - `HeaderError::EntropyUnavailable`: 初回確保時に乱数源が使えない
    pub fn set_nonce(&mut self, value: Option<i64>, increment: bool) -> Result<(), HeaderError> {
        let nonce = match self.nonce.take() {
            Some(nonce) => nonce,
            None => {
                let mut nonce = Nonce::zeroed();
                nonce.set_counter(entropy::nonce_seed()?);
                debug!("allocated {}-byte nonce", NONCE_LEN);
                nonce
            }
        };
        let nonce = self.nonce.insert(nonce);

        let (value, increment) = match value {
            Some(value) => (value, increment),
            None => (1, true),
        };
        let next = counter::step(u64::from(nonce.counter()), value, increment, COUNTER32_MODULUS) as u32;
        nonce.set_counter(next);
        Ok(())
    }

    /// 外部バッファで Nonce を設定する
    ///
    /// - Nonce 未確保: `bytes` をそのまま採用する（長さは問わない）
    /// - 確保済み: ゼロ埋めしてから先頭にコピーする（容量を超える分は切り捨て）
    ///
    /// 戻り値は Nonce に書き込んだバイト数。
    pub fn set_nonce_bytes(&mut self, bytes: Vec<u8>) -> usize {
        if let Some(nonce) = self.nonce.as_mut() {
            return nonce.overwrite(&bytes);
        }
        let len = bytes.len();
        debug!("adopted external {}-byte nonce", len);
        self.nonce = Some(Nonce::from_vec(bytes));
        len
    }

    /// Nonce カウンターを 0〜2^32-1 の一様乱数にする
    pub fn randomize_nonce(&mut self) -> Result<(), HeaderError> {
        let value = entropy::nonce_seed()?;
        self.set_nonce(Some(i64::from(value)), false)
    }

    /// Nonce を取り外してバイト列として返す
    ///
    /// 次の `set_nonce` で新しい Nonce が乱数初期化される。
    pub fn take_nonce(&mut self) -> Option<Vec<u8>> {
        self.nonce.take().map(Nonce::into_vec)
    }

    // ----------------------------------------------------------
    // リセット / コピー
    // ----------------------------------------------------------

    /// 次のパケット用にヘッダーを初期化する
    ///
    /// byte 0〜1（version / padding / extension / CC / marker / PT）は保持し、
    /// 残りをゼロにする。添付ペイロードはゼロ埋めするが外さない。
    /// 最後に sequence と timestamp を乱数で初期化する。
    pub fn reset(&mut self) {
        let bytes = self.buf.bytes_mut();
        let (first, second) = (bytes[0], bytes[1]);
        bytes.fill(0);
        bytes[0] = first;
        bytes[1] = second;

        if let Some(payload) = self.payload.as_mut() {
            payload.fill(0);
        }
        debug!("header reset (first=0x{:02x}, second=0x{:02x})", first, second);

        self.randomize_sequence();
        self.randomize_timestamp();
    }

    /// ヘッダーの `[source_start, source_end)` を `target[target_start..]` にコピーする
    ///
    /// 範囲は両バッファの長さにクランプされる。戻り値は実際にコピーしたバイト数。
    pub fn copy_to(&self, target: &mut [u8], target_start: usize, source_start: usize, source_end: usize) -> usize {
        copy::copy_range(self.as_bytes(), target, target_start, source_start, source_end)
    }

    /// ヘッダー + ペイロードのバイト数
    pub fn packet_len(&self) -> usize {
        HEADER_LEN + self.payload.as_ref().map_or(0, Vec::len)
    }

    /// `[header: 12bytes][payload...]` を `target` の先頭に書き込む
    ///
    /// `target` が短い場合は入る分だけ書く。戻り値は書き込んだバイト数。
    pub fn write_packet(&self, target: &mut [u8]) -> usize {
        let written = self.copy_to(target, 0, 0, HEADER_LEN);
        if written < HEADER_LEN {
            return written;
        }
        let payload_written = match self.payload.as_deref() {
            Some(payload) => copy::copy_range(payload, target, HEADER_LEN, 0, payload.len()),
            None => 0,
        };
        written + payload_written
    }

    /// `[header: 12bytes][payload...]` を新しいバッファに組み立てる
    pub fn to_packet(&self) -> Vec<u8> {
        let mut packet = vec![0u8; self.packet_len()];
        self.write_packet(&mut packet);
        packet
    }
}
