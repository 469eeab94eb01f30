//! JS から渡されるヘッダーオプション（JSON）の解析
//!
//! ```json
//! { "version": 2, "marker": true, "payloadType": 120, "ssrc": 999, "randomize": true }
//! ```
//!
//! JSON の数値は f64 として受け取り、セッターと同じ規則で検証する。
//! 未知のフィールドは無視する。

use serde::Deserialize;

use rtp_header::counter::checked_ssrc;
use rtp_header::{integer_value, HeaderError, HeaderOptions};

/// オプション解析のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// JSON として不正
    Json(String),
    /// フィールド値が不正
    Field {
        name: &'static str,
        error: HeaderError,
    },
}

impl core::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OptionsError::Json(msg) => write!(f, "Invalid options JSON: {}", msg),
            OptionsError::Field { name, error } => write!(f, "Invalid option `{}`: {}", name, error),
        }
    }
}

impl std::error::Error for OptionsError {}

/// JS の真偽値判定（`!!value`）に合わせ、bool と number の両方を受け付ける
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Number(f64),
}

impl Flag {
    fn truthy(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Number(n) => *n != 0.0 && !n.is_nan(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOptions {
    version: Option<f64>,
    marker: Option<Flag>,
    payload_type: Option<f64>,
    ssrc: Option<f64>,
    #[serde(default)]
    randomize: bool,
}

/// ビットフィールド用の整数値（フィールド幅へのマスクはセッター側で行う）
fn bitfield(name: &'static str, value: f64) -> Result<u8, OptionsError> {
    integer_value(value)
        .map(|v| v as u8)
        .ok_or(OptionsError::Field {
            name,
            error: HeaderError::InvalidArgument,
        })
}

/// オプション JSON を `HeaderOptions` に変換する
///
/// # エラー
/// - `OptionsError::Json`: JSON 構文エラー、または型が合わない
/// - `OptionsError::Field`: 整数でない値、範囲外の SSRC
pub fn parse_options(json: &str) -> Result<HeaderOptions, OptionsError> {
    let raw: RawOptions = serde_json::from_str(json).map_err(|e| OptionsError::Json(e.to_string()))?;

    let version = raw.version.map(|v| bitfield("version", v)).transpose()?;
    let payload_type = raw.payload_type.map(|v| bitfield("payloadType", v)).transpose()?;
    let ssrc = raw
        .ssrc
        .map(|v| checked_ssrc(v).map_err(|error| OptionsError::Field { name: "ssrc", error }))
        .transpose()?;

    Ok(HeaderOptions {
        version,
        marker: raw.marker.as_ref().map(Flag::truthy),
        payload_type,
        ssrc,
        randomize: raw.randomize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_options() {
        let options =
            parse_options(r#"{"version":2,"marker":true,"payloadType":120,"ssrc":999,"randomize":true}"#).unwrap();
        assert_eq!(
            options,
            HeaderOptions {
                version: Some(2),
                marker: Some(true),
                payload_type: Some(120),
                ssrc: Some(999),
                randomize: true,
            }
        );
    }

    #[test]
    fn test_parse_empty_object() {
        assert_eq!(parse_options("{}").unwrap(), HeaderOptions::default());
    }

    #[test]
    fn test_parse_numeric_marker() {
        let options = parse_options(r#"{"marker":1}"#).unwrap();
        assert_eq!(options.marker, Some(true));
        let options = parse_options(r#"{"marker":0}"#).unwrap();
        assert_eq!(options.marker, Some(false));
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let options = parse_options(r#"{"ssrc":1,"buffer":null,"extra":"x"}"#).unwrap();
        assert_eq!(options.ssrc, Some(1));
    }

    #[test]
    fn test_parse_rejects_bad_ssrc() {
        assert_eq!(
            parse_options(r#"{"ssrc":4294967296}"#),
            Err(OptionsError::Field {
                name: "ssrc",
                error: HeaderError::OutOfRange
            })
        );
        assert_eq!(
            parse_options(r#"{"ssrc":1.5}"#),
            Err(OptionsError::Field {
                name: "ssrc",
                error: HeaderError::InvalidArgument
            })
        );
        // 指数表記の巨大な整数も範囲エラー
        assert_eq!(
            parse_options(r#"{"ssrc":1e20}"#),
            Err(OptionsError::Field {
                name: "ssrc",
                error: HeaderError::OutOfRange
            })
        );
    }

    #[test]
    fn test_parse_rejects_fractional_bitfield() {
        let result = parse_options(r#"{"payloadType":96.5}"#);
        assert!(matches!(result, Err(OptionsError::Field { name: "payloadType", .. })));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(parse_options("{"), Err(OptionsError::Json(_))));
        assert!(matches!(parse_options(r#"{"randomize":"yes"}"#), Err(OptionsError::Json(_))));
    }
}
