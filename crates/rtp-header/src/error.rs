//! RTP ヘッダーのエラー型

/// ヘッダー操作のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// 整数が必要な箇所に整数以外の値が渡された
    InvalidArgument,
    /// 値がフィールドの表現範囲を超えている（SSRC > 2^32 - 1 など）
    OutOfRange,
    /// ラップ対象のバッファが短すぎる
    BufferTooShort {
        /// 必要なバイト数
        expected: usize,
        /// 実際のバイト数
        actual: usize,
    },
    /// OS の乱数源が利用できない（nonce の初期化時）
    EntropyUnavailable,
}

impl core::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HeaderError::InvalidArgument => write!(f, "Value must be an integer"),
            HeaderError::OutOfRange => write!(f, "Value is out of range for the field (max {})", u32::MAX),
            HeaderError::BufferTooShort { expected, actual } => {
                write!(f, "Buffer too short (expected at least {} bytes, got {})", expected, actual)
            }
            HeaderError::EntropyUnavailable => write!(f, "Random source unavailable"),
        }
    }
}

impl std::error::Error for HeaderError {}
