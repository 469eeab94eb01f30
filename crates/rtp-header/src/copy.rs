//! 固定長領域への境界付きコピー

use log::warn;

/// `dst` をゼロ埋めしてから `src` を先頭にコピーする
///
/// `dst` の容量を超える分は切り捨てる。戻り値は実際にコピーしたバイト数。
pub(crate) fn overwrite(dst: &mut [u8], src: &[u8]) -> usize {
    dst.fill(0);
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
    if n < src.len() {
        warn!("bounded copy truncated: {} of {} bytes copied", n, src.len());
    }
    n
}

/// `src[source_start..source_end]` を `target[target_start..]` にコピーする
///
/// 範囲はすべて両バッファの長さにクランプされる（Node.js の `Buffer#copy` と同じ）。
/// 戻り値は実際にコピーしたバイト数。
pub(crate) fn copy_range(
    src: &[u8],
    target: &mut [u8],
    target_start: usize,
    source_start: usize,
    source_end: usize,
) -> usize {
    let source_end = source_end.min(src.len());
    if source_start >= source_end || target_start >= target.len() {
        return 0;
    }
    let n = (source_end - source_start).min(target.len() - target_start);
    target[target_start..target_start + n].copy_from_slice(&src[source_start..source_start + n]);
    n
}
