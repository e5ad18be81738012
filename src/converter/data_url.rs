//! # Data URL 编解码
//!
//! 源图片与转换结果在会话内都以 `data:<mime>;base64,<payload>` 的形式流转。
//! 结果体积按 Data URL 文本长度估算，不做 base64 填充修正。

use base64::{Engine as _, engine::general_purpose};

use super::ConverterError;

const BASE64_MARKER: &str = ";base64,";

/// 将原始字节编码为 Data URL。
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let encoded = general_purpose::STANDARD.encode(bytes);
    let mut data_url =
        String::with_capacity(5 + mime_type.len() + BASE64_MARKER.len() + encoded.len());
    data_url.push_str("data:");
    data_url.push_str(mime_type);
    data_url.push_str(BASE64_MARKER);
    data_url.push_str(&encoded);
    data_url
}

/// 头部前缀长度（含 `base64,`），例如 `data:image/png;base64,` 为 22。
pub fn header_len(data_url: &str) -> Option<usize> {
    if !data_url.starts_with("data:") {
        return None;
    }
    data_url
        .find(BASE64_MARKER)
        .map(|start| start + BASE64_MARKER.len())
}

/// 按 `round((L - H) * 3 / 4)` 估算编码后字节数。
pub fn estimate_size(data_url: &str) -> Result<u64, ConverterError> {
    let header = header_len(data_url)
        .ok_or_else(|| ConverterError::ConversionFailure("结果缺少 base64 头部".to_string()))?;
    Ok(estimate_size_from_lengths(data_url.len(), header))
}

pub(crate) fn estimate_size_from_lengths(total_len: usize, header_len: usize) -> u64 {
    let payload = total_len.saturating_sub(header_len) as f64;
    (payload * 3.0 / 4.0).round() as u64
}

/// 解析 Data URL，返回声明类型与解码后的字节。
///
/// 在真正解码前先按 base64 长度估算上限，超限直接拒绝。
pub fn parse_data_url(data_url: &str, max_size: u64) -> Result<(String, Vec<u8>), ConverterError> {
    let normalized = data_url.trim();
    let header = header_len(normalized)
        .ok_or_else(|| ConverterError::ConversionFailure("缺少 base64 标记".to_string()))?;
    let mime_type = normalized[5..header - BASE64_MARKER.len()].to_string();
    let payload = &normalized[header..];

    let estimated_len = estimate_base64_decoded_upper_bound_len(payload)?;
    if estimated_len > max_size {
        return Err(ConverterError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_size as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ConverterError::ConversionFailure(format!("Base64 解码失败：{}", e)))?;

    Ok((mime_type, bytes))
}

fn estimate_base64_decoded_upper_bound_len(payload: &str) -> Result<u64, ConverterError> {
    let len = payload.len() as u64;
    let groups = len
        .checked_add(3)
        .ok_or_else(|| ConverterError::ResourceLimit("Base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| ConverterError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn png_header_is_22_chars() {
        let url = encode_data_url("image/png", &[1, 2, 3]);
        assert_eq!(header_len(&url), Some(22));
    }

    #[test]
    fn estimate_matches_reference_example() {
        assert_eq!(estimate_size_from_lengths(1000, 22), 734);

        let url = format!("data:image/png;base64,{}", "A".repeat(978));
        assert_eq!(estimate_size(&url).unwrap(), 734);
    }

    #[test]
    fn estimate_ignores_padding() {
        // 1 字节 → "AQ==" 估算为 3，而非真实的 1
        let url = encode_data_url("image/png", &[1]);
        assert_eq!(estimate_size(&url).unwrap(), 3);
    }

    #[test]
    fn round_trip_keeps_mime_and_bytes() {
        let url = encode_data_url("image/webp", b"RIFF....WEBP");
        let (mime, bytes) = parse_data_url(&url, u64::MAX).unwrap();

        assert_eq!(mime, "image/webp");
        assert_eq!(bytes, b"RIFF....WEBP");
    }

    #[test]
    fn parse_rejects_missing_marker() {
        assert!(matches!(
            parse_data_url("data:image/png,abcd", u64::MAX),
            Err(ConverterError::ConversionFailure(_))
        ));
        assert!(header_len("image/png;base64,abcd").is_none());
    }

    #[test]
    fn parse_rejects_large_payload_before_decode() {
        let url = format!("data:image/png;base64,{}", "A".repeat(1024 * 1024));
        let result = parse_data_url(&url, 32);

        assert!(matches!(result, Err(ConverterError::ResourceLimit(_))));
    }

    proptest! {
        #[test]
        fn estimate_follows_three_quarters_rule(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let url = encode_data_url("image/jpeg", &bytes);
            let header = header_len(&url).unwrap();
            let expected = ((url.len() - header) as f64 * 0.75).round() as u64;

            prop_assert_eq!(estimate_size(&url).unwrap(), expected);
            // 不修正填充：估算值只会 ≥ 真实值，且最多多出 2 字节
            let estimated = estimate_size(&url).unwrap();
            prop_assert!(estimated >= bytes.len() as u64);
            prop_assert!(estimated <= bytes.len() as u64 + 2);
        }
    }
}
