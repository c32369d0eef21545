use domain::RawFieldMap;

/// 解码错误。
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("body is not valid UTF-8: {0}")]
    NotUtf8(String),
}

/// 解码 form-urlencoded 请求体为原始字段表。
///
/// 只做字段切分：按 '&' 分段，每段按首个 '=' 拆成键值；
/// 不含 '=' 的段直接丢弃，重复键后者覆盖前者。
/// 值保持原文，不做百分号转义解码。
pub fn decode_form(body: &[u8]) -> Result<RawFieldMap, DecodeError> {
    let text = std::str::from_utf8(body).map_err(|err| DecodeError::NotUtf8(err.to_string()))?;

    let mut fields = RawFieldMap::new();
    for segment in text.split('&') {
        let (key, value) = match segment.split_once('=') {
            Some(pair) => pair,
            None => continue,
        };
        fields.insert(key.to_string(), value.to_string());
    }

    Ok(fields)
}
