use std::collections::HashMap;

/// 解码后的原始字段表：字段名到字符串值。
pub type RawFieldMap = HashMap<String, String>;

/// 字段转换后的测量值。
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementValue {
    F64(f64),
    I32(i32),
}

impl MeasurementValue {
    /// 浮点视图：整数值按 f64 返回。
    pub fn as_f64(&self) -> f64 {
        match self {
            MeasurementValue::F64(value) => *value,
            MeasurementValue::I32(value) => f64::from(*value),
        }
    }
}
