use domain::MeasurementValue;

/// 米每秒到节的换算系数。
pub const MS_TO_KNOTS: f64 = 1.94384;

/// 字段转换错误。
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("invalid float for {0}: {1}")]
    BadFloat(String, String),
    #[error("invalid integer for {0}: {1}")]
    BadInt(String, String),
}

/// 字段值类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Integer,
}

/// 单个测量字段的静态描述。
#[derive(Debug, Clone, Copy)]
pub struct MeasurementSpec {
    pub source_key: &'static str,
    pub kind: FieldKind,
    pub unit_transform: Option<fn(f64) -> f64>,
    pub subject: &'static str,
    pub compound: bool,
}

fn ms_to_knots(value: f64) -> f64 {
    value * MS_TO_KNOTS
}

/// 全部已识别的测量字段。
///
/// lat/lon/alt 共享 location_fix 主题，合并为一条位置消息发布；
/// 其余字段各自独立发布，主题互不重复。
pub static MEASUREMENT_SPECS: &[MeasurementSpec] = &[
    MeasurementSpec {
        source_key: "lat",
        kind: FieldKind::Float,
        unit_transform: None,
        subject: "location_fix",
        compound: true,
    },
    MeasurementSpec {
        source_key: "lon",
        kind: FieldKind::Float,
        unit_transform: None,
        subject: "location_fix",
        compound: true,
    },
    MeasurementSpec {
        source_key: "alt",
        kind: FieldKind::Float,
        unit_transform: None,
        subject: "location_fix",
        compound: true,
    },
    MeasurementSpec {
        source_key: "acc",
        kind: FieldKind::Float,
        unit_transform: None,
        subject: "location_fix_accuracy",
        compound: false,
    },
    MeasurementSpec {
        source_key: "hdop",
        kind: FieldKind::Float,
        unit_transform: None,
        subject: "location_fix_hdop",
        compound: false,
    },
    MeasurementSpec {
        source_key: "vdop",
        kind: FieldKind::Float,
        unit_transform: None,
        subject: "location_fix_vdop",
        compound: false,
    },
    MeasurementSpec {
        source_key: "pdop",
        kind: FieldKind::Float,
        unit_transform: None,
        subject: "location_fix_pdop",
        compound: false,
    },
    MeasurementSpec {
        source_key: "sat",
        kind: FieldKind::Integer,
        unit_transform: None,
        subject: "location_fix_satellites",
        compound: false,
    },
    MeasurementSpec {
        source_key: "dir",
        kind: FieldKind::Float,
        unit_transform: None,
        subject: "course_over_ground_deg",
        compound: false,
    },
    MeasurementSpec {
        source_key: "spd",
        kind: FieldKind::Float,
        unit_transform: Some(ms_to_knots),
        subject: "speed_over_ground_knots",
        compound: false,
    },
    MeasurementSpec {
        source_key: "batt",
        kind: FieldKind::Float,
        unit_transform: None,
        subject: "battery_percent",
        compound: false,
    },
];

/// 按描述把字段原文转换为类型化测量值（含单位换算）。
pub fn convert(spec: &MeasurementSpec, raw: &str) -> Result<MeasurementValue, ConvertError> {
    match spec.kind {
        FieldKind::Float => {
            let mut value = raw.trim().parse::<f64>().map_err(|err| {
                ConvertError::BadFloat(spec.source_key.to_string(), err.to_string())
            })?;
            if let Some(transform) = spec.unit_transform {
                value = transform(value);
            }
            Ok(MeasurementValue::F64(value))
        }
        FieldKind::Integer => {
            let value = raw.trim().parse::<i32>().map_err(|err| {
                ConvertError::BadInt(spec.source_key.to_string(), err.to_string())
            })?;
            Ok(MeasurementValue::I32(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn spec_for(key: &str) -> &'static MeasurementSpec {
        MEASUREMENT_SPECS
            .iter()
            .find(|spec| spec.source_key == key)
            .expect("known key")
    }

    #[test]
    fn published_subjects_are_unique() {
        let mut subjects = HashSet::new();
        for spec in MEASUREMENT_SPECS {
            if spec.compound {
                subjects.insert(spec.subject);
            } else {
                assert!(subjects.insert(spec.subject), "duplicate {}", spec.subject);
            }
        }
        assert!(subjects.contains("location_fix"));
    }

    #[test]
    fn compound_group_is_exactly_position() {
        let compound: Vec<&str> = MEASUREMENT_SPECS
            .iter()
            .filter(|spec| spec.compound)
            .map(|spec| spec.source_key)
            .collect();
        assert_eq!(compound, vec!["lat", "lon", "alt"]);
    }

    #[test]
    fn converts_float_field() {
        let value = convert(spec_for("hdop"), "1.2").expect("convert");
        assert_eq!(value, MeasurementValue::F64(1.2));
    }

    #[test]
    fn converts_speed_to_knots() {
        let value = convert(spec_for("spd"), "10.0").expect("convert");
        assert_eq!(value, MeasurementValue::F64(19.4384));
    }

    #[test]
    fn converts_integer_field() {
        let value = convert(spec_for("sat"), "9").expect("convert");
        assert_eq!(value, MeasurementValue::I32(9));
    }

    #[test]
    fn rejects_non_numeric_float() {
        let err = convert(spec_for("hdop"), "abc").expect_err("must fail");
        assert!(matches!(err, ConvertError::BadFloat(_, _)));
    }

    #[test]
    fn rejects_fractional_satellite_count() {
        let err = convert(spec_for("sat"), "7.5").expect_err("must fail");
        assert!(matches!(err, ConvertError::BadInt(_, _)));
    }
}
