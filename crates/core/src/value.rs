//! CEE JSON 값 트리 — 숫자 정밀도와 키 순서를 보존하는 동적 값
//!
//! 메시지의 `json_values`는 이종 값을 담습니다. 숫자는 십진 텍스트
//! 그대로 보관해 `3.0000000000000000000000000000000001` 같은 값도
//! 정밀도 손실 없이 왕복하고, 맵은 삽입 순서를 보존해 재구성 출력이
//! 입력과 같은 키 순서를 갖습니다.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

/// 삽입 순서가 보존되는 최상위 JSON 객체
pub type CeeMap = IndexMap<String, CeeValue>;

/// CEE JSON 본문의 한 값
#[derive(Debug, Clone, PartialEq)]
pub enum CeeValue {
    /// JSON null
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number — 십진 텍스트 그대로 보관
    Number(String),
    /// JSON string
    Text(String),
    /// JSON array
    List(Vec<CeeValue>),
    /// JSON object (삽입 순서 보존)
    Map(CeeMap),
}

impl CeeValue {
    /// `serde_json::Value`에서 변환합니다.
    ///
    /// `arbitrary_precision` 기능 덕에 `Number`의 `to_string()`은 입력
    /// 텍스트를 그대로 돌려줍니다.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.to_string()),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// 문자열 값이면 그 내용을 반환합니다.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 배열 값이면 그 내용을 반환합니다.
    pub fn as_list(&self) -> Option<&[CeeValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// 객체 값이면 그 내용을 반환합니다.
    pub fn as_map(&self) -> Option<&CeeMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for CeeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CeeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for CeeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for CeeValue {
    fn from(value: f64) -> Self {
        Self::Number(value.to_string())
    }
}

impl From<i64> for CeeValue {
    fn from(value: i64) -> Self {
        Self::Number(value.to_string())
    }
}

impl Serialize for CeeValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            // 숫자 텍스트가 더는 유효한 JSON 숫자가 아니면 문자열로 강등한다
            Self::Number(text) => match serde_json::Number::from_str(text) {
                Ok(number) => number.serialize(serializer),
                Err(_) => serializer.serialize_str(text),
            },
            Self::Text(s) => serializer.serialize_str(s),
            Self::List(items) => serializer.collect_seq(items),
            Self::Map(map) => serializer.collect_map(map),
        }
    }
}

/// 값 맵을 결정적 JSON 객체 텍스트로 렌더링합니다.
///
/// 키는 삽입 순서대로 출력됩니다.
pub fn render_json(values: &CeeMap) -> String {
    // 문자열 키와 위에서 강등 처리된 숫자만 있으므로 직렬화는 실패하지 않는다
    serde_json::to_string(values).unwrap_or_default()
}

/// JSON 객체 텍스트를 값 맵으로 디코딩합니다.
///
/// 최상위가 객체가 아니거나 파싱에 실패하면 `None`입니다.
pub fn decode_object(text: &str) -> Option<CeeMap> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => Some(
            map.into_iter()
                .map(|(key, value)| (key, CeeValue::from_json(value)))
                .collect(),
        ),
        _ => None,
    }
}

/// 최상위 키만 디코딩하는 얕은 디코더입니다.
///
/// 스칼라 값은 [`decode_object`]와 동일하게 디코딩되지만, 중첩된
/// 객체/배열은 원본 JSON 텍스트를 담은 문자열로 남아 내부 탐색이
/// 불가능합니다. 최상위 키만 읽는 소비자에게는 의미가 같습니다.
pub fn decode_object_shallow(text: &str) -> Option<CeeMap> {
    let raw: IndexMap<String, &serde_json::value::RawValue> = serde_json::from_str(text).ok()?;
    let mut values = CeeMap::with_capacity(raw.len());
    for (key, fragment) in raw {
        let fragment = fragment.get();
        let value = match fragment.trim_start().as_bytes().first() {
            Some(b'{') | Some(b'[') => CeeValue::Text(fragment.to_owned()),
            _ => CeeValue::from_json(serde_json::from_str(fragment).ok()?),
        };
        values.insert(key, value);
    }
    Some(values)
}
