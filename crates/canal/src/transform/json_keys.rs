//! JSON 키 재작성 변환기
//!
//! CEE 메시지의 JSON 키에서 특정 문자열을 찾아 치환합니다. 키에 마침표를
//! 허용하지 않는 Elasticsearch 2.x 계열 저장소로 legacy syslog를 넘길 때
//! 사용합니다 (예: `.` → `_`).

use ceelog_core::value::{render_json, CeeMap, CeeValue};
use ceelog_core::{SyslogMsg, TransformError, Transformer};

/// JSON 키 재작성 변환기
///
/// 치환 맵을 JSON 트리의 모든 깊이의 모든 키에 적용합니다. 값은 그대로
/// 복사되며 트리 모양도 보존됩니다.
pub struct JsonKeyTransformer {
    replacements: Vec<(String, String)>,
    require_cee: bool,
}

impl JsonKeyTransformer {
    /// 빌더를 시작합니다.
    pub fn builder() -> JsonKeyTransformerBuilder {
        JsonKeyTransformerBuilder {
            replacements: Vec::new(),
            require_cee: true,
        }
    }

    fn rewrite_key(&self, key: &str) -> String {
        self.replacements
            .iter()
            .fold(key.to_owned(), |key, (old, new)| key.replace(old, new))
    }

    fn rewrite_map(&self, map: &CeeMap) -> CeeMap {
        map.iter()
            .map(|(key, value)| (self.rewrite_key(key), self.rewrite_value(value)))
            .collect()
    }

    fn rewrite_value(&self, value: &CeeValue) -> CeeValue {
        match value {
            CeeValue::Map(map) => CeeValue::Map(self.rewrite_map(map)),
            CeeValue::List(items) => {
                CeeValue::List(items.iter().map(|item| self.rewrite_value(item)).collect())
            }
            leaf => leaf.clone(),
        }
    }
}

/// [`JsonKeyTransformer`] 빌더
pub struct JsonKeyTransformerBuilder {
    replacements: Vec<(String, String)>,
    require_cee: bool,
}

impl JsonKeyTransformerBuilder {
    /// 치환 쌍을 추가합니다. 여러 번 호출해 맵을 구성합니다.
    pub fn replace(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.replacements.push((old.into(), new.into()));
        self
    }

    /// CEE가 아니어도 JSON만 있으면 변환을 허용합니다.
    ///
    /// 기본 동작은 CEE 메시지가 아니면 `NotCee`로 실패합니다.
    pub fn allow_bare_json(mut self) -> Self {
        self.require_cee = false;
        self
    }

    /// 변환기를 완성합니다. 치환 맵이 비었거나 빈 패턴이 있으면
    /// 실패합니다.
    pub fn build(self) -> Result<JsonKeyTransformer, TransformError> {
        if self.replacements.is_empty() {
            return Err(TransformError::Config(
                "replacement map is empty".to_owned(),
            ));
        }
        if self.replacements.iter().any(|(old, _)| old.is_empty()) {
            return Err(TransformError::Config(
                "replacement pattern is empty".to_owned(),
            ));
        }
        Ok(JsonKeyTransformer {
            replacements: self.replacements,
            require_cee: self.require_cee,
        })
    }
}

impl Transformer for JsonKeyTransformer {
    fn transform(&self, mut msg: SyslogMsg) -> Result<SyslogMsg, TransformError> {
        if self.require_cee && !msg.is_cee {
            return Err(TransformError::NotCee);
        }
        if !msg.is_json {
            return Err(TransformError::NoJson);
        }

        let rewritten = self.rewrite_map(&msg.json_values);
        msg.content = render_json(&rewritten);
        msg.json_values = rewritten;
        Ok(msg)
    }
}
