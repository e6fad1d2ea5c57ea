//! 뮤테이터 — 메시지 제자리 수정 연산

use ceelog_core::{CeeValue, Matcher, MutateError, Mutator, SyslogMsg};

/// 태그 배열 뮤테이터
///
/// `key`의 배열에 값을 추가합니다. 키가 없으면 배열을 새로 만들고,
/// 메시지가 CEE가 아니었다면 CEE로 승격됩니다. 키에 배열이 아닌 값이
/// 있으면 실패합니다.
pub struct TagArrayMutator {
    key: String,
    value: String,
}

impl TagArrayMutator {
    /// 키와 값으로 새 뮤테이터를 생성합니다.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Mutator for TagArrayMutator {
    fn mutate(&self, msg: &mut SyslogMsg) -> Result<(), MutateError> {
        msg.add_tag_array(self.key.clone(), CeeValue::Text(self.value.clone()))
    }
}

/// 매처 목록이 모두 일치하는지 판정합니다.
pub(crate) fn all_match(matchers: &[Box<dyn Matcher>], msg: &SyslogMsg) -> bool {
    matchers.iter().all(|matcher| matcher.matches(msg))
}
