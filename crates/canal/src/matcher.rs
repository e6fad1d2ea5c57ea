//! 매처 — 메시지에 대한 술어
//!
//! 변환기 안에 조합되어 선택/시작/종료 조건을 판정합니다.

use ceelog_core::{Matcher, SyslogMsg};

/// 태그 문자열 일치 매처
///
/// 재구성된 태그 문자열(`"kernel:"`, `"cron[99]:"` 등)과의
/// 완전 일치를 판정합니다.
pub struct TagMatcher {
    tag: String,
}

impl TagMatcher {
    /// 주어진 태그 문자열과 일치하는 매처를 생성합니다.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Matcher for TagMatcher {
    fn matches(&self, msg: &SyslogMsg) -> bool {
        msg.tag.to_string() == self.tag
    }
}

/// 내용 부분 문자열 매처
pub struct ContentContainsMatcher {
    needle: String,
}

impl ContentContainsMatcher {
    /// 내용에 주어진 문자열이 포함되면 일치하는 매처를 생성합니다.
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl Matcher for ContentContainsMatcher {
    fn matches(&self, msg: &SyslogMsg) -> bool {
        msg.content.contains(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    fn kernel_line() -> SyslogMsg {
        parse_bytes(
            b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: [15803005.789011] ------------[ cut here ]------------\n",
        )
        .unwrap()
    }

    #[test]
    fn tag_matcher_is_exact() {
        let msg = kernel_line();
        assert!(TagMatcher::new("kernel:").matches(&msg));
        assert!(!TagMatcher::new("kernel").matches(&msg));
        assert!(!TagMatcher::new("kern").matches(&msg));
    }

    #[test]
    fn content_contains_matcher() {
        let msg = kernel_line();
        assert!(ContentContainsMatcher::new("[ cut here ]").matches(&msg));
        assert!(!ContentContainsMatcher::new("[ end trace").matches(&msg));
    }
}
