//! 경과 시간 태거 — 마지막 매치 이후 흐른 시간을 속성으로 추가
//!
//! 설정된 선택 매처가 모두 일치할 때마다 직전 매치로부터의 경과 시간을
//! 초 단위로 계산해 메시지 JSON에 추가합니다. 같은 `(host, tag)` 키의
//! 주기적 레코드 사이 간격을 관측할 때 사용합니다.

use std::time::{Duration, Instant};

use ceelog_core::{CeeValue, Matcher, SyslogMsg, TransformError, Transformer};

use crate::mutator::all_match;

use super::tracker::Tracker;

/// 기본 속성 키
const DEFAULT_KEY: &str = "since";

/// 경과 시간 태거 변환기
///
/// 첫 매치는 기준 시각을 현재로 초기화하므로 `0`을 기록합니다.
/// TTL을 넘긴 키는 리퍼가 제거해, 오래 침묵한 키는 다시 `0`부터
/// 시작합니다.
pub struct TimeSinceTransformer {
    selects: Vec<Box<dyn Matcher>>,
    key: String,
    tracker: Tracker,
}

impl TimeSinceTransformer {
    /// TTL과 선택 매처들로 변환기를 생성합니다.
    pub fn new(ttl: Duration, selects: Vec<Box<dyn Matcher>>) -> Self {
        Self {
            selects,
            key: DEFAULT_KEY.to_owned(),
            tracker: Tracker::new(ttl, ttl / 2),
        }
    }

    /// 추가할 속성 키를 변경합니다 (기본값 `"since"`).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl Transformer for TimeSinceTransformer {
    fn transform(&self, mut msg: SyslogMsg) -> Result<SyslogMsg, TransformError> {
        if !all_match(&self.selects, &msg) {
            return Ok(msg);
        }

        let key = msg.msg_id();
        let elapsed = self.tracker.with_lock(|entries| {
            let now = Instant::now();
            let slot = entries.entry(key).or_insert(now);
            let elapsed = now.duration_since(*slot);
            *slot = now;
            elapsed
        });

        msg.add_tag(
            self.key.clone(),
            CeeValue::Number(elapsed.as_secs_f64().to_string()),
        );
        Ok(msg)
    }
}
