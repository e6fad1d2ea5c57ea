//! 범위 태거 — 시작/종료 이벤트 사이의 레코드를 일괄 태깅
//!
//! 선택 조건에 맞는 레코드가 시작 매치와 종료 매치 사이에 들어오면
//! `(host, tag)` 상관 키 단위로 전부 태깅합니다. 여러 줄로 흩어지는
//! 커널 트레이스류 버스트를 하나의 태그로 묶을 때 사용합니다.

use std::time::{Duration, Instant};

use ceelog_core::{Matcher, Mutator, SyslogMsg, TransformError, Transformer};

use super::tracker::Tracker;

/// 범위 태거 변환기
///
/// 동작 규칙:
/// - 선택 매처에 맞지 않는 레코드는 상태를 건드리지 않고 그대로 지나간다.
/// - 키가 추적 중이면 그 레코드는 태깅되고, 종료 매치면 키가 제거된다.
/// - 키가 없고 시작 매치면 키가 등록되고 그 레코드부터 태깅된다.
/// - 시작과 종료 매처가 같으면 매치마다 열림/닫힘이 교대한다 — 키가
///   추적 중인 레코드는 항상 태깅된다는 규칙의 의도된 귀결이다.
/// - TTL `T`를 넘긴 키는 리퍼가 `T/2` 간격으로 제거한다. 리퍼는 태깅하지
///   않고 퇴거만 한다.
pub struct TagRangeTransformer {
    select: Box<dyn Matcher>,
    start: Box<dyn Matcher>,
    end: Box<dyn Matcher>,
    tagger: Box<dyn Mutator>,
    tracker: Tracker,
}

impl TagRangeTransformer {
    /// 선택/시작/종료 매처, 태깅 뮤테이터, TTL로 변환기를 생성합니다.
    pub fn new(
        select: impl Matcher + 'static,
        start: impl Matcher + 'static,
        end: impl Matcher + 'static,
        tagger: impl Mutator + 'static,
        ttl: Duration,
    ) -> Self {
        Self {
            select: Box::new(select),
            start: Box::new(start),
            end: Box::new(end),
            tagger: Box::new(tagger),
            tracker: Tracker::new(ttl, ttl / 2),
        }
    }
}

impl Transformer for TagRangeTransformer {
    fn transform(&self, mut msg: SyslogMsg) -> Result<SyslogMsg, TransformError> {
        if !self.select.matches(&msg) {
            return Ok(msg);
        }

        let key = msg.msg_id();
        self.tracker.with_lock(|entries| {
            let tag_it = if entries.contains_key(&key) {
                if self.end.matches(&msg) {
                    entries.remove(&key);
                } else {
                    // 진행 중인 범위는 진행 이벤트마다 수명이 연장된다
                    entries.insert(key, Instant::now());
                }
                true
            } else if self.start.matches(&msg) {
                entries.insert(key, Instant::now());
                true
            } else {
                false
            };

            if tag_it {
                self.tagger.mutate(&mut msg)?;
            }
            Ok::<(), TransformError>(())
        })?;
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{ContentContainsMatcher, TagMatcher};
    use crate::mutator::TagArrayMutator;
    use crate::parser::parse_bytes;

    fn kernel_tagger(ttl: Duration) -> TagRangeTransformer {
        TagRangeTransformer::new(
            TagMatcher::new("kernel:"),
            ContentContainsMatcher::new("[ cut here ]"),
            ContentContainsMatcher::new("[ end trace"),
            TagArrayMutator::new("tags", "trace"),
            ttl,
        )
    }

    #[test]
    fn kernel_trace_window_is_tagged() {
        let cases: &[(&[u8], bool)] = &[
            (
                b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: [15803005.789010] this line is not part of the trace\n",
                false,
            ),
            (
                b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: [15803005.789011] ------------[ cut here ]------------\n",
                true,
            ),
            (
                b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: [15803005.789013] this  line should be part of the trace\n",
                true,
            ),
            (
                b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: [15803005.789015] this line should also be part of the trace\n",
                true,
            ),
            (
                b"<4>2016-03-08T14:59:36.293918+00:00 host.example.com kernel: [15803005.789433] ---[ end trace 999999999 ]---\n",
                true,
            ),
            (
                b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: [15803005.789010] this line is not part of the trace\n",
                false,
            ),
        ];

        let tagger = kernel_tagger(Duration::from_secs(60));
        for (i, (input, want_tagged)) in cases.iter().enumerate() {
            let msg = parse_bytes(input).unwrap();
            let out = tagger.transform(msg).unwrap();
            assert_eq!(
                out.json_values.contains_key("tags"),
                *want_tagged,
                "case {i}"
            );
        }
    }

    #[test]
    fn select_miss_does_not_touch_state() {
        let tagger = kernel_tagger(Duration::from_secs(60));

        // 범위를 연다
        let open = parse_bytes(
            b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: a[ cut here ]b\n",
        )
        .unwrap();
        tagger.transform(open).unwrap();

        // 다른 태그의 레코드는 상태를 건드리지 않는다
        let unrelated = parse_bytes(
            b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com cron: unrelated\n",
        )
        .unwrap();
        let out = tagger.transform(unrelated).unwrap();
        assert!(!out.json_values.contains_key("tags"));

        // 범위는 여전히 열려 있다
        let interior = parse_bytes(
            b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: interior\n",
        )
        .unwrap();
        let out = tagger.transform(interior).unwrap();
        assert!(out.json_values.contains_key("tags"));
    }

    #[test]
    fn coinciding_start_and_end_alternate() {
        let tagger = TagRangeTransformer::new(
            TagMatcher::new("rsyslogd-pstats:"),
            ContentContainsMatcher::new("stats"),
            ContentContainsMatcher::new("stats"),
            TagArrayMutator::new("tags", "stats"),
            Duration::from_secs(60),
        );

        let line = b"<46>2016-03-08T14:59:36.293816+00:00 host.example.com rsyslogd-pstats: stats line\n";
        // 첫 레코드가 범위를 열고, 둘째가 닫고, 패턴이 교대한다.
        // 키가 추적 중인 레코드는 항상 태깅되므로 모든 레코드가 태깅된다.
        for _ in 0..4 {
            let msg = parse_bytes(line).unwrap();
            let out = tagger.transform(msg).unwrap();
            assert!(out.json_values.contains_key("tags"));
        }
    }

    #[test]
    fn expired_range_requires_fresh_open() {
        let tagger = kernel_tagger(Duration::from_millis(40));

        let open = parse_bytes(
            b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: x[ cut here ]x\n",
        )
        .unwrap();
        let out = tagger.transform(open).unwrap();
        assert!(out.json_values.contains_key("tags"));

        // TTL이 지나 리퍼가 키를 제거할 때까지 기다린다
        std::thread::sleep(Duration::from_millis(150));

        let interior = parse_bytes(
            b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: interior line\n",
        )
        .unwrap();
        let out = tagger.transform(interior).unwrap();
        assert!(
            !out.json_values.contains_key("tags"),
            "expired range must not tag until a fresh open event"
        );
    }

    #[test]
    fn mutator_failure_surfaces_as_transform_error() {
        let tagger = kernel_tagger(Duration::from_secs(60));
        // tags 키에 배열이 아닌 값이 있는 CEE 레코드
        let msg = parse_bytes(
            b"<4>2016-03-08T14:59:36.293816+00:00 host.example.com kernel: @cee:{\"msg\":\"[ cut here ]\",\"tags\":\"oops\"}\n",
        )
        .unwrap();
        // content가 JSON 텍스트이므로 start 매처가 msg 내용에 매치해야 한다
        assert!(msg.content.contains("[ cut here ]"));
        let err = tagger.transform(msg).unwrap_err();
        assert!(matches!(err, TransformError::Mutate(_)));
    }
}
