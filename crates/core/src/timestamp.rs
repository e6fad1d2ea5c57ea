//! 메시지 타임스탬프 — 와이어 형식을 보존하는 시각 값
//!
//! RFC 3164 타임스탬프는 단일 형식이 아닙니다. rsyslog 계열의
//! RFC 3339 유사 형식과 네 가지 레거시 BSD 형식을 순서대로 시도하며,
//! 어떤 형식으로 파싱되었는지와 소비한 원본 텍스트를 함께 보존합니다.
//! 직렬화는 보존된 텍스트를 그대로 재출력하므로, 소수점 자릿수가 몇이든
//! 바이트 단위 왕복이 성립합니다.

use std::fmt;

use chrono::format::{parse_and_remainder, Parsed, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone};

/// 인식되는 타임스탬프 형식
///
/// 파서는 rsyslog 형식을 싸구려 패턴 검사로 먼저 가려낸 뒤,
/// 레거시 형식을 [`TimeFormat::legacy_dialects`] 순서대로 시도합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `2006-01-02T15:04:05.999999-07:00` (rsyslog RFC 3339 계열)
    Rsyslog,
    /// `Mon Jan  2 15:04:05 MST 2006`
    UnixDate,
    /// `Mon Jan  2 15:04:05 2006`
    AnsiC,
    /// `Mon Jan  2 15:04:05` (연도 없음)
    AscTime,
    /// `Jan  2 15:04:05` / `Jan 02 15:04:05` (연도 없음)
    Stamp,
}

impl TimeFormat {
    /// chrono 포맷 패턴을 반환합니다.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Rsyslog => "%Y-%m-%dT%H:%M:%S%.f%:z",
            Self::UnixDate => "%a %b %e %H:%M:%S %Z %Y",
            Self::AnsiC => "%a %b %e %H:%M:%S %Y",
            Self::AscTime => "%a %b %e %H:%M:%S",
            // %e는 공백/0 패딩을 모두 받아들이므로 두 철자를 한 형식이 덮는다
            Self::Stamp => "%b %e %H:%M:%S",
        }
    }

    /// 레거시 형식을 시도 순서대로 반환합니다.
    pub fn legacy_dialects() -> &'static [TimeFormat] {
        &[
            Self::UnixDate,
            Self::AnsiC,
            Self::AscTime,
            Self::Stamp,
        ]
    }
}

/// 파싱된 시각과 그것을 만들어 낸 형식, 소비한 원본 텍스트
#[derive(Debug, Clone, PartialEq)]
pub struct MsgTime {
    /// 파싱된 시각
    pub when: DateTime<FixedOffset>,
    /// 시각을 만들어 낸 와이어 형식
    pub format: TimeFormat,
    text: String,
}

impl MsgTime {
    /// rsyslog 형식 토큰을 파싱합니다. 토큰 전체가 소비되어야 합니다.
    pub fn parse_rsyslog(token: &str) -> Option<Self> {
        let when = DateTime::parse_from_str(token, TimeFormat::Rsyslog.pattern()).ok()?;
        Some(Self {
            when,
            format: TimeFormat::Rsyslog,
            text: token.to_owned(),
        })
    }

    /// 레거시 형식을 순서대로 시도하고, 매칭된 시각과 소비한 바이트 수를
    /// 반환합니다.
    ///
    /// 연도가 없는 형식은 현재 연도로 보정합니다. 텍스트에 존재하는 명시적
    /// 오프셋이 항상 이기고, 없으면 `default_offset`이, 그것도 없으면 UTC가
    /// 적용됩니다.
    pub fn parse_legacy(
        input: &str,
        default_offset: Option<FixedOffset>,
    ) -> Option<(Self, usize)> {
        for format in TimeFormat::legacy_dialects() {
            let mut parsed = Parsed::new();
            let Ok(rest) =
                parse_and_remainder(&mut parsed, input, StrftimeItems::new(format.pattern()))
            else {
                continue;
            };
            // 타임스탬프 토큰은 필드 구분 공백 앞에서 끝나야 한다.
            // 연도 자리가 숫자 호스트의 앞부분을 집어삼키는 것을 막는다.
            if !rest.is_empty() && !rest.starts_with(' ') {
                continue;
            }
            let Some(when) = assemble(&parsed, default_offset) else {
                continue;
            };
            let consumed = input.len() - rest.len();
            let time = Self {
                when,
                format: *format,
                text: input[..consumed].to_owned(),
            };
            return Some((time, consumed));
        }
        None
    }

    /// 주어진 시각을 해당 형식으로 렌더링하여 만듭니다.
    pub fn with_format(when: DateTime<FixedOffset>, format: TimeFormat) -> Self {
        Self {
            when,
            format,
            text: when.format(format.pattern()).to_string(),
        }
    }

    /// rsyslog 형식의 현재 시각 타임스탬프를 만듭니다.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().fixed_offset())
    }

    /// rsyslog 형식으로 렌더링되는 타임스탬프를 만듭니다.
    pub fn from_datetime(when: DateTime<FixedOffset>) -> Self {
        Self::with_format(when, TimeFormat::Rsyslog)
    }

    /// 와이어에 기록될 텍스트를 반환합니다.
    ///
    /// 파싱으로 만들어진 값이면 소비했던 원본 바이트 그대로입니다.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `/dev/log` 계열 로컬 형식에 쓰이는 축약 렌더링을 반환합니다.
    pub fn local_stamp(&self) -> String {
        self.when.format("%b %e %H:%M:%S").to_string()
    }
}

impl fmt::Display for MsgTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// `Parsed` 필드에서 시각을 조립합니다.
///
/// chrono의 `to_naive_datetime` 계열은 요일과 날짜의 일치를 검증하는데,
/// 연도 없는 형식에 현재 연도를 보정하면 원문의 요일과 어긋날 수 있어
/// 요일 검증을 우회해 필드에서 직접 조립합니다.
fn assemble(parsed: &Parsed, default_offset: Option<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let year = match parsed.year() {
        Some(year) => year,
        None => Local::now().year(),
    };
    let month = parsed.month()?;
    let day = parsed.day()?;
    let hour = parsed.hour_div_12()? * 12 + parsed.hour_mod_12()?;
    let minute = parsed.minute()?;
    let second = parsed.second().unwrap_or(0);
    let nanosecond = parsed.nanosecond().unwrap_or(0);

    let offset_secs = parsed
        .offset()
        .or_else(|| default_offset.map(|off| off.local_minus_utc()))
        .unwrap_or(0);

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanosecond)?;
    let offset = FixedOffset::east_opt(offset_secs)?;
    offset.from_local_datetime(&date.and_time(time)).single()
}
