//! RFC 3164 + CEE 파서
//!
//! 버퍼를 왼쪽에서 오른쪽으로 한 번만 훑으며 priority → time → host →
//! tag → CEE 검출 → content 순서로 필드를 추출합니다. 각 단계는 자신이
//! 받은 서브슬라이스를 소비하고 전진량과 추출 필드를 돌려줄 뿐, 전역
//! 커서를 공유하지 않습니다. 부분 성공은 없습니다 — 에러가 나면 그
//! 레코드의 부분 상태는 모두 버려집니다.
//!
//! # 사용 예시
//! ```ignore
//! use ceelog_canal::Parser;
//!
//! let parser = Parser::new().sanitize_program();
//! let msg = parser.parse(b"<191>2006-01-02T15:04:05.999999-07:00 host test: hello\n")?;
//! assert_eq!(msg.host, "host");
//! ```

use chrono::FixedOffset;

use ceelog_core::message::{SyslogMsg, Tag};
use ceelog_core::timestamp::MsgTime;
use ceelog_core::value::{self, CeeMap};
use ceelog_core::{ParseError, Priority};

/// PRI 숫자부의 최대 자릿수
const MAX_PRI_DIGITS: usize = 3;
/// `YYYY-MM-DD` 날짜 스탬프 길이
const DATESTAMP_LEN: usize = 10;
/// 레거시 타임스탬프 후보로 살펴볼 최대 바이트 수
const LEGACY_SCAN_LIMIT: usize = 32;
/// CEE 쿠키 리터럴
const CEE_COOKIE: &[u8] = b"@cee:";

/// RFC 3164 + CEE 파서
///
/// 옵션은 빌더 메서드로 지정합니다. 파서 자체는 상태가 없어 여러
/// 레코드와 여러 태스크에서 재사용할 수 있습니다.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    require_terminator: bool,
    no_hostname: bool,
    dont_parse_json: bool,
    sanitize_program: bool,
    shallow_json: bool,
    location: Option<FixedOffset>,
}

impl Parser {
    /// 기본 설정의 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 내용이 `\n`으로 끝나지 않으면 `BadContent`로 거부합니다.
    pub fn require_terminator(mut self) -> Self {
        self.require_terminator = true;
        self
    }

    /// 호스트 필드를 기대하지 않고 로컬 호스트명을 대신 사용합니다.
    pub fn no_hostname(mut self) -> Self {
        self.no_hostname = true;
        self
    }

    /// 내용의 JSON 본문을 디코딩하지 않고 원문 그대로 유지합니다.
    pub fn dont_parse_json(mut self) -> Self {
        self.dont_parse_json = true;
        self
    }

    /// 존 정보가 없는 타임스탬프 형식에 적용할 기본 오프셋을 지정합니다.
    ///
    /// 텍스트에 존재하는 명시적 존이 항상 이깁니다.
    pub fn location(mut self, offset: FixedOffset) -> Self {
        self.location = Some(offset);
        self
    }

    /// 프로그램 이름의 디렉터리 접두(`/.../`)를 제거합니다.
    ///
    /// 이 옵션이 없으면 태그 안의 슬래시는 `BadTag`입니다.
    pub fn sanitize_program(mut self) -> Self {
        self.sanitize_program = true;
        self
    }

    /// 최상위 키만 디코딩하는 얕은 JSON 디코더를 사용합니다.
    ///
    /// 중첩 객체/배열은 내부 탐색이 불가능한 원문 텍스트로 남습니다.
    /// 최상위 키만 읽는 소비자에게는 의미가 같습니다.
    pub fn shallow_json(mut self) -> Self {
        self.shallow_json = true;
        self
    }

    /// `\n`으로 끝날 수 있는 바이트 슬라이스를 메시지로 파싱합니다.
    pub fn parse(&self, buf: &[u8]) -> Result<SyslogMsg, ParseError> {
        let mut cur = 0;

        let (advance, pri) = parse_pri(buf).map_err(|e| e.offset_by(cur))?;
        cur += advance;

        let (advance, time) = self.parse_time(&buf[cur..]).map_err(|e| e.offset_by(cur))?;
        cur += advance;

        let host = if self.no_hostname {
            local_hostname(cur)?
        } else {
            let (advance, host) = parse_host(&buf[cur..]).map_err(|e| e.offset_by(cur))?;
            cur += advance;
            host
        };

        let (advance, tag) =
            parse_tag(&buf[cur..], self.sanitize_program).map_err(|e| e.offset_by(cur))?;
        cur += advance;

        let (advance, cee_prefix) = parse_cee(&buf[cur..]);
        cur += advance;
        let mut is_cee = cee_prefix.is_some();

        let (_advance, content) = parse_content(&buf[cur..], self.require_terminator)
            .map_err(|e| e.offset_by(cur))?;

        let mut is_json = false;
        let mut json_values = CeeMap::new();
        if !self.dont_parse_json {
            let candidate = if is_cee {
                Some(content.as_str())
            } else {
                content
                    .trim_start_matches(' ')
                    .starts_with('{')
                    .then_some(content.as_str())
            };
            if let Some(text) = candidate {
                let decoded = if self.shallow_json {
                    value::decode_object_shallow(text)
                } else {
                    value::decode_object(text)
                };
                match decoded {
                    Some(values) => {
                        json_values = values;
                        is_json = true;
                    }
                    // 선언된 CEE의 JSON이 깨졌으면 플래그만 내린다.
                    // 캡처된 프리픽스는 남아 원본 바이트를 재현한다.
                    None => is_cee = false,
                }
            }
        }

        Ok(SyslogMsg {
            pri,
            time,
            host,
            tag,
            cee_prefix: cee_prefix.unwrap_or_default(),
            is_cee,
            is_json,
            content,
            json_values,
        })
    }

    fn parse_time(&self, buf: &[u8]) -> Result<(usize, MsgTime), ParseError> {
        // YYYY-MM-DD보다 짧은 타임스탬프 형식은 없다
        if buf.len() < DATESTAMP_LEN {
            return Err(ParseError::BadTime {
                offset: 0,
                reason: "buffer too short for any timestamp".to_owned(),
            });
        }

        if likely_datestamp(&buf[..DATESTAMP_LEN]) {
            let end = buf
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| ParseError::BadTime {
                    offset: 0,
                    reason: "unterminated timestamp".to_owned(),
                })?;
            let token = std::str::from_utf8(&buf[..end]).map_err(|_| ParseError::BadTime {
                offset: 0,
                reason: "timestamp is not valid utf-8".to_owned(),
            })?;
            let time = MsgTime::parse_rsyslog(token).ok_or_else(|| ParseError::BadTime {
                offset: 0,
                reason: format!("'{token}' is not an rsyslog timestamp"),
            })?;
            return Ok((end, time));
        }

        let limit = buf.len().min(LEGACY_SCAN_LIMIT);
        let ascii_len = buf[..limit].iter().take_while(|b| b.is_ascii()).count();
        let prefix = std::str::from_utf8(&buf[..ascii_len]).map_err(|_| ParseError::BadTime {
            offset: 0,
            reason: "timestamp is not valid utf-8".to_owned(),
        })?;
        let (time, consumed) =
            MsgTime::parse_legacy(prefix, self.location).ok_or_else(|| ParseError::BadTime {
                offset: 0,
                reason: "no recognized timestamp dialect".to_owned(),
            })?;
        Ok((consumed, time))
    }
}

/// 옵션 없는 기본 파서로 한 레코드를 파싱합니다.
pub fn parse_bytes(buf: &[u8]) -> Result<SyslogMsg, ParseError> {
    Parser::new().parse(buf)
}

fn parse_pri(buf: &[u8]) -> Result<(usize, Priority), ParseError> {
    if buf.first() != Some(&b'<') {
        return Err(ParseError::BadPriority {
            offset: 0,
            reason: "expected '<'".to_owned(),
        });
    }

    let digits_start = 1;
    let mut cur = digits_start;
    let mut val: u16 = 0;
    while let Some(&b) = buf.get(cur) {
        if !b.is_ascii_digit() {
            break;
        }
        if cur - digits_start == MAX_PRI_DIGITS {
            return Err(ParseError::BadPriority {
                offset: cur,
                reason: "more than three digits".to_owned(),
            });
        }
        val = val * 10 + u16::from(b - b'0');
        cur += 1;
    }

    if cur == digits_start {
        return Err(ParseError::BadPriority {
            offset: cur,
            reason: "no digits".to_owned(),
        });
    }
    if buf.get(cur) != Some(&b'>') {
        return Err(ParseError::BadPriority {
            offset: cur,
            reason: "unterminated priority".to_owned(),
        });
    }
    if buf[digits_start] == b'0' && cur - digits_start > 1 {
        return Err(ParseError::BadPriority {
            offset: digits_start,
            reason: "leading zero".to_owned(),
        });
    }

    let pri = Priority::from_value(val).map_err(|e| ParseError::BadPriority {
        offset: digits_start,
        reason: e.to_string(),
    })?;
    Ok((cur + 1, pri))
}

/// `dddd-dd-dd` 날짜 스탬프인지 싸게 확인합니다.
///
/// 통과하면 rsyslog 형식 전체 파싱에 CPU를 쓸 가치가 있다고 판단합니다.
fn likely_datestamp(buf: &[u8]) -> bool {
    debug_assert_eq!(buf.len(), DATESTAMP_LEN);
    buf[..4].iter().all(u8::is_ascii_digit)
        && buf[4] == b'-'
        && buf[5..7].iter().all(u8::is_ascii_digit)
        && buf[7] == b'-'
        && buf[8..10].iter().all(u8::is_ascii_digit)
}

fn parse_host(buf: &[u8]) -> Result<(usize, String), ParseError> {
    let mut cur = 0;
    while buf.get(cur) == Some(&b' ') {
        cur += 1;
    }
    if cur >= buf.len() {
        return Err(ParseError::BadHost {
            offset: cur,
            reason: "missing host".to_owned(),
        });
    }

    let start = cur;
    while let Some(&b) = buf.get(cur) {
        if b == b' ' {
            let host =
                std::str::from_utf8(&buf[start..cur]).map_err(|_| ParseError::BadHost {
                    offset: start,
                    reason: "host is not valid utf-8".to_owned(),
                })?;
            return Ok((cur, host.to_owned()));
        }
        cur += 1;
    }
    Err(ParseError::BadHost {
        offset: start,
        reason: "unterminated host".to_owned(),
    })
}

fn local_hostname(offset: usize) -> Result<String, ParseError> {
    let name = hostname::get().map_err(|e| ParseError::BadHost {
        offset,
        reason: format!("local hostname lookup failed: {e}"),
    })?;
    Ok(name.to_string_lossy().into_owned())
}

fn parse_tag(buf: &[u8], sanitize: bool) -> Result<(usize, Tag), ParseError> {
    let unterminated = |offset: usize| ParseError::BadTag {
        offset,
        reason: "unterminated tag".to_owned(),
    };
    let as_utf8 = |bytes: &[u8], offset: usize| {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| ParseError::BadTag {
                offset,
                reason: "tag is not valid utf-8".to_owned(),
            })
    };

    let mut cur = 0;
    while buf.get(cur) == Some(&b' ') {
        cur += 1;
    }
    if cur >= buf.len() {
        return Err(ParseError::BadTag {
            offset: cur,
            reason: "missing tag".to_owned(),
        });
    }

    let mut program: Option<String> = None;
    let mut pid: Option<String> = None;
    let mut has_colon = false;
    let mut bracketed = false;

    // `[program]` / `[program][pid]` 형태
    if buf[cur] == b'[' {
        bracketed = true;
        cur += 1;
        let pstart = cur;
        while buf.get(cur).is_some_and(|&b| b != b']') {
            cur += 1;
        }
        if cur >= buf.len() {
            return Err(ParseError::BadTag {
                offset: pstart,
                reason: "unterminated bracketed program".to_owned(),
            });
        }
        program = Some(as_utf8(&buf[pstart..cur], pstart)?);
        cur += 1;
    }

    let start = cur;
    let end = loop {
        let Some(&b) = buf.get(cur) else {
            return Err(unterminated(cur));
        };
        match b {
            b':' => {
                if program.is_none() {
                    program = Some(as_utf8(&buf[start..cur], start)?);
                }
                has_colon = true;
                cur += 1;
                break cur;
            }
            // 공백은 태그를 끝내되 소비하지 않는다 — 내용의 일부가 된다
            b' ' => {
                if program.is_none() {
                    program = Some(as_utf8(&buf[start..cur], start)?);
                }
                break cur;
            }
            b'[' => {
                if pid.is_some() {
                    return Err(ParseError::BadTag {
                        offset: cur,
                        reason: "multiple pid segments".to_owned(),
                    });
                }
                if program.is_none() {
                    program = Some(as_utf8(&buf[start..cur], start)?);
                }
                cur += 1;
                let pstart = cur;
                while buf.get(cur).is_some_and(|&b| b != b']') {
                    cur += 1;
                }
                if cur >= buf.len() {
                    return Err(ParseError::BadTag {
                        offset: pstart,
                        reason: "unterminated pid".to_owned(),
                    });
                }
                if cur == pstart {
                    return Err(ParseError::BadTag {
                        offset: pstart,
                        reason: "empty pid".to_owned(),
                    });
                }
                pid = Some(as_utf8(&buf[pstart..cur], pstart)?);
                cur += 1;
            }
            b'/' if !sanitize => {
                return Err(ParseError::BadTag {
                    offset: cur,
                    reason: "slash in program name".to_owned(),
                });
            }
            _ => {
                // 브래킷/pid 세그먼트 뒤에는 종결자만 올 수 있다
                if pid.is_some() || (bracketed && program.is_some()) {
                    return Err(ParseError::BadTag {
                        offset: cur,
                        reason: "unexpected byte after bracketed segment".to_owned(),
                    });
                }
                cur += 1;
            }
        }
    };

    let mut program = program.unwrap_or_default();
    if sanitize {
        if let Some(idx) = program.rfind('/') {
            program = program[idx + 1..].to_owned();
        }
    }

    let tag = Tag {
        program,
        pid,
        has_colon,
        bracketed,
    };
    Ok((end, tag))
}

/// 선택적 공백 하나 + `@cee:` 리터럴을 검출합니다.
///
/// 실패하면 아무것도 소비하지 않습니다 — 공백은 내용의 일부가 됩니다.
fn parse_cee(buf: &[u8]) -> (usize, Option<String>) {
    let mut cur = 0;
    if buf.first() == Some(&b' ') {
        cur = 1;
    }
    if buf[cur..].starts_with(CEE_COOKIE) {
        let end = cur + CEE_COOKIE.len();
        // 프리픽스는 ASCII뿐이다
        let prefix = String::from_utf8_lossy(&buf[..end]).into_owned();
        (end, Some(prefix))
    } else {
        (0, None)
    }
}

fn parse_content(buf: &[u8], require_terminator: bool) -> Result<(usize, String), ParseError> {
    let token_end = match buf.iter().position(|&b| b == b'\n') {
        Some(idx) => idx,
        None if require_terminator => {
            return Err(ParseError::BadContent {
                offset: buf.len(),
                reason: "missing line terminator".to_owned(),
            });
        }
        None => buf.len(),
    };

    if token_end == 0 {
        return Err(ParseError::BadContent {
            offset: 0,
            reason: "empty content".to_owned(),
        });
    }

    let content = std::str::from_utf8(&buf[..token_end]).map_err(|_| ParseError::BadContent {
        offset: 0,
        reason: "content is not valid utf-8".to_owned(),
    })?;
    Ok((token_end, content.to_owned()))
}
