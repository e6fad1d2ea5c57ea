//! 메시지 값 — 파싱된 RFC 3164 레코드와 그 직렬화
//!
//! [`SyslogMsg`]는 파서가 만들어 내는 레코드입니다. 변환기는 값으로 받아
//! 수정본을 돌려주고, 뮤테이터는 참조로 받아 제자리에서 수정하며,
//! 직렬화기는 읽기 전용으로 소비합니다.

use std::fmt;

use crate::error::{CeelogError, MutateError, ParseError};
use crate::priority::{Facility, Priority, Severity};
use crate::timestamp::MsgTime;
use crate::value::{self, CeeMap, CeeValue};

/// CEE 프리픽스의 표준 철자 (선행 공백 포함)
const CEE_PREFIX_WITH_SPACE: &str = " @cee:";

/// 메시지 태그
///
/// 태그 문자열은 저장하지 않고 구성 요소에서 재구성합니다. 일부 장비는
/// `[program]` 또는 `[program][pid]` 형태를 내보내므로 브래킷 여부를
/// 별도 플래그로 보존합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// 프로그램 이름
    pub program: String,
    /// 프로세스 ID (있을 경우)
    pub pid: Option<String>,
    /// 콜론으로 끝나는 태그였는지
    pub has_colon: bool,
    /// 프로그램 이름이 브래킷으로 감싸져 있었는지
    pub bracketed: bool,
}

impl Tag {
    /// 콜론으로 끝나는 새 태그를 생성합니다.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            pid: None,
            has_colon: true,
            bracketed: false,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bracketed {
            write!(f, "[{}]", self.program)?;
        } else {
            f.write_str(&self.program)?;
        }
        if let Some(pid) = &self.pid {
            write!(f, "[{pid}]")?;
        }
        if self.has_colon {
            f.write_str(":")?;
        }
        Ok(())
    }
}

/// 파싱된 RFC 3164 메시지
#[derive(Debug, Clone, PartialEq)]
pub struct SyslogMsg {
    /// PRI
    pub pri: Priority,
    /// 타임스탬프 (와이어 형식 보존)
    pub time: MsgTime,
    /// 호스트명
    pub host: String,
    /// 태그
    pub tag: Tag,
    /// 캡처된 CEE 프리픽스 리터럴 (`" @cee:"` 또는 `"@cee:"`, 없으면 빈 문자열)
    pub cee_prefix: String,
    /// CEE 쿠키와 파싱 가능한 JSON으로 시작하는 내용이었는지
    pub is_cee: bool,
    /// JSON 디코딩에 성공했는지 (CEE 또는 순수 JSON 객체 내용)
    pub is_json: bool,
    /// 사람이 읽는 내용 (와이어 형식의 선행 공백 그대로 보존)
    pub content: String,
    /// 디코딩된 JSON 값
    pub json_values: CeeMap,
}

impl SyslogMsg {
    /// 헤더 필드만 채워진 새 메시지를 생성합니다.
    pub fn new(pri: Priority, time: MsgTime, host: impl Into<String>, tag: Tag) -> Self {
        Self {
            pri,
            time,
            host: host.into(),
            tag,
            cee_prefix: String::new(),
            is_cee: false,
            is_json: false,
            content: String::new(),
            json_values: CeeMap::new(),
        }
    }

    /// 범위 추적에 쓰이는 상관 키 `"<host>!<tag>"`를 반환합니다.
    pub fn msg_id(&self) -> String {
        format!("{}!{}", self.host, self.tag)
    }

    /// facility를 교체합니다.
    pub fn set_facility(&mut self, facility: Facility) {
        self.pri.set_facility(facility);
    }

    /// severity를 교체합니다.
    pub fn set_severity(&mut self, severity: Severity) {
        self.pri.set_severity(severity);
    }

    /// 타임스탬프를 교체합니다. 기존 와이어 형식은 유지됩니다.
    pub fn set_time(&mut self, when: chrono::DateTime<chrono::FixedOffset>) {
        self.time = MsgTime::with_format(when, self.time.format);
    }

    /// 호스트명을 교체합니다.
    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    /// 프로그램 이름을 교체합니다.
    pub fn set_program(&mut self, program: impl Into<String>) {
        self.tag.program = program.into();
    }

    /// pid를 설정합니다. pid가 있는 태그는 콜론으로 끝납니다.
    pub fn set_pid(&mut self, pid: impl Into<String>) {
        self.tag.pid = Some(pid.into());
        self.tag.has_colon = true;
    }

    /// 내용을 교체하고 JSON 여부를 다시 판정합니다.
    pub fn set_content(&mut self, content: impl Into<String>) {
        let content = content.into();
        self.json_values.clear();
        self.is_json = false;
        if let Some(values) = value::decode_object(&content) {
            self.json_values = values;
            self.is_json = true;
        }
        self.content = content;
    }

    /// JSON 속성을 추가합니다. 키가 이미 있으면 덮어씁니다.
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<CeeValue>) {
        self.json_values.insert(key.into(), value.into());
    }

    /// `key`의 배열에 값을 추가합니다. 키가 없으면 배열을 새로 만듭니다.
    ///
    /// 키에 배열이 아닌 값이 있으면 실패합니다. CEE 메시지가 아니었다면
    /// 이 호출이 메시지를 CEE로 승격합니다: 원래 내용이 (선행 공백 하나를
    /// 떼고) 첫 번째 키 `msg` 아래로 옮겨집니다.
    pub fn add_tag_array(
        &mut self,
        key: impl Into<String>,
        value: impl Into<CeeValue>,
    ) -> Result<(), MutateError> {
        let key = key.into();
        let slot = self
            .json_values
            .entry(key.clone())
            .or_insert_with(|| CeeValue::List(Vec::new()));
        match slot {
            CeeValue::List(items) => items.push(value.into()),
            _ => return Err(MutateError::NotAnArray { key }),
        }

        if !self.is_cee {
            let body = self
                .content
                .strip_prefix(' ')
                .unwrap_or(&self.content)
                .to_owned();
            self.json_values
                .shift_insert(0, "msg".to_owned(), CeeValue::Text(body));
            self.cee_prefix = CEE_PREFIX_WITH_SPACE.to_owned();
            self.is_cee = true;
            self.is_json = true;
        }
        Ok(())
    }

    /// 와이어 형식 `<PRI>TIME HOST TAG[PREFIX][CONTENT]\n`으로 직렬화합니다.
    ///
    /// JSON을 담은 메시지는 값 맵을 다시 인코딩하고, JSON 값이 추가됐지만
    /// 아직 CEE가 아닌 메시지는 CEE로 승격되며, 그 밖에는 원본 내용을
    /// 그대로 내보냅니다.
    pub fn serialize(&self) -> String {
        let (prefix, content) = self.render_content();
        format!(
            "<{}>{} {} {}{}{}\n",
            self.pri.value(),
            self.time.text(),
            self.host,
            self.tag,
            prefix,
            content,
        )
    }

    /// 호스트 없이 축약 타임스탬프를 쓰는 로컬 형식으로 직렬화합니다.
    ///
    /// 유닉스 도메인 소켓(`/dev/log`)에 쓰기 적합한 형태입니다.
    pub fn serialize_local(&self) -> String {
        let (prefix, content) = self.render_content();
        format!(
            "<{}>{} {}{}{}\n",
            self.pri.value(),
            self.time.local_stamp(),
            self.tag,
            prefix,
            content,
        )
    }

    /// 와이어 형식 바이트를 반환합니다.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize().into_bytes()
    }

    /// syslog 메타데이터를 `syslog_` 접두 키로 담은 순수 JSON을 반환합니다.
    ///
    /// 메시지 본문의 JSON 값과 합쳐지며, JSON 저장소(예: Elasticsearch)로
    /// 직접 넘기기 위한 형태입니다. `syslog_time`은 입력 형식과 무관하게
    /// RFC 3339로 정규화됩니다.
    ///
    /// 파싱 시 JSON 디코딩이 꺼져 있던 CEE 메시지는 본문이 `content`에
    /// 원문으로 남아 있으므로, 이 시점에 디코딩해 합칩니다. 그 본문이
    /// JSON 객체가 아니면 실패합니다.
    pub fn to_export_json(&self) -> Result<String, CeelogError> {
        let mut values = if self.is_cee && self.json_values.is_empty() {
            value::decode_object(&self.content).ok_or_else(|| {
                CeelogError::Parse(ParseError::BadContent {
                    offset: 0,
                    reason: "cee body is not a JSON object".to_owned(),
                })
            })?
        } else {
            self.json_values.clone()
        };
        values.insert(
            "syslog_time".to_owned(),
            CeeValue::Text(self.time.when.to_rfc3339()),
        );
        values.insert("syslog_host".to_owned(), CeeValue::Text(self.host.clone()));
        values.insert(
            "syslog_tag".to_owned(),
            CeeValue::Text(self.tag.to_string()),
        );
        values.insert(
            "syslog_programname".to_owned(),
            CeeValue::Text(self.tag.program.clone()),
        );
        values.insert(
            "syslog_pid".to_owned(),
            CeeValue::Text(self.tag.pid.clone().unwrap_or_default()),
        );
        values.insert(
            "syslog_facilitytext".to_owned(),
            CeeValue::Text(self.pri.facility.name().to_owned()),
        );
        values.insert(
            "syslog_severitytext".to_owned(),
            CeeValue::Text(self.pri.severity.name().to_owned()),
        );
        if !self.is_cee {
            values.insert(
                "syslog_content".to_owned(),
                CeeValue::Text(self.content.clone()),
            );
        }
        Ok(value::render_json(&values))
    }

    fn render_content(&self) -> (String, String) {
        if self.is_json && !self.json_values.is_empty() {
            (self.cee_prefix.clone(), value::render_json(&self.json_values))
        } else if !self.json_values.is_empty() {
            let mut values = self.json_values.clone();
            let body = self
                .content
                .strip_prefix(' ')
                .unwrap_or(&self.content)
                .to_owned();
            values.shift_insert(0, "msg".to_owned(), CeeValue::Text(body));
            (
                CEE_PREFIX_WITH_SPACE.to_owned(),
                value::render_json(&values),
            )
        } else {
            (self.cee_prefix.clone(), self.content.clone())
        }
    }
}

impl fmt::Display for SyslogMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
