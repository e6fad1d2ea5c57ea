//! Priority 모델 — RFC 3164 facility/severity 분류
//!
//! PRI 값은 `facility * 8 + severity`로 계산됩니다. facility는 0–11과
//! 16–23의 비연속 집합만 유효하며(12–15는 정의되지 않음), severity는
//! 0–7입니다. 숫자 ↔ 심볼 이름 변환은 고정 테이블로 왕복됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PriorityError;

/// RFC 3164 facility 코드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facility {
    /// kernel 메시지
    Kern = 0,
    /// 사용자 레벨 메시지
    User = 1,
    /// 메일 시스템
    Mail = 2,
    /// 시스템 데몬
    Daemon = 3,
    /// 보안/인가 메시지
    Auth = 4,
    /// syslogd 내부 메시지
    Syslog = 5,
    /// 프린터 서브시스템
    Lpr = 6,
    /// 뉴스 서브시스템
    News = 7,
    /// UUCP 서브시스템
    Uucp = 8,
    /// cron 데몬
    Cron = 9,
    /// 보안/인가 메시지 (private)
    AuthPriv = 10,
    /// FTP 데몬
    Ftp = 11,
    /// 로컬 용도 0
    Local0 = 16,
    /// 로컬 용도 1
    Local1 = 17,
    /// 로컬 용도 2
    Local2 = 18,
    /// 로컬 용도 3
    Local3 = 19,
    /// 로컬 용도 4
    Local4 = 20,
    /// 로컬 용도 5
    Local5 = 21,
    /// 로컬 용도 6
    Local6 = 22,
    /// 로컬 용도 7
    Local7 = 23,
}

impl Facility {
    /// 숫자 코드에서 facility를 생성합니다.
    ///
    /// 12–15와 0–23 밖의 값은 `BadFacility`로 거부됩니다.
    pub fn from_int(value: i32) -> Result<Self, PriorityError> {
        match value {
            0 => Ok(Self::Kern),
            1 => Ok(Self::User),
            2 => Ok(Self::Mail),
            3 => Ok(Self::Daemon),
            4 => Ok(Self::Auth),
            5 => Ok(Self::Syslog),
            6 => Ok(Self::Lpr),
            7 => Ok(Self::News),
            8 => Ok(Self::Uucp),
            9 => Ok(Self::Cron),
            10 => Ok(Self::AuthPriv),
            11 => Ok(Self::Ftp),
            16 => Ok(Self::Local0),
            17 => Ok(Self::Local1),
            18 => Ok(Self::Local2),
            19 => Ok(Self::Local3),
            20 => Ok(Self::Local4),
            21 => Ok(Self::Local5),
            22 => Ok(Self::Local6),
            23 => Ok(Self::Local7),
            _ => Err(PriorityError::BadFacility(value)),
        }
    }

    /// 심볼 이름(`"KERN"` … `"LOCAL7"`)에서 facility를 생성합니다.
    pub fn from_name(name: &str) -> Result<Self, PriorityError> {
        match name {
            "KERN" => Ok(Self::Kern),
            "USER" => Ok(Self::User),
            "MAIL" => Ok(Self::Mail),
            "DAEMON" => Ok(Self::Daemon),
            "AUTH" => Ok(Self::Auth),
            "SYSLOG" => Ok(Self::Syslog),
            "LPR" => Ok(Self::Lpr),
            "NEWS" => Ok(Self::News),
            "UUCP" => Ok(Self::Uucp),
            "CRON" => Ok(Self::Cron),
            "AUTHPRIV" => Ok(Self::AuthPriv),
            "FTP" => Ok(Self::Ftp),
            "LOCAL0" => Ok(Self::Local0),
            "LOCAL1" => Ok(Self::Local1),
            "LOCAL2" => Ok(Self::Local2),
            "LOCAL3" => Ok(Self::Local3),
            "LOCAL4" => Ok(Self::Local4),
            "LOCAL5" => Ok(Self::Local5),
            "LOCAL6" => Ok(Self::Local6),
            "LOCAL7" => Ok(Self::Local7),
            _ => Err(PriorityError::BadFacility(-1)),
        }
    }

    /// 숫자 코드를 반환합니다.
    pub fn as_int(self) -> u8 {
        self as u8
    }

    /// 소문자 심볼 이름을 반환합니다.
    pub fn name(self) -> &'static str {
        match self {
            Self::Kern => "kern",
            Self::User => "user",
            Self::Mail => "mail",
            Self::Daemon => "daemon",
            Self::Auth => "auth",
            Self::Syslog => "syslog",
            Self::Lpr => "lpr",
            Self::News => "news",
            Self::Uucp => "uucp",
            Self::Cron => "cron",
            Self::AuthPriv => "authpriv",
            Self::Ftp => "ftp",
            Self::Local0 => "local0",
            Self::Local1 => "local1",
            Self::Local2 => "local2",
            Self::Local3 => "local3",
            Self::Local4 => "local4",
            Self::Local5 => "local5",
            Self::Local6 => "local6",
            Self::Local7 => "local7",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// RFC 3164 severity 코드
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// 시스템 사용 불가
    Emerg = 0,
    /// 즉시 조치 필요
    Alert = 1,
    /// 치명적 상태
    Crit = 2,
    /// 에러 상태
    Err = 3,
    /// 경고 상태
    Warning = 4,
    /// 정상이지만 주목할 상태
    Notice = 5,
    /// 정보성 메시지
    Info = 6,
    /// 디버그 메시지
    Debug = 7,
}

impl Severity {
    /// 숫자 코드에서 severity를 생성합니다. 0–7 밖은 `BadSeverity`입니다.
    pub fn from_int(value: i32) -> Result<Self, PriorityError> {
        match value {
            0 => Ok(Self::Emerg),
            1 => Ok(Self::Alert),
            2 => Ok(Self::Crit),
            3 => Ok(Self::Err),
            4 => Ok(Self::Warning),
            5 => Ok(Self::Notice),
            6 => Ok(Self::Info),
            7 => Ok(Self::Debug),
            _ => Err(PriorityError::BadSeverity(value)),
        }
    }

    /// 심볼 이름(`"EMERG"` … `"DEBUG"`)에서 severity를 생성합니다.
    pub fn from_name(name: &str) -> Result<Self, PriorityError> {
        match name {
            "EMERG" => Ok(Self::Emerg),
            "ALERT" => Ok(Self::Alert),
            "CRIT" => Ok(Self::Crit),
            "ERR" => Ok(Self::Err),
            "WARNING" => Ok(Self::Warning),
            "NOTICE" => Ok(Self::Notice),
            "INFO" => Ok(Self::Info),
            "DEBUG" => Ok(Self::Debug),
            _ => Err(PriorityError::BadSeverity(-1)),
        }
    }

    /// 숫자 코드를 반환합니다.
    pub fn as_int(self) -> u8 {
        self as u8
    }

    /// 소문자 심볼 이름을 반환합니다.
    pub fn name(self) -> &'static str {
        match self {
            Self::Emerg => "emerg",
            Self::Alert => "alert",
            Self::Crit => "crit",
            Self::Err => "err",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// RFC 3164 메시지의 PRI
///
/// 불변식: 숫자 값 = `facility * 8 + severity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    /// facility 코드
    pub facility: Facility,
    /// severity 코드
    pub severity: Severity,
}

impl Priority {
    /// facility와 severity에서 priority를 생성합니다.
    pub fn new(facility: Facility, severity: Severity) -> Self {
        Self { facility, severity }
    }

    /// 와이어 숫자 값(0–191)에서 priority를 생성합니다.
    ///
    /// facility 구멍(96–127에 해당하는 12–15)을 포함해 범위를 검증합니다.
    pub fn from_value(value: u16) -> Result<Self, PriorityError> {
        let facility = Facility::from_int(i32::from(value / 8))?;
        let severity = Severity::from_int(i32::from(value % 8))?;
        Ok(Self { facility, severity })
    }

    /// 와이어 숫자 값을 반환합니다.
    pub fn value(&self) -> u8 {
        self.facility.as_int() * 8 + self.severity.as_int()
    }

    /// facility를 교체합니다.
    pub fn set_facility(&mut self, facility: Facility) {
        self.facility = facility;
    }

    /// severity를 교체합니다.
    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_facility_times_eight_plus_severity() {
        for f in 0..=23 {
            let facility = match Facility::from_int(f) {
                Ok(facility) => facility,
                Err(_) => continue,
            };
            for s in 0..=7 {
                let severity = Severity::from_int(s).unwrap();
                let pri = Priority::new(facility, severity);
                assert_eq!(i32::from(pri.value()), f * 8 + s);
            }
        }
    }

    #[test]
    fn facility_hole_is_rejected() {
        for code in 12..=15 {
            assert_eq!(
                Facility::from_int(code),
                Err(PriorityError::BadFacility(code))
            );
        }
    }

    #[test]
    fn facility_out_of_range_is_rejected() {
        assert!(Facility::from_int(-1).is_err());
        assert!(Facility::from_int(24).is_err());
    }

    #[test]
    fn severity_out_of_range_is_rejected() {
        assert!(Severity::from_int(-1).is_err());
        assert!(Severity::from_int(8).is_err());
    }

    #[test]
    fn names_round_trip() {
        for code in (0..=11).chain(16..=23) {
            let facility = Facility::from_int(code).unwrap();
            let upper = facility.name().to_uppercase();
            assert_eq!(Facility::from_name(&upper), Ok(facility));
        }
        for code in 0..=7 {
            let severity = Severity::from_int(code).unwrap();
            let upper = severity.name().to_uppercase();
            assert_eq!(Severity::from_name(&upper), Ok(severity));
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(Facility::from_name("NTP").is_err());
        assert!(Severity::from_name("TRACE").is_err());
    }

    #[test]
    fn from_value_boundaries() {
        assert_eq!(
            Priority::from_value(0).unwrap(),
            Priority::new(Facility::Kern, Severity::Emerg)
        );
        assert_eq!(
            Priority::from_value(191).unwrap(),
            Priority::new(Facility::Local7, Severity::Debug)
        );
        assert!(Priority::from_value(192).is_err());
    }

    #[test]
    fn from_value_rejects_facility_hole() {
        // 96–127은 facility 12–15에 해당한다
        assert!(Priority::from_value(96).is_err());
        assert!(Priority::from_value(127).is_err());
        assert!(Priority::from_value(128).is_ok());
    }

    #[test]
    fn setters_recompute_value() {
        let mut pri = Priority::new(Facility::Kern, Severity::Emerg);
        pri.set_facility(Facility::Local7);
        pri.set_severity(Severity::Debug);
        assert_eq!(pri.value(), 191);
    }

    #[test]
    fn display_is_numeric() {
        let pri = Priority::new(Facility::Local7, Severity::Debug);
        assert_eq!(pri.to_string(), "191");
    }
}
