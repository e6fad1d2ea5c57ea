//! canal 에러 타입
//!
//! [`CanalError`]는 전송/채널 계층에서 발생하는 에러를 표현합니다.
//! `From<CanalError> for CeelogError` 변환이 구현되어 있어 상위
//! 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use ceelog_core::CeelogError;

/// 전송/채널 계층 에러
#[derive(Debug, thiserror::Error)]
pub enum CanalError {
    /// 원격 주소 연결 실패
    #[error("connect to {addr} failed: {reason}")]
    Connect {
        /// 연결 대상 주소
        addr: String,
        /// 실패 사유
        reason: String,
    },

    /// 연결이 없는 상태에서의 쓰기 시도
    #[error("transport is not connected")]
    NotConnected,

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CanalError> for CeelogError {
    fn from(err: CanalError) -> Self {
        match err {
            CanalError::Io(io) => CeelogError::Io(io),
            other => CeelogError::Channel(other.to_string()),
        }
    }
}
