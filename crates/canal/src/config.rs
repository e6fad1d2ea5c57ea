//! canal 설정
//!
//! TCP-to-TCP canal 조립([`Canal::connect`](crate::Canal::connect))에
//! 쓰이는 설정입니다. 설정 파일 파싱은 임베딩하는 쪽의 몫이고, 여기서는
//! 값 검증만 담당합니다.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::error::CanalError;

/// canal 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanalConfig {
    /// 수신 리스너 바인드 주소
    pub input_addr: String,
    /// 송신 목적지 주소
    pub output_addr: String,
    /// 송신 재연결 간격 (초)
    pub retry_interval_secs: u64,
    /// 채널러 채널 용량 (1이면 사실상 무버퍼)
    pub channel_capacity: usize,
}

impl Default for CanalConfig {
    fn default() -> Self {
        Self {
            input_addr: "127.0.0.1:1514".to_owned(),
            output_addr: "127.0.0.1:1515".to_owned(),
            retry_interval_secs: 5,
            channel_capacity: 1,
        }
    }
}

impl CanalConfig {
    /// 설정 값을 검증합니다.
    pub fn validate(&self) -> Result<(), CanalError> {
        if self.input_addr.parse::<SocketAddr>().is_err() {
            return Err(CanalError::Config {
                field: "input_addr".to_owned(),
                reason: format!("'{}' is not a socket address", self.input_addr),
            });
        }
        if self.output_addr.parse::<SocketAddr>().is_err() {
            return Err(CanalError::Config {
                field: "output_addr".to_owned(),
                reason: format!("'{}' is not a socket address", self.output_addr),
            });
        }
        if self.retry_interval_secs == 0 {
            return Err(CanalError::Config {
                field: "retry_interval_secs".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.channel_capacity == 0 {
            return Err(CanalError::Config {
                field: "channel_capacity".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CanalConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_address_is_rejected() {
        let config = CanalConfig {
            input_addr: "not-an-address".to_owned(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CanalError::Config { .. }));
    }

    #[test]
    fn zero_retry_interval_is_rejected() {
        let config = CanalConfig {
            retry_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = CanalConfig {
            channel_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_serde_roundtrip() {
        let config = CanalConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: CanalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.input_addr, config.input_addr);
        assert_eq!(back.channel_capacity, config.channel_capacity);
    }
}
