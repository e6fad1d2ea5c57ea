//! TCP 송신 어댑터
//!
//! 메시지를 RFC 3164 바이트로 직렬화해 TCP 연결에 씁니다. 쓰기 에러는
//! 그대로 호출자(출력 채널러)에게 올라가 재연결 루프를 작동시킵니다.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use ceelog_core::SyslogMsg;

use crate::error::CanalError;

use super::Outputter;

/// TCP 송신 어댑터
pub struct TcpOutputter {
    addr: String,
    retry_interval: Duration,
    conn: Option<TcpStream>,
}

impl TcpOutputter {
    /// 목적지 주소(`"127.0.0.1:1515"`)와 재연결 간격(초)으로 생성합니다.
    ///
    /// 연결은 [`Outputter::connect`] 호출 시점에 이루어집니다.
    pub fn new(addr: impl Into<String>, retry_interval_secs: u64) -> Self {
        Self {
            addr: addr.into(),
            retry_interval: Duration::from_secs(retry_interval_secs),
            conn: None,
        }
    }

    /// 목적지 주소를 반환합니다.
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl Outputter for TcpOutputter {
    async fn connect(&mut self) -> Result<(), CanalError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| CanalError::Connect {
                addr: self.addr.clone(),
                reason: e.to_string(),
            })?;
        debug!(addr = %self.addr, "tcp outputter connected");
        self.conn = Some(stream);
        Ok(())
    }

    async fn output(&mut self, msg: &SyslogMsg) -> Result<usize, CanalError> {
        let conn = self.conn.as_mut().ok_or(CanalError::NotConnected)?;
        let frame = msg.to_bytes();
        conn.write_all(&frame).await?;
        Ok(frame.len())
    }

    fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    async fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            let _ = conn.shutdown().await;
        }
    }
}
