//! TCP 수신 어댑터
//!
//! 설정된 주소에 TCP 리스너를 바인드하고, 수락된 연결마다 별도 태스크가
//! `\n` 프레임을 읽어 파싱한 뒤 공유 메시지 채널로 밀어 넣습니다.
//! 한 연결의 읽기 에러는 그 연결만 닫습니다.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ceelog_core::SyslogMsg;

use crate::error::CanalError;
use crate::parser::Parser;

use super::Inputter;

/// 수신 메시지 채널 용량
const INPUT_CHANNEL_CAPACITY: usize = 1;

/// TCP 수신 어댑터
pub struct TcpInputter {
    local_addr: SocketAddr,
    messages: mpsc::Receiver<SyslogMsg>,
    cancel: CancellationToken,
}

impl TcpInputter {
    /// 주소(`"127.0.0.1:1514"`)에 바인드하고 수락 루프를 시작합니다.
    pub async fn bind(addr: &str) -> Result<Self, CanalError> {
        Self::bind_with_parser(addr, Parser::new()).await
    }

    /// 사용자 지정 파서로 바인드합니다.
    pub async fn bind_with_parser(addr: &str, parser: Parser) -> Result<Self, CanalError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CanalError::Connect {
                addr: addr.to_owned(),
                reason: e.to_string(),
            })?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "tcp inputter listening");

        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        tokio::spawn(accept_loop(
            listener,
            tx,
            Arc::new(parser),
            cancel.clone(),
        ));

        Ok(Self {
            local_addr,
            messages: rx,
            cancel,
        })
    }

    /// 실제 바인드된 주소를 반환합니다 (`:0` 바인드 시 유용).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Inputter for TcpInputter {
    async fn recv(&mut self) -> Option<SyslogMsg> {
        self.messages.recv().await
    }

    async fn close(&mut self) {
        self.cancel.cancel();
        self.messages.close();
    }
}

async fn accept_loop(
    listener: TcpListener,
    tx: mpsc::Sender<SyslogMsg>,
    parser: Arc<Parser>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("tcp inputter accept loop shutting down");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "accepted connection");
                        tokio::spawn(read_connection(
                            stream,
                            peer,
                            tx.clone(),
                            Arc::clone(&parser),
                            cancel.clone(),
                        ));
                    }
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                    }
                }
            }
        }
    }
}

/// 한 연결의 읽기 루프
///
/// 파싱에 실패한 레코드는 드롭되고, 읽기 에러와 EOF는 이 연결만
/// 닫습니다.
async fn read_connection(
    stream: TcpStream,
    peer: SocketAddr,
    tx: mpsc::Sender<SyslogMsg>,
    parser: Arc<Parser>,
    cancel: CancellationToken,
) {
    let mut reader = BufReader::new(stream);
    let mut frame = Vec::new();

    loop {
        frame.clear();
        tokio::select! {
            _ = cancel.cancelled() => break,
            read = reader.read_until(b'\n', &mut frame) => {
                match read {
                    Ok(0) => {
                        debug!(%peer, "connection closed by peer");
                        break;
                    }
                    Ok(_) => match parser.parse(&frame) {
                        Ok(msg) => {
                            if tx.send(msg).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            debug!(%peer, error = %e, "dropping unparseable record");
                        }
                    },
                    Err(e) => {
                        warn!(%peer, error = %e, "read failed, closing connection");
                        break;
                    }
                }
            }
        }
    }
}
