//! 입력 채널러
//!
//! inputter가 파싱해 낸 메시지를 출력 채널로 중계하는 액터입니다.
//! `Stop` 명령을 받으면 출력 채널을 닫고 inputter를 닫은 뒤 종료합니다.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use ceelog_core::SyslogMsg;

use crate::transport::Inputter;

use super::{ChannelerCmd, DEFAULT_CHANNEL_CAPACITY};

/// 입력 채널러
pub struct InputChanneler {
    cmd: mpsc::Sender<ChannelerCmd>,
    messages: mpsc::Receiver<SyslogMsg>,
    actor: JoinHandle<()>,
}

impl InputChanneler {
    /// inputter를 감싸는 새 입력 채널러를 생성하고 액터를 시작합니다.
    pub fn new<I: Inputter>(inputter: I) -> Self {
        Self::with_capacity(inputter, DEFAULT_CHANNEL_CAPACITY)
    }

    /// 지정한 채널 용량으로 생성합니다.
    pub fn with_capacity<I: Inputter>(inputter: I, capacity: usize) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        let (msg_tx, msg_rx) = mpsc::channel(capacity.max(1));
        let actor = tokio::spawn(actor(inputter, cmd_rx, msg_tx));
        Self {
            cmd: cmd_tx,
            messages: msg_rx,
            actor,
        }
    }

    /// 명령 채널 송신자를 반환합니다.
    pub fn command(&self) -> mpsc::Sender<ChannelerCmd> {
        self.cmd.clone()
    }

    /// 다음 메시지를 수신합니다. 채널러가 정지하면 `None`입니다.
    pub async fn recv(&mut self) -> Option<SyslogMsg> {
        self.messages.recv().await
    }

    /// `Stop`을 보내고 액터 종료를 기다립니다.
    pub async fn stop(self) {
        let _ = self.cmd.send(ChannelerCmd::Stop).await;
        let _ = self.actor.await;
    }
}

async fn actor<I: Inputter>(
    mut inputter: I,
    mut cmd_rx: mpsc::Receiver<ChannelerCmd>,
    msg_tx: mpsc::Sender<SyslogMsg>,
) {
    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(ChannelerCmd::Stop) | None => {
                    debug!("input channeler stopping");
                    break;
                }
            },
            msg = inputter.recv() => match msg {
                Some(msg) => {
                    if msg_tx.send(msg).await.is_err() {
                        // 하류가 사라졌으면 계속 읽을 이유가 없다
                        break;
                    }
                }
                None => {
                    debug!("inputter stream ended");
                    break;
                }
            }
        }
    }
    inputter.close().await;
    // msg_tx 드롭으로 출력 채널이 닫힌다
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;
    use tokio::time::{timeout, Duration};

    /// 준비된 메시지를 순서대로 내놓는 테스트 inputter
    struct StaticInputter {
        queued: Vec<SyslogMsg>,
        closed: bool,
    }

    impl StaticInputter {
        fn new(lines: &[&str]) -> Self {
            Self {
                queued: lines
                    .iter()
                    .rev()
                    .map(|line| parse_bytes(line.as_bytes()).unwrap())
                    .collect(),
                closed: false,
            }
        }
    }

    impl Inputter for StaticInputter {
        async fn recv(&mut self) -> Option<SyslogMsg> {
            if self.closed {
                return None;
            }
            match self.queued.pop() {
                Some(msg) => Some(msg),
                None => {
                    // 큐가 비면 스트림을 열어 둔 채 대기한다
                    std::future::pending::<()>().await;
                    None
                }
            }
        }

        async fn close(&mut self) {
            self.closed = true;
        }
    }

    #[tokio::test]
    async fn relays_messages_in_order() {
        let inputter = StaticInputter::new(&[
            "<191>2006-01-02T15:04:05.999999-07:00 host.example.org test: one\n",
            "<191>2006-01-02T15:04:05.999999-07:00 host.example.org test: two\n",
        ]);
        let mut channeler = InputChanneler::new(inputter);

        let first = timeout(Duration::from_secs(1), channeler.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.content, " one");

        let second = timeout(Duration::from_secs(1), channeler.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.content, " two");
    }

    #[tokio::test]
    async fn stop_closes_the_out_channel() {
        let inputter = StaticInputter::new(&[]);
        let channeler = InputChanneler::new(inputter);
        let cmd = channeler.command();

        let mut channeler = channeler;
        cmd.send(ChannelerCmd::Stop).await.unwrap();

        let got = timeout(Duration::from_secs(1), channeler.recv())
            .await
            .expect("should not time out");
        assert!(got.is_none());
    }
}
