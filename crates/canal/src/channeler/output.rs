//! 출력 채널러
//!
//! 입력 채널의 메시지를 outputter에 쓰는 액터입니다. 시작 시점과 모든
//! 쓰기 실패 후에 연결 루프로 들어갑니다: 연결을 시도하고, 실패하면
//! outputter의 재연결 간격만큼 잠든 뒤 무한히 재시도합니다. 쓰기 에러는
//! 호출자에게 전파되지 않고 재연결로만 이어집니다.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use ceelog_core::SyslogMsg;

use crate::error::CanalError;
use crate::transport::Outputter;

use super::{ChannelerCmd, DEFAULT_CHANNEL_CAPACITY};

/// 출력 채널러
pub struct OutputChanneler {
    cmd: mpsc::Sender<ChannelerCmd>,
    messages: mpsc::Sender<SyslogMsg>,
    actor: JoinHandle<()>,
}

impl OutputChanneler {
    /// outputter를 감싸는 새 출력 채널러를 생성하고 액터를 시작합니다.
    pub fn new<O: Outputter>(outputter: O) -> Self {
        Self::with_capacity(outputter, DEFAULT_CHANNEL_CAPACITY)
    }

    /// 지정한 채널 용량으로 생성합니다.
    pub fn with_capacity<O: Outputter>(outputter: O, capacity: usize) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        let (msg_tx, msg_rx) = mpsc::channel(capacity.max(1));
        let actor = tokio::spawn(actor(outputter, cmd_rx, msg_rx));
        Self {
            cmd: cmd_tx,
            messages: msg_tx,
            actor,
        }
    }

    /// 명령 채널 송신자를 반환합니다.
    pub fn command(&self) -> mpsc::Sender<ChannelerCmd> {
        self.cmd.clone()
    }

    /// 메시지 채널 송신자를 반환합니다.
    pub fn sender(&self) -> mpsc::Sender<SyslogMsg> {
        self.messages.clone()
    }

    /// 메시지를 출력 큐에 넣습니다.
    ///
    /// 하류가 끊겨 있으면 채널이 찰 때까지 대기합니다 — 배압이 여기서
    /// 상류로 전파됩니다.
    pub async fn send(&self, msg: SyslogMsg) -> Result<(), CanalError> {
        self.messages
            .send(msg)
            .await
            .map_err(|_| CanalError::Channel("output channeler stopped".to_owned()))
    }

    /// `Stop`을 보내고 액터 종료를 기다립니다.
    pub async fn stop(self) {
        let _ = self.cmd.send(ChannelerCmd::Stop).await;
        let _ = self.actor.await;
    }
}

async fn actor<O: Outputter>(
    mut outputter: O,
    mut cmd_rx: mpsc::Receiver<ChannelerCmd>,
    mut msg_rx: mpsc::Receiver<SyslogMsg>,
) {
    'connect: loop {
        if let Err(e) = outputter.connect().await {
            warn!(error = %e, "could not connect, retrying");
            sleep(outputter.retry_interval()).await;
            continue 'connect;
        }
        debug!("output channeler connected");

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(ChannelerCmd::Stop) | None => {
                        debug!("output channeler stopping");
                        break 'connect;
                    }
                },
                msg = msg_rx.recv() => match msg {
                    Some(msg) => {
                        if let Err(e) = outputter.output(&msg).await {
                            warn!(error = %e, "could not send message, reconnecting");
                            outputter.close().await;
                            continue 'connect;
                        }
                    }
                    None => break 'connect,
                }
            }
        }
    }
    outputter.close().await;
    msg_rx.close();
}
