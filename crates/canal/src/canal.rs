//! Canal — 입력 채널러, 변환기 체인, 출력 채널러의 조합
//!
//! 입력 쪽에서 메시지를 하나 읽어 변환기 체인을 등록 순서대로 적용하고
//! 출력 쪽으로 넘깁니다. 자체 버퍼는 없습니다 — 배압은 유한 채널을 타고
//! inputter의 읽기 루프까지 전파됩니다. 변환 에러는 기본적으로 해당
//! 레코드를 건너뛰는 것으로 강등됩니다.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use ceelog_core::Transformer;

use crate::channeler::{ChannelerCmd, InputChanneler, OutputChanneler};
use crate::config::CanalConfig;
use crate::error::CanalError;
use crate::stats::CanalStats;
use crate::transport::{TcpInputter, TcpOutputter};

/// Canal
pub struct Canal {
    input: InputChanneler,
    output: OutputChanneler,
    transformers: Vec<Box<dyn Transformer>>,
    stats: Arc<CanalStats>,
}

impl Canal {
    /// 채널러 한 쌍과 변환기 체인으로 canal을 구성합니다.
    pub fn new(
        input: InputChanneler,
        output: OutputChanneler,
        transformers: Vec<Box<dyn Transformer>>,
    ) -> Self {
        Self {
            input,
            output,
            transformers,
            stats: Arc::new(CanalStats::new()),
        }
    }

    /// 표준 TCP-to-TCP canal을 조립합니다.
    ///
    /// 수신 리스너가 실제 바인드된 주소를 함께 돌려줍니다
    /// (`:0` 바인드 시 유용).
    pub async fn connect(
        config: &CanalConfig,
        transformers: Vec<Box<dyn Transformer>>,
    ) -> Result<(Self, SocketAddr), CanalError> {
        config.validate()?;

        let inputter = TcpInputter::bind(&config.input_addr).await?;
        let input_addr = inputter.local_addr();
        let outputter = TcpOutputter::new(&config.output_addr, config.retry_interval_secs);

        let canal = Self::new(
            InputChanneler::with_capacity(inputter, config.channel_capacity),
            OutputChanneler::with_capacity(outputter, config.channel_capacity),
            transformers,
        );
        Ok((canal, input_addr))
    }

    /// 입력 채널러의 명령 송신자를 반환합니다.
    pub fn input_command(&self) -> mpsc::Sender<ChannelerCmd> {
        self.input.command()
    }

    /// 출력 채널러의 명령 송신자를 반환합니다.
    pub fn output_command(&self) -> mpsc::Sender<ChannelerCmd> {
        self.output.command()
    }

    /// 처리 카운터 핸들을 반환합니다.
    pub fn stats(&self) -> Arc<CanalStats> {
        Arc::clone(&self.stats)
    }

    /// canal을 가동합니다.
    ///
    /// 입력 채널이 닫히면(입력 채널러 `Stop` 이후) 출력 채널러까지
    /// 정지시키고 반환합니다.
    pub async fn ship(mut self) {
        'outer: while let Some(msg) = self.input.recv().await {
            self.stats.record_parsed();

            let mut msg = msg;
            for transformer in &self.transformers {
                msg = match transformer.transform(msg) {
                    Ok(msg) => msg,
                    Err(e) => {
                        self.stats.record_transform_drop();
                        debug!(error = %e, "dropping record on transform error");
                        continue 'outer;
                    }
                };
            }

            if self.output.send(msg).await.is_err() {
                break;
            }
            self.stats.record_written();
        }
        self.output.stop().await;
    }
}
