//! 동기 파이프라인 — reader → parse → transform → serialize → writer
//!
//! `\n`으로 끝나는 라인을 읽어 파싱하고, 변환기 체인을 등록 순서대로
//! 적용한 뒤 직렬화해 씁니다. 기본값으로 파싱/변환 에러는 삼켜지고 해당
//! 레코드만 드롭됩니다. 두 에러 게이트를 각각 켜면 해당 에러 종류가
//! 파이프라인 종료로 승격됩니다.
//!
//! # 사용 예시
//! ```ignore
//! use ceelog_canal::{JsonKeyTransformer, Pipeline};
//!
//! let sanitizer = JsonKeyTransformer::builder().replace(".", "_").build()?;
//! Pipeline::new()
//!     .transform(sanitizer)
//!     .run(&mut reader, &mut writer)?;
//! ```

use std::io::{BufRead, Write};
use std::sync::Arc;

use tracing::debug;

use ceelog_core::{CeelogError, SyslogMsg, Transformer};

use crate::parser::Parser;
use crate::stats::CanalStats;

/// 동기 파이프라인
pub struct Pipeline {
    parser: Parser,
    transformers: Vec<Box<dyn Transformer>>,
    exit_on_parse_error: bool,
    exit_on_transform_error: bool,
    stats: Arc<CanalStats>,
}

impl Pipeline {
    /// 기본 파서와 빈 변환기 체인으로 새 파이프라인을 생성합니다.
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            transformers: Vec::new(),
            exit_on_parse_error: false,
            exit_on_transform_error: false,
            stats: Arc::new(CanalStats::new()),
        }
    }

    /// 파서를 교체합니다.
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    /// 변환기를 체인 끝에 추가합니다. 적용은 등록 순서대로입니다.
    pub fn transform(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// 파싱 에러를 파이프라인 종료로 승격합니다.
    pub fn exit_on_parse_error(mut self) -> Self {
        self.exit_on_parse_error = true;
        self
    }

    /// 변환 에러를 파이프라인 종료로 승격합니다.
    pub fn exit_on_transform_error(mut self) -> Self {
        self.exit_on_transform_error = true;
        self
    }

    /// 처리 카운터 핸들을 반환합니다.
    pub fn stats(&self) -> Arc<CanalStats> {
        Arc::clone(&self.stats)
    }

    /// 파이프라인을 실행합니다.
    ///
    /// reader가 입력 끝에 도달하면 `Ok(())`로 종료합니다. reader/writer의
    /// I/O 에러는 그대로 전파됩니다.
    pub fn run<R: BufRead, W: Write>(
        &self,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<(), CeelogError> {
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader.read_until(b'\n', &mut line)?;
            if read == 0 {
                return Ok(());
            }

            let msg = match self.parser.parse(&line) {
                Ok(msg) => {
                    self.stats.record_parsed();
                    msg
                }
                Err(err) => {
                    self.stats.record_parse_error();
                    if self.exit_on_parse_error {
                        return Err(err.into());
                    }
                    debug!(error = %err, "dropping unparseable record");
                    continue;
                }
            };

            match self.apply_transformers(msg)? {
                Some(msg) => {
                    writer.write_all(msg.serialize().as_bytes())?;
                    self.stats.record_written();
                }
                None => continue,
            }
        }
    }

    /// 변환기 체인을 적용합니다. 드롭된 레코드는 `None`입니다.
    fn apply_transformers(&self, msg: SyslogMsg) -> Result<Option<SyslogMsg>, CeelogError> {
        let mut msg = msg;
        for transformer in &self.transformers {
            msg = match transformer.transform(msg) {
                Ok(msg) => msg,
                Err(err) => {
                    self.stats.record_transform_drop();
                    if self.exit_on_transform_error {
                        return Err(err.into());
                    }
                    debug!(error = %err, "dropping record on transform error");
                    return Ok(None);
                }
            };
        }
        Ok(Some(msg))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
