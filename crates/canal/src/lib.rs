#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: RFC 3164 + CEE 파서 (단일 스캔, 빌더 옵션)
//! - [`matcher`]: 태그 일치 / 내용 포함 매처
//! - [`mutator`]: 태그 배열 뮤테이터
//! - [`transform`]: JSON 키 재작성, 범위 태거, 경과 시간 태거
//! - [`pipeline`]: 동기 reader → writer 파이프라인 (에러 게이트)
//! - [`channeler`]: 입력/출력 채널러 액터와 `Stop` 명령
//! - [`canal`]: 채널러 한 쌍 + 변환기 체인의 조합
//! - [`transport`]: `Inputter`/`Outputter` trait과 TCP 구현
//! - [`config`]: canal 조립 설정
//! - [`stats`]: 처리 카운터

pub mod canal;
pub mod channeler;
pub mod config;
pub mod error;
pub mod matcher;
pub mod mutator;
pub mod parser;
pub mod pipeline;
pub mod stats;
pub mod transform;
pub mod transport;

// --- 주요 타입 re-export ---

// 파서
pub use parser::{parse_bytes, Parser};

// 매처 / 뮤테이터
pub use matcher::{ContentContainsMatcher, TagMatcher};
pub use mutator::TagArrayMutator;

// 변환기
pub use transform::{JsonKeyTransformer, TagRangeTransformer, TimeSinceTransformer};

// 파이프라인 / canal
pub use canal::Canal;
pub use pipeline::Pipeline;

// 채널러
pub use channeler::{ChannelerCmd, InputChanneler, OutputChanneler};

// 전송
pub use transport::{Inputter, Outputter, TcpInputter, TcpOutputter};

// 설정 / 카운터 / 에러
pub use config::CanalConfig;
pub use error::CanalError;
pub use stats::CanalStats;
