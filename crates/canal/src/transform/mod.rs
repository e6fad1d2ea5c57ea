//! 변환기 구현 모듈
//!
//! # 구성
//! - [`JsonKeyTransformer`]: JSON 키 재작성 (모든 깊이)
//! - [`TagRangeTransformer`]: 시작/종료 이벤트 사이 레코드 일괄 태깅
//! - [`TimeSinceTransformer`]: 마지막 매치 이후 경과 시간 속성 추가
//!
//! 범위 계열 변환기는 mutex로 보호되는 추적 맵과 TTL 리퍼를 공유
//! 구현(`tracker`)으로 가집니다.

pub mod json_keys;
pub mod tag_range;
pub mod time_since;

mod tracker;

pub use json_keys::{JsonKeyTransformer, JsonKeyTransformerBuilder};
pub use tag_range::TagRangeTransformer;
pub use time_since::TimeSinceTransformer;
