//! Logweld 스트림 파이프라인 -- 로그 조각 재조립, 필드 추출, 전달
//!
//! # 모듈 구성
//!
//! - [`normalizer`]: 터미널 제어 시퀀스(ANSI/CSI) 제거
//! - [`accumulator`]: 경계 마커 기반 멀티라인 레코드 재조립
//! - [`extractor`]: 명명 캡처 정규식으로 구조화 필드 추출
//! - [`sink`]: 추출 결과 직렬화/전달 및 성공/실패 카운팅
//! - [`channel`]: 입출력 채널 구현 (tokio mpsc, Kafka)
//! - [`pipeline`]: 전체 오케스트레이션 (consume 루프, 상태 기계, 종료 처리)
//! - [`config`]: 파이프라인 설정 (core 설정에서 파생)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! MessageSource -> StreamPipeline -> (라인별) Normalizer -> Accumulator
//!                        |
//!                        v (완성된 레코드별)
//!                  Extractor -> ForwardingSink -> MessageSink
//! ```
//!
//! 파이프라인 인스턴스 하나는 단일 순차 실행 흐름으로 동작하며,
//! 내부 병렬 처리와 공유 가변 상태가 없습니다. 레코드 전달 순서는
//! 경계가 감지된 순서와 항상 일치합니다.

pub mod accumulator;
pub mod channel;
pub mod config;
pub mod error;
pub mod extractor;
pub mod normalizer;
pub mod pipeline;
pub mod sink;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{StreamPipeline, StreamPipelineBuilder};

// 설정
pub use config::{PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::StreamPipelineError;

// 구성 요소
pub use accumulator::BoundaryAccumulator;
pub use extractor::{ExtractedFields, RecordExtractor};
pub use normalizer::AnsiNormalizer;
pub use sink::{ForwardingSink, PipelineCounters};

// 채널 구현
pub use channel::{ChannelSink, ChannelSource, ForwardedMessage, KafkaSink, KafkaSource};
