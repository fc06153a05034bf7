//! Logweld 공통 크레이트 -- 에러, 설정, 채널 추상화
//!
//! # 모듈 구성
//!
//! - [`channel`]: 입출력 채널 trait ([`MessageSource`], [`MessageSink`])과
//!   폴링 결과 타입 ([`PollOutcome`])
//! - [`config`]: `logweld.toml` 파싱 및 환경변수 오버라이드
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! MessageSource -> StreamPipeline -> MessageSink
//!      |          (stream-pipeline)      |
//!   broker consumer                 broker producer
//! ```
//!
//! 파이프라인 구현은 `logweld-stream-pipeline` 크레이트에 있으며,
//! 이 크레이트는 모듈 간 공유되는 계약만 정의합니다.

pub mod channel;
pub mod config;
pub mod error;

// --- 주요 타입 re-export ---

// 채널
pub use channel::{MessageSink, MessageSource, PollOutcome};

// 설정
pub use config::LogweldConfig;

// 에러
pub use error::{ChannelError, ConfigError, LogweldError};
