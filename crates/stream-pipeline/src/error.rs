//! 스트림 파이프라인 에러 타입
//!
//! [`StreamPipelineError`]는 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<StreamPipelineError> for LogweldError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 패턴 불일치(추출 실패)는 에러가 아니라 카운터로 집계되는
//! 예상된 결과이므로 여기에 변형이 없습니다.

use logweld_core::error::{ChannelError, LogweldError};

/// 스트림 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum StreamPipelineError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 추출 패턴 컴파일 실패
    #[error("invalid extraction pattern: {0}")]
    Pattern(String),

    /// 입출력 채널 에러
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// 이미 실행된 파이프라인을 재실행하려 함
    #[error("pipeline already ran: instances are single-use")]
    AlreadyRan,
}

impl From<StreamPipelineError> for LogweldError {
    fn from(err: StreamPipelineError) -> Self {
        match err {
            StreamPipelineError::Channel(e) => LogweldError::Channel(e),
            other => LogweldError::Pipeline(other.to_string()),
        }
    }
}
