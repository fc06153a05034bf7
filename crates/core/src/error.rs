//! 에러 타입 — 도메인별 에러 정의

/// Logweld 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogweldError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 입출력 채널 에러
///
/// 입력 채널의 폴링 결과 중 복구 불가능한 조건과,
/// 출력 채널의 전달 실패를 표현합니다. 파티션 끝(end-of-partition) 신호는
/// 에러가 아니라 [`PollOutcome::EndOfPartition`](crate::channel::PollOutcome)으로
/// 표현됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// 복구 불가능한 채널 에러 (연결 단절, 프로토콜 에러 등)
    #[error("fatal channel error: {0}")]
    Fatal(String),

    /// 채널이 닫혀 더 이상 메시지가 전달되지 않음
    #[error("channel closed: {0}")]
    Closed(String),

    /// 출력 채널 전달 실패
    #[error("delivery failed: topic '{topic}': {reason}")]
    Delivery {
        /// 전달 대상 토픽
        topic: String,
        /// 실패 사유
        reason: String,
    },
}
