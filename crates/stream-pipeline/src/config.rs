//! 스트림 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`LogweldConfig`](logweld_core::config::LogweldConfig)에서
//! 파이프라인이 실제로 사용하는 값만 파생한 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use logweld_core::config::LogweldConfig;
//! use logweld_stream_pipeline::config::PipelineConfig;
//!
//! let core_config = LogweldConfig::default();
//! let config = PipelineConfig::from_core(&core_config);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StreamPipelineError;
use crate::extractor::RecordExtractor;

/// 스트림 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 논리 레코드의 첫 라인을 식별하는 리터럴 접두사
    pub boundary_marker: String,
    /// 명명 캡처 추출 패턴 (verbose 모드)
    pub pattern: String,
    /// 추출 레코드에 `log_file` 필드로 태깅할 소스 이름
    pub source_name: String,
    /// 전달 대상 출력 토픽
    pub output_topic: String,
    /// 입력 채널 폴링 제한 시간 (밀리초)
    pub poll_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            boundary_marker: "[v ".to_owned(),
            pattern: r"(?P<level>\w+):\s(?P<msg>.*)".to_owned(),
            source_name: "app".to_owned(),
            output_topic: "logs".to_owned(),
            poll_timeout_ms: 1000,
        }
    }
}

impl PipelineConfig {
    /// core 설정에서 파이프라인 설정을 파생합니다.
    ///
    /// 소스 이름은 `pipeline.log_file` 경로의 파일 이름(확장자 제외)입니다.
    pub fn from_core(core: &logweld_core::config::LogweldConfig) -> Self {
        Self {
            boundary_marker: core.pipeline.boundary_marker.clone(),
            pattern: core.extraction.pattern.clone(),
            source_name: source_name_from_path(&core.pipeline.log_file),
            output_topic: core.output.topic.clone(),
            poll_timeout_ms: core.pipeline.poll_timeout_ms,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 추출 패턴의 컴파일 가능 여부도 여기서 확인하므로, 잘못된 패턴은
    /// 소비 시작 전에 드러납니다.
    pub fn validate(&self) -> Result<(), StreamPipelineError> {
        const MAX_POLL_TIMEOUT_MS: u64 = 60_000; // 1 minute

        if self.boundary_marker.is_empty() {
            return Err(StreamPipelineError::Config {
                field: "boundary_marker".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.source_name.is_empty() {
            return Err(StreamPipelineError::Config {
                field: "source_name".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.output_topic.is_empty() {
            return Err(StreamPipelineError::Config {
                field: "output_topic".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.poll_timeout_ms == 0 || self.poll_timeout_ms > MAX_POLL_TIMEOUT_MS {
            return Err(StreamPipelineError::Config {
                field: "poll_timeout_ms".to_owned(),
                reason: format!("must be 1-{MAX_POLL_TIMEOUT_MS}"),
            });
        }

        RecordExtractor::from_pattern(&self.pattern)?;

        Ok(())
    }
}

/// 로그 파일 경로에서 소스 이름을 파생합니다 (파일 이름, 확장자 제외).
fn source_name_from_path(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_owned())
}

/// 파이프라인 설정 빌더
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 경계 마커를 설정합니다.
    pub fn boundary_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.boundary_marker = marker.into();
        self
    }

    /// 추출 패턴을 설정합니다.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.pattern = pattern.into();
        self
    }

    /// 소스 이름을 설정합니다.
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.config.source_name = name.into();
        self
    }

    /// 출력 토픽을 설정합니다.
    pub fn output_topic(mut self, topic: impl Into<String>) -> Self {
        self.config.output_topic = topic.into();
        self
    }

    /// 폴링 제한 시간(밀리초)을 설정합니다.
    pub fn poll_timeout_ms(mut self, ms: u64) -> Self {
        self.config.poll_timeout_ms = ms;
        self
    }

    /// 설정을 검증하고 `PipelineConfig`를 생성합니다.
    pub fn build(self) -> Result<PipelineConfig, StreamPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
