//! 설정 관리 — logweld.toml 파싱 및 런타임 설정
//!
//! [`LogweldConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGWELD_INPUT_TOPIC=raw-logs` 형식)
//! 3. 설정 파일 (`logweld.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logweld_core::error::LogweldError> {
//! use logweld_core::config::LogweldConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogweldConfig::load("logweld.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogweldConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogweldError};

/// Logweld 통합 설정
///
/// `logweld.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogweldConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 레코드 재조립 파이프라인 설정
    #[serde(default)]
    pub pipeline: PipelineSection,
    /// 구조화 추출 패턴 설정
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// 입력 채널(브로커 consumer) 설정
    #[serde(default)]
    pub input: InputChannelConfig,
    /// 출력 채널(브로커 producer) 설정
    #[serde(default)]
    pub output: OutputChannelConfig,
}

impl LogweldConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 검증 (모든 오버라이드 적용 후 한 번만)
    ///
    /// 검증이 마지막이므로, 파일의 잘못된 값을 환경변수로 바로잡을 수
    /// 있습니다. CLI 오버라이드 레이어가 있는 호출자는 [`from_file`]과
    /// [`apply_env_overrides`]를 직접 조합한 뒤 [`validate`]를 호출합니다.
    ///
    /// [`from_file`]: Self::from_file
    /// [`apply_env_overrides`]: Self::apply_env_overrides
    /// [`validate`]: Self::validate
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogweldError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 파싱합니다 (오버라이드/검증 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogweldError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogweldError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogweldError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogweldError> {
        toml::from_str(toml_str).map_err(|e| {
            LogweldError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGWELD_{SECTION}_{FIELD}`
    /// 예: `LOGWELD_INPUT_TOPIC=raw-logs`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGWELD_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGWELD_GENERAL_LOG_FORMAT");

        // Pipeline
        override_string(
            &mut self.pipeline.boundary_marker,
            "LOGWELD_PIPELINE_BOUNDARY_MARKER",
        );
        override_string(&mut self.pipeline.log_file, "LOGWELD_PIPELINE_LOG_FILE");
        override_u64(
            &mut self.pipeline.poll_timeout_ms,
            "LOGWELD_PIPELINE_POLL_TIMEOUT_MS",
        );
        override_usize(
            &mut self.pipeline.channel_capacity,
            "LOGWELD_PIPELINE_CHANNEL_CAPACITY",
        );

        // Extraction
        override_string(&mut self.extraction.pattern, "LOGWELD_EXTRACTION_PATTERN");

        // Input channel
        override_string(&mut self.input.brokers, "LOGWELD_INPUT_BROKERS");
        override_string(&mut self.input.group_id, "LOGWELD_INPUT_GROUP_ID");
        override_string(&mut self.input.topic, "LOGWELD_INPUT_TOPIC");
        override_string(&mut self.input.offset_reset, "LOGWELD_INPUT_OFFSET_RESET");

        // Output channel
        override_string(&mut self.output.brokers, "LOGWELD_OUTPUT_BROKERS");
        override_string(&mut self.output.topic, "LOGWELD_OUTPUT_TOPIC");
        override_string(&mut self.output.client_id, "LOGWELD_OUTPUT_CLIENT_ID");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogweldError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // offset_reset 검증
        let valid_resets = ["earliest", "latest"];
        if !valid_resets.contains(&self.input.offset_reset.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "input.offset_reset".to_owned(),
                reason: format!("must be one of: {}", valid_resets.join(", ")),
            }
            .into());
        }

        // 용량 0인 채널은 생성할 수 없음
        if self.pipeline.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.channel_capacity".to_owned(),
                reason: "must be at least 1".to_owned(),
            }
            .into());
        }

        // 경계 마커 검증 — 빈 마커는 모든 라인을 새 레코드로 만들어버림
        if self.pipeline.boundary_marker.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.boundary_marker".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        // 토픽 검증
        if self.input.topic.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "input.topic".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }
        if self.output.topic.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output.topic".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 레코드 재조립 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    /// 논리 레코드의 첫 라인을 식별하는 리터럴 접두사
    pub boundary_marker: String,
    /// 추출 결과에 태깅할 원본 로그 파일 경로
    ///
    /// 레코드에는 경로의 파일 이름(확장자 제외)이 `log_file` 필드로 붙습니다.
    pub log_file: String,
    /// 입력 채널 폴링 제한 시간 (밀리초)
    pub poll_timeout_ms: u64,
    /// 인프로세스 채널 용량
    pub channel_capacity: usize,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            boundary_marker: "[v ".to_owned(),
            log_file: "/var/log/app.log".to_owned(),
            poll_timeout_ms: 1000,
            channel_capacity: 1024,
        }
    }
}

/// 구조화 추출 패턴 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// 명명 캡처 그룹 정규식 (verbose 모드, 대소문자 구분)
    pub pattern: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pattern: r"(?P<level>\w+):\s(?P<msg>.*)".to_owned(),
        }
    }
}

/// 입력 채널(브로커 consumer) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputChannelConfig {
    /// 브로커 부트스트랩 주소
    pub brokers: String,
    /// Consumer 그룹 식별자
    pub group_id: String,
    /// 구독할 토픽 이름
    pub topic: String,
    /// 오프셋 리셋 정책 (earliest, latest)
    pub offset_reset: String,
}

impl Default for InputChannelConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_owned(),
            group_id: "logweld".to_owned(),
            topic: "raw-logs".to_owned(),
            offset_reset: "earliest".to_owned(),
        }
    }
}

/// 출력 채널(브로커 producer) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputChannelConfig {
    /// 브로커 부트스트랩 주소
    pub brokers: String,
    /// 전달 대상 토픽 이름
    pub topic: String,
    /// Producer 클라이언트 식별자
    pub client_id: String,
}

impl Default for OutputChannelConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_owned(),
            topic: "logs".to_owned(),
            client_id: "logweld-producer".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
