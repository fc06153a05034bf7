//! 파이프라인 오케스트레이션 -- consume 루프, 상태 기계, 종료 처리
//!
//! [`StreamPipeline`]은 입력 채널에서 메시지를 폴링하여 라인 단위로
//! 정규화/누적하고, 경계가 완성될 때마다 추출과 전달을 수행합니다.
//!
//! # 상태 기계
//! ```text
//! Idle -> Running -> Draining -> Stopped
//! ```
//! - `Running`: 제한 시간 폴링 루프. 타임아웃과 파티션 끝은 무해한 조건으로
//!   루프를 계속하고, 그 외 채널 에러는 실행을 종료합니다.
//! - `Draining`: 입력 채널 구독을 정리합니다.
//! - `Stopped`: 최종 카운터를 보고하는 종료 상태입니다.
//!
//! # 메시지 경계 flush
//! 각 입력 메시지의 라인을 모두 소비한 뒤 누적기를 무조건 한 번 flush하여,
//! 폴링 공백 사이에 레코드가 미완성 상태로 남지 않도록 보장합니다.
//! 대가로, 정말로 두 메시지에 걸쳐 도착하는 레코드는 두 개로 분리될 수
//! 있습니다. 이는 관찰 가능한 출력을 보존하기 위해 그대로 유지하는
//! 알려진 경계 감지의 한계이며, 수정 대상 결함이 아닙니다.
//!
//! # 취소
//! 외부 중단 신호는 라인 사이 안전 지점에서 관찰됩니다. 취소 시 진행 중
//! 레코드는 flush 없이 폐기됩니다 (프로세스가 종료되는 중이므로).

use std::time::Duration;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use logweld_core::channel::{MessageSink, MessageSource, PollOutcome};
use logweld_core::error::ChannelError;

use crate::accumulator::BoundaryAccumulator;
use crate::config::PipelineConfig;
use crate::error::StreamPipelineError;
use crate::extractor::RecordExtractor;
use crate::normalizer::AnsiNormalizer;
use crate::sink::{ForwardingSink, PipelineCounters};

/// 파이프라인 실행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    /// consume 루프 시작 전
    Idle,
    /// consume 루프 실행 중
    Running,
    /// 입력 채널 구독 정리 중
    Draining,
    /// 종료됨 (터미널 상태)
    Stopped,
}

/// 스트림 파이프라인 — 단일 순차 실행 흐름의 오케스트레이터
///
/// 인스턴스 하나가 누적기/싱크를 단독 소유하므로, 소스별로 독립 인스턴스를
/// 병렬 실행해도 상태가 공유되지 않습니다.
///
/// # 사용 예시
/// ```ignore
/// use logweld_stream_pipeline::{StreamPipelineBuilder, PipelineConfig};
///
/// let mut pipeline = StreamPipelineBuilder::new()
///     .config(config)
///     .source(source)
///     .sink(sink)
///     .cancellation_token(cancel.clone())
///     .build()?;
///
/// let counters = pipeline.run().await?;
/// ```
pub struct StreamPipeline<S: MessageSource, K: MessageSink> {
    /// 파이프라인 설정
    config: PipelineConfig,
    /// 현재 상태
    state: PipelineState,
    /// ANSI 정규화기
    normalizer: AnsiNormalizer,
    /// 경계 누적기
    accumulator: BoundaryAccumulator,
    /// 레코드 추출기 (설정에서 한 번 컴파일)
    extractor: RecordExtractor,
    /// 전달 싱크 (카운터 소유)
    sink: ForwardingSink<K>,
    /// 입력 채널
    source: S,
    /// 외부 중단 신호
    cancel: CancellationToken,
}

impl<S: MessageSource, K: MessageSink> StreamPipeline<S, K> {
    /// 현재 상태 이름을 반환합니다.
    pub fn state_name(&self) -> &str {
        match self.state {
            PipelineState::Idle => "idle",
            PipelineState::Running => "running",
            PipelineState::Draining => "draining",
            PipelineState::Stopped => "stopped",
        }
    }

    /// 현재 카운터 스냅샷을 반환합니다.
    pub fn counters(&self) -> PipelineCounters {
        self.sink.counters()
    }

    /// consume 루프를 실행합니다.
    ///
    /// 다음 중 하나가 일어날 때까지 반환하지 않습니다:
    /// - 외부 중단 신호 → `Ok(최종 카운터)`
    /// - 복구 불가능한 채널 에러 또는 전달 실패 → `Err`
    ///
    /// 어느 경로든 입력 채널 구독은 정리되고 최종 카운터가 로그로
    /// 보고됩니다.
    pub async fn run(&mut self) -> Result<PipelineCounters, StreamPipelineError> {
        if self.state != PipelineState::Idle {
            return Err(StreamPipelineError::AlreadyRan);
        }
        self.state = PipelineState::Running;
        let poll_timeout = Duration::from_millis(self.config.poll_timeout_ms);
        tracing::info!(
            boundary_marker = %self.config.boundary_marker,
            source_name = %self.config.source_name,
            output_topic = %self.config.output_topic,
            "stream pipeline running"
        );

        loop {
            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("stop signal received");
                    // 진행 중 레코드는 전달하지 않고 폐기
                    self.accumulator.discard();
                    self.drain().await;
                    return Ok(self.finish());
                }
                outcome = self.source.poll(poll_timeout) => outcome,
            };

            match outcome {
                PollOutcome::Timeout => continue,
                PollOutcome::EndOfPartition => continue,
                PollOutcome::Message(payload) => {
                    if let Err(err) = self.process_message(&payload).await {
                        tracing::error!(error = %err, "record delivery failed");
                        self.drain().await;
                        self.finish();
                        return Err(err.into());
                    }
                }
                PollOutcome::Fatal(err) => {
                    tracing::error!(error = %err, "fatal input channel error");
                    self.drain().await;
                    self.finish();
                    return Err(err.into());
                }
            }
        }
    }

    /// 메시지 하나를 라인 단위로 처리하고, 마지막에 누적기를 flush합니다.
    async fn process_message(&mut self, payload: &Bytes) -> Result<(), ChannelError> {
        let text = String::from_utf8_lossy(payload);
        for line in text.lines() {
            // 라인 사이 안전 지점 — 취소는 외부 루프에서 처리
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            let line = self.normalizer.normalize(line);
            if let Some(record) = self.accumulator.feed(&line) {
                self.dispatch(&record).await?;
            }
        }

        // 메시지 경계 도달: 진행 중 레코드를 강제 완성
        if let Some(record) = self.accumulator.flush() {
            self.dispatch(&record).await?;
        }
        Ok(())
    }

    /// 완성된 레코드 하나를 추출기와 싱크에 통과시킵니다.
    async fn dispatch(&mut self, record: &str) -> Result<(), ChannelError> {
        let extracted = self.extractor.extract(record);
        self.sink.submit(extracted, record).await
    }

    /// 입력 채널 구독을 정리합니다 (Draining).
    async fn drain(&mut self) {
        self.state = PipelineState::Draining;
        tracing::info!("draining: releasing input channel subscription");
        self.source.close().await;
    }

    /// Stopped로 전이하고 최종 카운터를 보고합니다.
    fn finish(&mut self) -> PipelineCounters {
        self.state = PipelineState::Stopped;
        let counters = self.sink.counters();
        tracing::info!(
            forwarded = counters.forwarded,
            failed = counters.failed,
            "stream pipeline stopped"
        );
        counters
    }
}

/// 스트림 파이프라인 빌더
///
/// 구성 요소를 조립하고 빌드 시 설정을 검증하며 추출 패턴을 컴파일합니다.
pub struct StreamPipelineBuilder<S, K> {
    config: PipelineConfig,
    source: Option<S>,
    sink: Option<K>,
    cancel: Option<CancellationToken>,
}

impl<S: MessageSource, K: MessageSink> StreamPipelineBuilder<S, K> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            source: None,
            sink: None,
            cancel: None,
        }
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 입력 채널을 지정합니다.
    pub fn source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    /// 출력 채널을 지정합니다.
    pub fn sink(mut self, sink: K) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 외부 중단 신호 토큰을 지정합니다.
    ///
    /// 지정하지 않으면 파이프라인은 채널 종료로만 멈춥니다.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// 설정을 검증하고 파이프라인을 빌드합니다.
    ///
    /// 추출 패턴 컴파일이 여기서 수행되므로, 잘못된 패턴은 소비 시작 전의
    /// 설정 에러로 드러납니다.
    pub fn build(self) -> Result<StreamPipeline<S, K>, StreamPipelineError> {
        self.config.validate()?;

        let source = self.source.ok_or_else(|| StreamPipelineError::Config {
            field: "source".to_owned(),
            reason: "input channel is required".to_owned(),
        })?;
        let sink = self.sink.ok_or_else(|| StreamPipelineError::Config {
            field: "sink".to_owned(),
            reason: "output channel is required".to_owned(),
        })?;

        let extractor = RecordExtractor::from_pattern(&self.config.pattern)?;
        let accumulator = BoundaryAccumulator::new(self.config.boundary_marker.clone());
        let forwarding = ForwardingSink::new(
            sink,
            self.config.output_topic.clone(),
            self.config.source_name.clone(),
        );

        Ok(StreamPipeline {
            config: self.config,
            state: PipelineState::Idle,
            normalizer: AnsiNormalizer::new(),
            accumulator,
            extractor,
            sink: forwarding,
            source,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl<S: MessageSource, K: MessageSink> Default for StreamPipelineBuilder<S, K> {
    fn default() -> Self {
        Self::new()
    }
}
