//! 전달 싱크 -- 추출 결과 직렬화, 출력 채널 전달, 카운팅
//!
//! [`ForwardingSink`]는 추출된 필드 매핑에 출처 메타데이터(`log_file`)를
//! 붙여 JSON으로 직렬화한 뒤 출력 채널의 설정된 토픽으로 전달합니다.
//! 레코드 하나당 한 번의 전송과 전달 확인을 수행하므로, 느린 다운스트림은
//! 자연스러운 백프레셔로 작동합니다 (배치 없음, 전달 순서 보장 우선).
//!
//! 성공/실패 카운터는 싱크 인스턴스가 단독 소유합니다. 프로세스 전역
//! 가변 상태가 아니므로, 파이프라인 인스턴스를 병렬로 여러 개 실행해도
//! 카운터가 섞이지 않습니다.

use bytes::Bytes;

use logweld_core::channel::MessageSink;
use logweld_core::error::ChannelError;

use crate::extractor::ExtractedFields;

/// 파이프라인 실행 누계 카운터
///
/// 실행 중 리셋되지 않으며, 종료 시 보고됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineCounters {
    /// 추출 성공 후 전달된 레코드 수
    pub forwarded: u64,
    /// 패턴 불일치로 전달되지 않은 레코드 수
    pub failed: u64,
}

impl PipelineCounters {
    /// 처리된 논리 레코드 총수를 반환합니다.
    pub fn total(&self) -> u64 {
        self.forwarded + self.failed
    }
}

/// 전달 싱크 — 출력 채널 전달 및 카운팅
pub struct ForwardingSink<K: MessageSink> {
    /// 출력 채널
    sink: K,
    /// 전달 대상 토픽
    topic: String,
    /// 레코드에 태깅할 원본 소스 이름
    source_name: String,
    /// 실행 누계 카운터 (싱크 단독 소유)
    counters: PipelineCounters,
}

impl<K: MessageSink> ForwardingSink<K> {
    /// 새 전달 싱크를 생성합니다.
    pub fn new(sink: K, topic: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            sink,
            topic: topic.into(),
            source_name: source_name.into(),
            counters: PipelineCounters::default(),
        }
    }

    /// 추출 결과 하나를 제출합니다.
    ///
    /// - `Some(fields)`: `log_file` 필드를 붙여 직렬화하고 전달을 확인한 뒤
    ///   성공 카운터를 증가시킵니다. 전달 실패는 `Err`로 전파됩니다.
    /// - `None`: 원본 레코드 텍스트를 진단 이벤트로 남기고 실패 카운터만
    ///   증가시킵니다. 다운스트림으로는 아무것도 전달하지 않습니다.
    pub async fn submit(
        &mut self,
        extracted: Option<ExtractedFields>,
        record: &str,
    ) -> Result<(), ChannelError> {
        match extracted {
            Some(mut fields) => {
                fields.insert("log_file", self.source_name.clone());
                let payload = serde_json::to_vec(&fields).map_err(|e| ChannelError::Delivery {
                    topic: self.topic.clone(),
                    reason: format!("serialization failed: {e}"),
                })?;
                self.sink.send(&self.topic, Bytes::from(payload)).await?;
                self.sink.flush().await?;
                self.counters.forwarded += 1;
                tracing::debug!(
                    fields = fields.len(),
                    topic = %self.topic,
                    "forwarded structured record"
                );
                Ok(())
            }
            None => {
                tracing::warn!(record, "failed to extract fields from record");
                self.counters.failed += 1;
                Ok(())
            }
        }
    }

    /// 현재 카운터 스냅샷을 반환합니다.
    pub fn counters(&self) -> PipelineCounters {
        self.counters
    }
}
