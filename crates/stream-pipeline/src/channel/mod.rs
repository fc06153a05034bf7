//! 입출력 채널 구현
//!
//! core의 [`MessageSource`]/[`MessageSink`] trait에 대한 구현을 제공합니다:
//! - [`ChannelSource`]/[`ChannelSink`]: tokio mpsc 기반 인프로세스 엔드포인트.
//!   테스트와 프로세스 내 배선에 사용합니다.
//! - [`KafkaSource`]/[`KafkaSink`]: Kafka consumer/producer 엔드포인트.
//!
//! 파이프라인은 구체 타입이 아니라 trait에만 의존하므로, 두 구현을
//! 자유롭게 조합할 수 있습니다 (예: Kafka 입력 + 인프로세스 출력).

pub mod kafka;

pub use kafka::{KafkaSink, KafkaSource};

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use logweld_core::channel::{MessageSink, MessageSource, PollOutcome};
use logweld_core::config::PipelineSection;
use logweld_core::error::ChannelError;

/// 출력 채널로 전달된 메시지 — 토픽 이름과 바이트 페이로드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedMessage {
    /// 전달 대상 토픽
    pub topic: String,
    /// 직렬화된 페이로드
    pub payload: Bytes,
}

/// tokio mpsc 기반 입력 채널
///
/// 송신측이 모두 드롭되면 스트림이 재개될 수 없으므로 복구 불가능한
/// 조건([`PollOutcome::Fatal`])으로 취급합니다.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Bytes>,
}

impl ChannelSource {
    /// 수신측 핸들로 새 입력 채널을 생성합니다.
    pub fn new(rx: mpsc::Receiver<Bytes>) -> Self {
        Self { rx }
    }

    /// 설정된 용량([`PipelineSection::channel_capacity`])으로 인프로세스
    /// 입력 채널 쌍을 생성합니다.
    pub fn in_process(config: &PipelineSection) -> (mpsc::Sender<Bytes>, Self) {
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        (tx, Self::new(rx))
    }
}

impl MessageSource for ChannelSource {
    async fn poll(&mut self, timeout: Duration) -> PollOutcome {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Err(_) => PollOutcome::Timeout,
            Ok(Some(payload)) => PollOutcome::Message(payload),
            Ok(None) => PollOutcome::Fatal(ChannelError::Closed(
                "input channel senders dropped".to_owned(),
            )),
        }
    }

    async fn close(&mut self) {
        self.rx.close();
    }
}

/// tokio mpsc 기반 출력 채널
///
/// mpsc 전송은 수신 버퍼 적재와 동시에 확인되므로 `flush`는 no-op입니다.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<ForwardedMessage>,
}

impl ChannelSink {
    /// 송신측 핸들로 새 출력 채널을 생성합니다.
    pub fn new(tx: mpsc::Sender<ForwardedMessage>) -> Self {
        Self { tx }
    }

    /// 설정된 용량으로 인프로세스 출력 채널 쌍을 생성합니다.
    pub fn in_process(config: &PipelineSection) -> (Self, mpsc::Receiver<ForwardedMessage>) {
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        (Self::new(tx), rx)
    }
}

impl MessageSink for ChannelSink {
    async fn send(&mut self, topic: &str, payload: Bytes) -> Result<(), ChannelError> {
        self.tx
            .send(ForwardedMessage {
                topic: topic.to_owned(),
                payload,
            })
            .await
            .map_err(|_| ChannelError::Delivery {
                topic: topic.to_owned(),
                reason: "output channel receiver dropped".to_owned(),
            })
    }

    async fn flush(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn poll_returns_message_in_delivery_order() {
        let (tx, rx) = mpsc::channel(4);
        let mut source = ChannelSource::new(rx);
        tx.send(Bytes::from_static(b"first")).await.unwrap();
        tx.send(Bytes::from_static(b"second")).await.unwrap();

        let timeout = Duration::from_millis(50);
        assert!(matches!(
            source.poll(timeout).await,
            PollOutcome::Message(payload) if payload == "first"
        ));
        assert!(matches!(
            source.poll(timeout).await,
            PollOutcome::Message(payload) if payload == "second"
        ));
    }

    #[tokio::test]
    async fn poll_times_out_when_idle() {
        let (_tx, rx) = mpsc::channel::<Bytes>(4);
        let mut source = ChannelSource::new(rx);
        assert!(matches!(
            source.poll(Duration::from_millis(10)).await,
            PollOutcome::Timeout
        ));
    }

    #[tokio::test]
    async fn poll_reports_fatal_on_closed_channel() {
        let (tx, rx) = mpsc::channel::<Bytes>(4);
        drop(tx);
        let mut source = ChannelSource::new(rx);
        assert!(matches!(
            source.poll(Duration::from_millis(10)).await,
            PollOutcome::Fatal(ChannelError::Closed(_))
        ));
    }

    #[tokio::test]
    async fn sink_send_delivers_topic_and_payload() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut sink = ChannelSink::new(tx);
        sink.send("logs", Bytes::from_static(b"{}")).await.unwrap();
        sink.flush().await.unwrap();

        let message = rx.recv().await.unwrap();
        assert_eq!(message.topic, "logs");
        assert_eq!(message.payload, Bytes::from_static(b"{}"));
    }

    #[tokio::test]
    async fn in_process_pair_honors_configured_capacity() {
        let section = PipelineSection {
            channel_capacity: 2,
            ..Default::default()
        };
        let (tx, _source) = ChannelSource::in_process(&section);
        tx.try_send(Bytes::from_static(b"a")).unwrap();
        tx.try_send(Bytes::from_static(b"b")).unwrap();
        // 설정 용량을 넘는 전송은 즉시 거부됨
        assert!(tx.try_send(Bytes::from_static(b"c")).is_err());

        let (sink, _rx) = ChannelSink::in_process(&section);
        assert_eq!(sink.tx.max_capacity(), 2);
    }

    #[tokio::test]
    async fn sink_send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel::<ForwardedMessage>(4);
        drop(rx);
        let mut sink = ChannelSink::new(tx);
        let err = sink.send("logs", Bytes::new()).await.unwrap_err();
        assert!(matches!(err, ChannelError::Delivery { .. }));
    }
}
