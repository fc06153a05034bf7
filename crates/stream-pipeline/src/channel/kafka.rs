//! Kafka 채널 엔드포인트
//!
//! 입력은 [`StreamConsumer`], 출력은 [`FutureProducer`]를 사용합니다.
//! 연결 파라미터는 core 설정의 `[input]`/`[output]` 섹션에서 가져오며,
//! 인증/암호화 설정은 이 레이어의 범위 밖입니다 (이미 연결 가능한
//! 브로커를 가정).
//!
//! # 폴링 의미론
//! - 제한 시간 내 메시지 없음 → [`PollOutcome::Timeout`]
//! - 파티션 끝 도달 → [`PollOutcome::EndOfPartition`] (무해, 루프 계속)
//! - 그 외 consumer 에러 → [`PollOutcome::Fatal`]
//!
//! Producer 전송은 레코드마다 전달 확인을 대기하므로 배치가 없고,
//! 전달 순서가 처리 순서와 일치합니다.

use std::time::Duration;

use bytes::Bytes;
use rdkafka::ClientConfig;
use rdkafka::Message;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};

use logweld_core::channel::{MessageSink, MessageSource, PollOutcome};
use logweld_core::config::{InputChannelConfig, OutputChannelConfig};
use logweld_core::error::ChannelError;

/// Producer 전송/플러시 대기 상한
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Kafka 입력 채널 — consumer 측
pub struct KafkaSource {
    consumer: StreamConsumer,
}

impl KafkaSource {
    /// 설정된 브로커에 consumer를 만들고 입력 토픽을 구독합니다.
    ///
    /// 실제 연결은 지연 수립되므로, 브로커 불달은 이후 폴링에서
    /// 드러납니다.
    pub fn connect(config: &InputChannelConfig) -> Result<Self, ChannelError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", &config.offset_reset)
            .set("enable.partition.eof", "true")
            .create()
            .map_err(|e| ChannelError::Fatal(format!("consumer creation failed: {e}")))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| ChannelError::Fatal(format!("subscribe failed: {e}")))?;

        tracing::info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            topic = %config.topic,
            "kafka consumer subscribed"
        );
        Ok(Self { consumer })
    }
}

impl MessageSource for KafkaSource {
    async fn poll(&mut self, timeout: Duration) -> PollOutcome {
        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_) => PollOutcome::Timeout,
            Ok(Ok(message)) => {
                let payload = message
                    .payload()
                    .map(Bytes::copy_from_slice)
                    .unwrap_or_default();
                PollOutcome::Message(payload)
            }
            Ok(Err(KafkaError::PartitionEOF(partition))) => {
                tracing::debug!(partition, "reached end of partition");
                PollOutcome::EndOfPartition
            }
            Ok(Err(e)) => PollOutcome::Fatal(ChannelError::Fatal(e.to_string())),
        }
    }

    async fn close(&mut self) {
        self.consumer.unsubscribe();
    }
}

/// Kafka 출력 채널 — producer 측
pub struct KafkaSink {
    producer: FutureProducer,
}

impl KafkaSink {
    /// 설정된 브로커에 producer를 생성합니다.
    pub fn connect(config: &OutputChannelConfig) -> Result<Self, ChannelError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("client.id", &config.client_id)
            .create()
            .map_err(|e| ChannelError::Fatal(format!("producer creation failed: {e}")))?;

        tracing::info!(
            brokers = %config.brokers,
            client_id = %config.client_id,
            "kafka producer created"
        );
        Ok(Self { producer })
    }
}

impl MessageSink for KafkaSink {
    async fn send(&mut self, topic: &str, payload: Bytes) -> Result<(), ChannelError> {
        let record = FutureRecord::<(), [u8]>::to(topic).payload(payload.as_ref());
        self.producer
            .send(record, DELIVERY_TIMEOUT)
            .await
            .map(|_| ())
            .map_err(|(e, _)| ChannelError::Delivery {
                topic: topic.to_owned(),
                reason: e.to_string(),
            })
    }

    async fn flush(&mut self) -> Result<(), ChannelError> {
        self.producer
            .flush(DELIVERY_TIMEOUT)
            .map_err(|e| ChannelError::Fatal(format!("producer flush failed: {e}")))
    }
}
