//! 통합 테스트 -- 파이프라인 전체 흐름 검증
//!
//! 메시지 수신부터 정규화/재조립/추출/전달까지의 전체 흐름을
//! 인프로세스 채널과 스크립트 소스로 검증합니다.

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use logweld_core::channel::{MessageSource, PollOutcome};
use logweld_core::error::ChannelError;
use logweld_stream_pipeline::{
    ChannelSink, ChannelSource, ForwardedMessage, PipelineConfigBuilder, StreamPipelineBuilder,
};

/// 폴링 결과 시퀀스를 그대로 재생하는 테스트 소스
///
/// 스크립트가 소진되면 Fatal을 반환하여 실행을 종료시킵니다.
struct ScriptedSource {
    script: VecDeque<PollOutcome>,
    closed_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl ScriptedSource {
    fn new(script: Vec<PollOutcome>) -> Self {
        Self {
            script: script.into(),
            closed_tx: None,
        }
    }

    /// close 호출 시 신호를 보낼 송신측을 등록합니다.
    fn with_close_signal(mut self, tx: tokio::sync::oneshot::Sender<()>) -> Self {
        self.closed_tx = Some(tx);
        self
    }
}

impl MessageSource for ScriptedSource {
    async fn poll(&mut self, _timeout: Duration) -> PollOutcome {
        self.script.pop_front().unwrap_or_else(|| {
            PollOutcome::Fatal(ChannelError::Closed("script exhausted".to_owned()))
        })
    }

    async fn close(&mut self) {
        if let Some(tx) = self.closed_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn json_payloads(rx: &mut mpsc::Receiver<ForwardedMessage>) -> Vec<String> {
    let mut payloads = Vec::new();
    while let Ok(message) = rx.try_recv() {
        payloads.push(String::from_utf8(message.payload.to_vec()).unwrap());
    }
    payloads
}

/// 한 메시지에 두 레코드가 들어있는 경우: 경계 감지 순서대로 전달
#[tokio::test]
async fn two_records_in_one_message_forwarded_in_order() {
    let config = PipelineConfigBuilder::new()
        .boundary_marker("[v ")
        .pattern(r"\[v\s(?P<version>\d+)\]\s(?P<msg>.*)")
        .source_name("app")
        .output_topic("logs")
        .poll_timeout_ms(50)
        .build()
        .unwrap();

    let source = ScriptedSource::new(vec![PollOutcome::Message(Bytes::from_static(
        b"[v 1] start\nmiddle line\n[v 2] next",
    ))]);
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let mut pipeline = StreamPipelineBuilder::new()
        .config(config)
        .source(source)
        .sink(ChannelSink::new(out_tx))
        .build()
        .unwrap();

    let err = pipeline.run().await.unwrap_err();
    // 스크립트 소진은 fatal로 끝남
    assert!(matches!(
        err,
        logweld_stream_pipeline::StreamPipelineError::Channel(_)
    ));

    let payloads = json_payloads(&mut out_rx);
    assert_eq!(
        payloads,
        vec![
            r#"{"version":"1","msg":"start middle line","log_file":"app"}"#,
            r#"{"version":"2","msg":"next","log_file":"app"}"#,
        ]
    );
    assert_eq!(pipeline.counters().forwarded, 2);
    assert_eq!(pipeline.counters().failed, 0);
}

/// 메시지 경계의 강제 flush: 한 레코드가 두 메시지로 나뉘어 도착하면
/// 두 개의 레코드로 분리되어 전달됨 (알려진 경계 감지의 한계)
#[tokio::test]
async fn record_spanning_two_messages_is_split() {
    let config = PipelineConfigBuilder::new()
        .boundary_marker("[v ")
        .pattern(r"(?P<body>.*)")
        .source_name("app")
        .output_topic("logs")
        .build()
        .unwrap();

    let source = ScriptedSource::new(vec![
        PollOutcome::Message(Bytes::from_static(b"[v 1] head")),
        PollOutcome::Message(Bytes::from_static(b"continuation of the same record")),
    ]);
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let mut pipeline = StreamPipelineBuilder::new()
        .config(config)
        .source(source)
        .sink(ChannelSink::new(out_tx))
        .build()
        .unwrap();

    let _ = pipeline.run().await;
    let payloads = json_payloads(&mut out_rx);
    assert_eq!(payloads.len(), 2);
    assert!(payloads[0].contains("[v 1] head"));
    assert!(payloads[1].contains("continuation"));
}

/// 파티션 끝 신호 뒤의 실제 메시지는 유실/중복 없이 처리됨
#[tokio::test]
async fn end_of_partition_then_message_loses_nothing() {
    let config = PipelineConfigBuilder::new()
        .pattern(r"(?P<level>\w+):\s(?P<msg>.*)")
        .source_name("app")
        .build()
        .unwrap();

    let source = ScriptedSource::new(vec![
        PollOutcome::EndOfPartition,
        PollOutcome::Timeout,
        PollOutcome::EndOfPartition,
        PollOutcome::Message(Bytes::from_static(b"[v 1] ERROR: disk full")),
    ]);
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let mut pipeline = StreamPipelineBuilder::new()
        .config(config)
        .source(source)
        .sink(ChannelSink::new(out_tx))
        .build()
        .unwrap();

    let _ = pipeline.run().await;
    let payloads = json_payloads(&mut out_rx);
    assert_eq!(payloads.len(), 1);
    assert_eq!(pipeline.counters().forwarded, 1);
}

/// ANSI 이스케이프가 섞인 입력도 정규화 후 추출됨
#[tokio::test]
async fn ansi_sequences_are_stripped_before_extraction() {
    let config = PipelineConfigBuilder::new()
        .pattern(r"\[v\s\d+\]\s(?P<level>\w+):\s(?P<msg>.*)")
        .source_name("app")
        .build()
        .unwrap();

    let source = ScriptedSource::new(vec![PollOutcome::Message(Bytes::from_static(
        b"[v 1] \x1B[31mERROR\x1B[0m: disk full",
    ))]);
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let mut pipeline = StreamPipelineBuilder::new()
        .config(config)
        .source(source)
        .sink(ChannelSink::new(out_tx))
        .build()
        .unwrap();

    let _ = pipeline.run().await;
    let payloads = json_payloads(&mut out_rx);
    assert_eq!(
        payloads,
        vec![r#"{"level":"ERROR","msg":"disk full","log_file":"app"}"#]
    );
}

/// 패턴 불일치 레코드는 카운트만 되고 전달되지 않으며, 스트림은 계속됨
#[tokio::test]
async fn mismatched_records_counted_not_forwarded() {
    let config = PipelineConfigBuilder::new()
        .pattern(r"\[v\s(?P<version>\d+)\]")
        .source_name("app")
        .build()
        .unwrap();

    let source = ScriptedSource::new(vec![
        PollOutcome::Message(Bytes::from_static(b"not a log line")),
        PollOutcome::Message(Bytes::from_static(b"[v 7] well formed")),
    ]);
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let mut pipeline = StreamPipelineBuilder::new()
        .config(config)
        .source(source)
        .sink(ChannelSink::new(out_tx))
        .build()
        .unwrap();

    let _ = pipeline.run().await;
    let counters = pipeline.counters();
    assert_eq!(counters.failed, 1);
    assert_eq!(counters.forwarded, 1);
    assert_eq!(counters.total(), 2);
    assert_eq!(json_payloads(&mut out_rx).len(), 1);
}

/// 전달 실패는 조용히 유실되지 않고 실행을 에러로 종료시킴
#[tokio::test]
async fn delivery_failure_ends_run_with_error() {
    let config = PipelineConfigBuilder::new()
        .pattern(r"(?P<body>.*)")
        .source_name("app")
        .build()
        .unwrap();

    let source = ScriptedSource::new(vec![PollOutcome::Message(Bytes::from_static(
        b"[v 1] record",
    ))]);
    let (out_tx, out_rx) = mpsc::channel::<ForwardedMessage>(1);
    drop(out_rx); // 다운스트림이 사라진 출력 채널
    let mut pipeline = StreamPipelineBuilder::new()
        .config(config)
        .source(source)
        .sink(ChannelSink::new(out_tx))
        .build()
        .unwrap();

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(
        err,
        logweld_stream_pipeline::StreamPipelineError::Channel(ChannelError::Delivery { .. })
    ));
    assert_eq!(pipeline.counters().forwarded, 0);
}

/// 인프로세스 mpsc 채널로 묶인 파이프라인의 실시간 동작과 취소
#[tokio::test]
async fn channel_pipeline_processes_then_cancels_cleanly() {
    let config = PipelineConfigBuilder::new()
        .pattern(r"\[v\s(?P<version>\d+)\]\s(?P<msg>.*)")
        .source_name("gateway")
        .output_topic("structured")
        .poll_timeout_ms(20)
        .build()
        .unwrap();

    let section = logweld_core::config::PipelineSection {
        channel_capacity: 16,
        ..Default::default()
    };
    let (in_tx, source) = ChannelSource::in_process(&section);
    let (sink, mut out_rx) = ChannelSink::in_process(&section);
    let cancel = CancellationToken::new();
    let mut pipeline = StreamPipelineBuilder::new()
        .config(config)
        .source(source)
        .sink(sink)
        .cancellation_token(cancel.clone())
        .build()
        .unwrap();

    let handle = tokio::spawn(async move {
        let result = pipeline.run().await;
        (pipeline, result)
    });

    in_tx
        .send(Bytes::from_static(b"[v 1] first\n[v 2] second"))
        .await
        .unwrap();

    // 두 레코드가 전달될 때까지 대기
    let first = out_rx.recv().await.unwrap();
    let second = out_rx.recv().await.unwrap();
    assert_eq!(first.topic, "structured");
    assert!(String::from_utf8_lossy(&second.payload).contains("second"));

    cancel.cancel();
    let (pipeline, result) = handle.await.unwrap();
    let counters = result.unwrap();
    assert_eq!(counters.forwarded, 2);
    assert_eq!(pipeline.state_name(), "stopped");
}

/// 스크립트 소스의 close가 Draining 단계에서 호출되는지 확인
#[tokio::test]
async fn draining_closes_source_subscription() {
    let config = PipelineConfigBuilder::new()
        .pattern(r"(?P<body>.*)")
        .source_name("app")
        .build()
        .unwrap();

    let (closed_tx, mut closed_rx) = tokio::sync::oneshot::channel();
    let source = ScriptedSource::new(vec![]).with_close_signal(closed_tx);
    let (out_tx, _out_rx) = mpsc::channel(4);
    let mut pipeline = StreamPipelineBuilder::new()
        .config(config)
        .source(source)
        .sink(ChannelSink::new(out_tx))
        .build()
        .unwrap();

    let _ = pipeline.run().await;
    assert_eq!(pipeline.state_name(), "stopped");
    assert!(closed_rx.try_recv().is_ok());
}
