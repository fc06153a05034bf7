//! 입출력 채널 추상화 — 브로커 consumer/producer의 확장 포인트
//!
//! 파이프라인은 구체적인 브로커 클라이언트가 아니라 [`MessageSource`]와
//! [`MessageSink`] trait에만 의존합니다. 폴링 결과는 [`PollOutcome`]
//! 태그드 타입으로 표현하여, "파티션 끝"과 같은 무해한 조건을
//! 에러 제어 흐름 없이 명시적으로 분기할 수 있게 합니다.

use std::time::Duration;

use bytes::Bytes;

use crate::error::ChannelError;

/// 입력 채널 폴링 결과
///
/// 각 변형은 오케스트레이터가 서로 다르게 처리합니다:
/// - `Message`: 라인 분리 및 누적 처리
/// - `Timeout`: 다음 폴링으로 계속 (에러 아님)
/// - `EndOfPartition`: 무시하고 계속 (에러 아님)
/// - `Fatal`: 현재 실행 종료, Draining 전이
#[derive(Debug)]
pub enum PollOutcome {
    /// 메시지 수신 — UTF-8 텍스트로 디코딩 가능한 불투명 바이트 페이로드
    Message(Bytes),
    /// 대기 시간 내 메시지 없음
    Timeout,
    /// 파티션의 끝에 도달 (더 기다리면 새 메시지가 올 수 있음)
    EndOfPartition,
    /// 복구 불가능한 채널 에러
    Fatal(ChannelError),
}

/// 입력 채널 trait — at-least-once 바이트 메시지 스트림의 consumer 측
///
/// 구현체는 `poll`이 `timeout` 내에 반드시 반환하도록 보장해야 합니다.
/// 외부 중단 신호가 폴링 사이에 관찰될 수 있어야 하기 때문입니다.
pub trait MessageSource: Send {
    /// 다음 메시지를 제한 시간 내에서 폴링합니다.
    fn poll(&mut self, timeout: Duration) -> impl Future<Output = PollOutcome> + Send;

    /// 채널 구독/연결을 정리합니다 (Draining 단계에서 호출).
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// 출력 채널 trait — 바이트 페이로드를 토픽으로 전달하는 producer 측
///
/// `send` 후 `flush`를 호출하면 전달이 동기적으로 확인됩니다.
/// 전달 실패는 반드시 `Err`로 표면화되어야 하며, 조용히 유실되면 안 됩니다.
pub trait MessageSink: Send {
    /// 페이로드를 지정된 토픽으로 전송 큐에 넣습니다.
    fn send(
        &mut self,
        topic: &str,
        payload: Bytes,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// 큐에 있는 전송을 전달 확인까지 대기합니다.
    fn flush(&mut self) -> impl Future<Output = Result<(), ChannelError>> + Send;
}
