//! 경계 기반 레코드 재조립
//!
//! [`BoundaryAccumulator`]는 정규화된 텍스트 라인 시퀀스를 소비하여,
//! 설정된 경계 마커(새 레코드의 첫 라인을 식별하는 리터럴 접두사)를 기준으로
//! 멀티라인 논리 레코드로 그룹화합니다.
//!
//! # 동작 규칙
//! - 마커로 시작하는 라인은 새 레코드를 엽니다. 버퍼에 진행 중인 레코드가
//!   있으면 그 내용을 완성 레코드로 방출한 뒤, 버퍼를 트림된 마커 라인으로
//!   초기화합니다.
//! - 그 외 라인은 버퍼에 그대로 추가됩니다 (선행/후행 공백 보존).
//! - `flush`는 버퍼가 비어있지 않으면 내용을 방출하고 버퍼를 비웁니다.
//!   업스트림 메시지 경계마다 호출되므로, 여러 메시지에 걸친 레코드는
//!   강제로 분리될 수 있습니다 (의도된 경계 감지의 한계).
//!
//! 완성 레코드는 버퍼의 라인들을 단일 공백으로 결합한 문자열입니다.
//! 단일 순차 소비자만 사용하므로 락이 필요 없습니다.

/// 경계 마커 기반 라인 누적기
#[derive(Debug)]
pub struct BoundaryAccumulator {
    /// 경계 마커 리터럴 접두사 (예: "[v ")
    marker: String,
    /// 조립 중인 레코드의 라인 버퍼
    buffer: Vec<String>,
}

impl BoundaryAccumulator {
    /// 지정된 경계 마커로 새 누적기를 생성합니다.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            buffer: Vec::new(),
        }
    }

    /// 라인 하나를 소비하고, 경계가 감지되면 직전 레코드를 방출합니다.
    pub fn feed(&mut self, line: &str) -> Option<String> {
        if line.starts_with(&self.marker) {
            let completed = self.take_joined();
            self.buffer.push(line.trim().to_owned());
            completed
        } else {
            self.buffer.push(line.to_owned());
            None
        }
    }

    /// 진행 중인 레코드를 강제로 완성합니다.
    ///
    /// 버퍼가 비어있으면 아무것도 방출하지 않습니다.
    pub fn flush(&mut self) -> Option<String> {
        self.take_joined()
    }

    /// 진행 중인 레코드를 방출 없이 폐기합니다 (취소 경로 전용).
    pub fn discard(&mut self) {
        self.buffer.clear();
    }

    /// 버퍼에 쌓인 라인 수를 반환합니다.
    pub fn pending_lines(&self) -> usize {
        self.buffer.len()
    }

    /// 진행 중인 레코드가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn take_joined(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let joined = self.buffer.join(" ");
        self.buffer.clear();
        Some(joined)
    }
}
