//! 터미널 제어 시퀀스 제거
//!
//! [`AnsiNormalizer`]는 원시 로그 텍스트에서 ANSI/터미널 이스케이프 시퀀스를
//! 제거하여, 이후의 경계 감지와 패턴 매칭이 깨끗한 내용에 대해 동작하도록 합니다.
//!
//! 제거 대상:
//! - CSI 형식: `ESC [` + 파라미터 바이트(`0-?`) + 중간 바이트(` -/`) + 최종 바이트(`@-~`)
//! - 단일 문자 이스케이프 형식: `ESC` + `@-Z`, `\`, `]`, `^`, `_`
//!
//! 정규화는 멱등적이며 실패 조건이 없습니다. 이스케이프 시퀀스가 없는
//! 입력은 그대로 반환됩니다 (추가 할당 없음).

use std::borrow::Cow;

use regex::Regex;

/// ANSI 이스케이프 시퀀스 정규화기
///
/// 정규식은 생성 시 한 번만 컴파일됩니다.
#[derive(Debug)]
pub struct AnsiNormalizer {
    pattern: Regex,
}

impl AnsiNormalizer {
    /// 새 정규화기를 생성합니다.
    pub fn new() -> Self {
        // 고정 패턴이므로 컴파일은 실패할 수 없음
        let pattern = Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])")
            .expect("hardcoded ANSI escape pattern compiles");
        Self { pattern }
    }

    /// 텍스트에서 이스케이프 시퀀스를 제거합니다.
    ///
    /// 시퀀스가 없으면 입력을 빌려 그대로 반환합니다.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(text, "")
    }
}

impl Default for AnsiNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
