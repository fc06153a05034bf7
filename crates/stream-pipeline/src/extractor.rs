//! 구조화 필드 추출 -- 명명 캡처 정규식 매칭
//!
//! [`RecordExtractor`]는 설정에서 한 번 컴파일된 명명 캡처 패턴을
//! 완성된 논리 레코드에 적용하여 필드 매핑을 생성합니다.
//! 컴파일은 핫 패스 밖(파이프라인 빌드 시)에서 수행됩니다.
//!
//! # 매칭 의미론
//! - 패턴은 verbose(공백 무시) 모드, 대소문자 구분으로 평가됩니다.
//! - 매칭은 레코드 시작 위치에 앵커됩니다. 전체 일치는 요구하지 않으며,
//!   접두 일치 후 남는 내용은 무시됩니다.
//! - 시작 위치에서 매칭 실패는 예외 상황이 아니라 `None`으로 표현되는
//!   예상된 결과입니다.
//!
//! 필드 집합은 설정 시점에만 알 수 있으므로 [`ExtractedFields`]는
//! 고정 레코드 타입이 아닌 열린 문자열 키 맵입니다.

use regex::{Regex, RegexBuilder};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::StreamPipelineError;

/// 추출된 필드 매핑 — 캡처 그룹 순서를 보존하는 열린 문자열 맵
///
/// JSON 직렬화 시 삽입 순서대로 필드-이름/값 쌍의 객체가 됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    fields: Vec<(String, String)>,
}

impl ExtractedFields {
    /// 빈 필드 매핑을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드를 추가합니다 (같은 이름이 이미 있으면 값을 교체).
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// 이름으로 필드 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// 필드 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 필드가 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// (이름, 값) 쌍을 삽입 순서대로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl Serialize for ExtractedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// 레코드 추출기 — 설정에서 컴파일된 불변 매처
#[derive(Debug)]
pub struct RecordExtractor {
    regex: Regex,
    field_names: Vec<String>,
}

impl RecordExtractor {
    /// 명명 캡처 패턴을 컴파일하여 추출기를 생성합니다.
    ///
    /// 패턴은 `\A(?: ... )`로 감싸 레코드 시작 위치에 앵커됩니다.
    /// verbose 모드에서 후행 주석이 닫는 괄호를 삼키지 않도록
    /// 패턴 뒤에 개행을 넣습니다.
    pub fn from_pattern(pattern: &str) -> Result<Self, StreamPipelineError> {
        let anchored = format!("\\A(?:{pattern}\n)");
        let regex = RegexBuilder::new(&anchored)
            .ignore_whitespace(true)
            .build()
            .map_err(|e| StreamPipelineError::Pattern(e.to_string()))?;
        let field_names = regex
            .capture_names()
            .flatten()
            .map(str::to_owned)
            .collect();
        Ok(Self { regex, field_names })
    }

    /// 레코드에서 구조화 필드를 추출합니다.
    ///
    /// 시작 위치에서 매칭되지 않으면 `None`을 반환합니다.
    /// 매칭에 참여하지 않은 캡처 그룹은 빈 문자열로 채워집니다.
    pub fn extract(&self, record: &str) -> Option<ExtractedFields> {
        let caps = self.regex.captures(record)?;
        let mut fields = ExtractedFields::new();
        for name in &self.field_names {
            let value = caps.name(name).map(|m| m.as_str()).unwrap_or_default();
            fields.insert(name.clone(), value);
        }
        Some(fields)
    }

    /// 패턴에 정의된 캡처 그룹 이름 목록을 반환합니다.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }
}
