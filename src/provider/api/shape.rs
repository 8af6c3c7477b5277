//! 서버 응답 본문을 클라이언트가 사용하는 형태로 바꾸는 유일한 지점
//!
//! 서버는 같은 종류의 결과를 여러 형태로 돌려준다.
//! - 필드 검색: 단일 도서 객체, 도서 배열, 또는 빈 본문/`null`
//! - 전체 검색: `{ "suggestions": [...] }` 또는 추천 결과 배열
//! - 목록 조회: 도서 배열 또는 빈 본문/`null`, 객체는 허용하지 않는다.
//!
//! 서버가 돌려준 도서는 항상 `id`를 가지고 있어야 한다.
//!
//! 이 모듈 밖에서는 항상 `Vec<T>`만 다룬다.

use crate::item::{Book, Suggestion};
use crate::provider::api::ClientError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionPayload {
    List(Vec<Suggestion>),
    Envelope {
        #[serde(default)]
        suggestions: Option<Vec<Suggestion>>,
    },
}

#[derive(Deserialize)]
struct FailureBody {
    message: Option<String>,
}

/// 본문 전체를 `T`로 해석한다.
pub fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str::<T>(body)
        .map_err(|err| ClientError::ResponseParseFailed(err.to_string()))
}

/// 배열, 빈 본문, `null`을 목록으로 정규화 한다.
/// 배열이 아닌 객체는 파싱 실패로 본다.
pub fn list_from_body<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, ClientError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed = parse_body::<Option<Vec<T>>>(body)?;
    Ok(parsed.unwrap_or_default())
}

/// 단일 객체, 배열, 빈 본문, `null`을 모두 목록으로 정규화 한다.
/// 필드 검색 응답에만 사용한다.
pub fn one_or_many_from_body<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, ClientError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed = parse_body::<Option<OneOrMany<T>>>(body)?;
    Ok(match parsed {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

/// 생성/수정 응답으로 돌아온 도서
pub fn saved_book_from_body(body: &str) -> Result<Book, ClientError> {
    let book = parse_body::<Book>(body)?;
    require_id(book)
}

/// 서버 목록의 모든 도서가 `id`를 가지고 있는지 확인한다.
pub fn stored_books(books: Vec<Book>) -> Result<Vec<Book>, ClientError> {
    books.into_iter().map(require_id).collect()
}

fn require_id(book: Book) -> Result<Book, ClientError> {
    match book.id() {
        Some(_) => Ok(book),
        None => Err(ClientError::ResponseParseFailed("book record without id".to_owned())),
    }
}

/// 전체 검색 응답의 봉투(`suggestions`)를 벗겨낸다.
pub fn suggestions_from_body(body: &str) -> Result<Vec<Suggestion>, ClientError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed = parse_body::<Option<SuggestionPayload>>(body)?;
    Ok(match parsed {
        None => Vec::new(),
        Some(SuggestionPayload::List(items)) => items,
        Some(SuggestionPayload::Envelope { suggestions }) => suggestions.unwrap_or_default(),
    })
}

/// 실패 응답의 에러 메시지
/// 본문에 `message`가 있으면 그 값을, 없으면 HTTP 상태를 사용한다.
pub fn failure_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<FailureBody>(body)
        .ok()
        .and_then(|failure| failure.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}
