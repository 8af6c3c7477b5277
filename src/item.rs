use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// Item 모듈에서 사용할 에러 열거
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// 필수 데이터가 입력 되지 않음
    RequireArgumentMissing(String),

    /// 알 수 없는 열거형 코드
    UnknownCode(String)
}

impl Display for ItemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ItemError::RequireArgumentMissing(field) => write!(f, "{} is required", field),
            ItemError::UnknownCode(code) => write!(f, "unknown code: {}", code),
        }
    }
}

impl std::error::Error for ItemError {}

/// 서버에서 부여한 도서 아이디
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(u64);

impl BookId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for BookId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(BookId)
    }
}

impl From<u64> for BookId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// 도서
///
/// 아이디가 없는 도서는 아직 저장 되지 않은 도서이며, 서버에 생성 요청을 한 후 응답으로 받은 도서에만 아이디가 부여 된다.
/// 한번 부여된 아이디는 변경 되지 않는다.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<BookId>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    title: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    author: String,
    #[serde(default)]
    isbn: Option<String>,
    #[serde(default)]
    publish_date: Option<NaiveDate>,
    #[serde(default)]
    page_count: Option<u32>,
}

impl Book {
    pub fn builder() -> BookBuilder {
        BookBuilder::new()
    }

    pub fn id(&self) -> Option<BookId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    pub fn publish_date(&self) -> Option<NaiveDate> {
        self.publish_date
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// 필수 값(제목, 저자)이 모두 입력 되어 있는지 확인한다.
    pub fn validate(&self) -> Result<(), ItemError> {
        if self.title.trim().is_empty() {
            return Err(ItemError::RequireArgumentMissing("title".to_owned()));
        }
        if self.author.trim().is_empty() {
            return Err(ItemError::RequireArgumentMissing("author".to_owned()));
        }
        Ok(())
    }

    /// 아이디를 제외한 내용만 가지는 도서를 반환한다. 생성 요청의 본문으로 사용한다.
    pub fn without_id(&self) -> Book {
        Book { id: None, ..self.clone() }
    }

    pub fn with_id(&self, id: BookId) -> Book {
        Book { id: Some(id), ..self.clone() }
    }

    pub fn to_builder(&self) -> BookBuilder {
        let mut builder = BookBuilder::new()
            .title(self.title.clone())
            .author(self.author.clone());

        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        if let Some(isbn) = &self.isbn {
            builder = builder.isbn(isbn.clone());
        }
        if let Some(date) = self.publish_date {
            builder = builder.publish_date(date);
        }
        if let Some(page_count) = self.page_count {
            builder = builder.page_count(page_count);
        }
        builder
    }
}

/// Book 빌더
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookBuilder {
    id: Option<BookId>,
    title: Option<String>,
    author: Option<String>,
    isbn: Option<String>,
    publish_date: Option<NaiveDate>,
    page_count: Option<u32>,
}

impl BookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id<I: Into<BookId>>(mut self, id: I) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self
    }

    /// 빈 문자열은 입력 되지 않은 것으로 본다.
    pub fn isbn<S: Into<String>>(mut self, isbn: S) -> Self {
        let isbn = isbn.into();
        self.isbn = if isbn.trim().is_empty() { None } else { Some(isbn) };
        self
    }

    pub fn publish_date(mut self, date: NaiveDate) -> Self {
        self.publish_date = Some(date);
        self
    }

    pub fn page_count(mut self, page_count: u32) -> Self {
        self.page_count = Some(page_count);
        self
    }

    pub fn build(self) -> Result<Book, ItemError> {
        let book = self.build_unchecked();
        book.validate()?;
        Ok(book)
    }

    /// 유효성 검사 없이 도서를 만든다. 폼에 입력된 값을 그대로 옮길 때 사용하며,
    /// 실제 검사는 저장 직전에 [`Book::validate`]로 한다.
    pub fn build_unchecked(self) -> Book {
        Book {
            id: self.id,
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            isbn: self.isbn,
            publish_date: self.publish_date,
            page_count: self.page_count,
        }
    }
}

/// 외부 도서 검색 결과
///
/// 아직 저장 되지 않은 도서로 [`Book`]과 형태가 다르며, 컬렉션 추가 요청 전까지 아이디를 가지지 않는다.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn10: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_link: Option<String>,
}

impl Suggestion {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// 표지 이미지 주소 (중간 크기 이미지 → 썸네일 → 작은 썸네일 순)
    pub fn cover(&self) -> Option<&str> {
        self.medium_image.as_deref()
            .or(self.thumbnail.as_deref())
            .or(self.small_thumbnail.as_deref())
    }

    pub fn published_year(&self) -> Option<&str> {
        self.published_date.as_deref()
            .and_then(|date| date.get(..4))
    }

    /// 세션 동안 "추가됨" 표시에 사용할 키
    /// 구글 도서 아이디가 없으면 제목과 저자로 대신한다.
    pub fn key(&self) -> String {
        match &self.google_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => format!("{}/{}", self.title, self.authors.as_deref().unwrap_or("")),
        }
    }
}

/// 사용자 권한
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Admin,
    Other(String),
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.to_uppercase().as_str() {
            "USER" => Role::User,
            "ADMIN" => Role::Admin,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
            Role::Other(role) => write!(f, "{}", role),
        }
    }
}

/// 로그인된 사용자
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub username: String,
    pub role: Role,
}

/// 관리자 화면에서 조회하는 사용자 계정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<chrono::NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_keeps_unknown_values() {
        let roles: Vec<Role> = serde_json::from_value(json!(["ADMIN", "user", "LIBRARIAN"])).unwrap();
        assert_eq!(roles, vec![Role::Admin, Role::User, Role::Other("LIBRARIAN".into())]);
        assert_eq!(serde_json::to_value(&Role::Admin).unwrap(), json!("ADMIN"));
    }

    #[test]
    fn user_account_reads_local_timestamps() {
        let account: UserAccount = serde_json::from_value(json!({
            "id": 2,
            "username": "admin",
            "email": "admin@library.com",
            "role": "ADMIN",
            "createdAt": "2025-08-18T12:00:00"
        })).unwrap();

        assert!(account.role.is_admin());
        assert_eq!(
            account.created_at,
            chrono::NaiveDate::from_ymd_opt(2025, 8, 18).and_then(|d| d.and_hms_opt(12, 0, 0))
        );
    }

    #[test]
    fn build_rejects_blank_title_or_author() {
        let err = Book::builder().title("  ").author("Herbert").build().unwrap_err();
        assert_eq!(err, ItemError::RequireArgumentMissing("title".to_owned()));

        let err = Book::builder().title("Dune").build().unwrap_err();
        assert_eq!(err, ItemError::RequireArgumentMissing("author".to_owned()));
    }

    #[test]
    fn unsaved_book_omits_id_on_the_wire() {
        let book = Book::builder()
            .title("Dune")
            .author("Frank Herbert")
            .isbn("")
            .page_count(412)
            .publish_date(NaiveDate::from_ymd_opt(1965, 8, 1).unwrap())
            .build()
            .unwrap();

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value, json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": null,
            "publishDate": "1965-08-01",
            "pageCount": 412
        }));
        assert!(!book.is_saved());
    }

    #[test]
    fn server_book_tolerates_nulls_and_extra_fields() {
        let book: Book = serde_json::from_value(json!({
            "id": 7,
            "title": "Dune",
            "author": null,
            "publisher": "Chilton",
            "googleBooksId": "abc"
        })).unwrap();

        assert_eq!(book.id(), Some(BookId::new(7)));
        assert_eq!(book.author(), "");
        assert_eq!(book.isbn(), None);
        assert!(book.validate().is_err());
    }

    #[test]
    fn suggestion_cover_and_year_fallbacks() {
        let mut suggestion = Suggestion::new("Dune");
        assert_eq!(suggestion.cover(), None);

        suggestion.small_thumbnail = Some("small".into());
        suggestion.thumbnail = Some("thumb".into());
        assert_eq!(suggestion.cover(), Some("thumb"));

        suggestion.published_date = Some("1965-08-01".into());
        assert_eq!(suggestion.published_year(), Some("1965"));

        suggestion.published_date = Some("65".into());
        assert_eq!(suggestion.published_year(), None);
    }

    #[test]
    fn suggestion_key_prefers_google_id() {
        let mut suggestion = Suggestion::new("Dune");
        suggestion.authors = Some("Frank Herbert".into());
        assert_eq!(suggestion.key(), "Dune/Frank Herbert");

        suggestion.google_id = Some("g-1".into());
        assert_eq!(suggestion.key(), "g-1");
    }
}
