use crate::item::{Book, BookId, Role, Suggestion, UserAccount};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

pub mod rest;
pub mod shape;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    InvalidBaseUrl(String),
    RequestFailed(String),
    /// 2xx 이외의 응답, 본문에 `message`가 있으면 그 값을 사용한다.
    Status { status: u16, message: String },
    ResponseParseFailed(String),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::InvalidBaseUrl(message) => write!(f, "Invalid base url, {}", message),
            ClientError::RequestFailed(message) => write!(f, "Request failed, {}", message),
            ClientError::Status { status, message } => write!(f, "HTTP {}, {}", status, message),
            ClientError::ResponseParseFailed(message) => write!(f, "Unreadable response body, {}", message),
        }
    }
}

impl std::error::Error for ClientError {}

/// 필드별 원격 검색 대상
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Title,
    Author,
    Isbn,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Author => "author",
            SearchField::Isbn => "isbn",
        }
    }
}

impl Display for SearchField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 컬렉션 추가 요청 응답
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImportReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// 인증 요청 응답 (`/api/auth/*`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// 도서 CRUD 및 필드 검색
#[async_trait]
pub trait BookApi: Send + Sync {
    async fn get_books(&self) -> Result<Vec<Book>, ClientError>;

    async fn create_book(&self, book: &Book) -> Result<Book, ClientError>;

    async fn update_book(&self, id: BookId, book: &Book) -> Result<Book, ClientError>;

    async fn delete_book(&self, id: BookId) -> Result<(), ClientError>;

    /// 응답이 단일 도서이거나 비어 있어도 항상 목록으로 정규화 되어 반환된다.
    async fn search_books(&self, field: SearchField, value: &str) -> Result<Vec<Book>, ClientError>;
}

/// 외부 도서 검색(추천/전체 검색)과 컬렉션 추가
#[async_trait]
pub trait SuggestionApi: Send + Sync {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>, ClientError>;

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Suggestion>, ClientError>;

    async fn add_to_collection(&self, suggestion: &Suggestion) -> Result<ImportReceipt, ClientError>;
}

/// 세션 쿠키 기반 인증
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn me(&self) -> Result<AuthReply, ClientError>;

    async fn login(&self, request: &LoginRequest) -> Result<AuthReply, ClientError>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthReply, ClientError>;

    async fn logout(&self) -> Result<AuthReply, ClientError>;
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn get_users(&self) -> Result<Vec<UserAccount>, ClientError>;
}
