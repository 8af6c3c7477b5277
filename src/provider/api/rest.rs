use crate::item::{Book, BookId, Suggestion, UserAccount};
use crate::provider::api::shape::{
    failure_message, list_from_body, one_or_many_from_body, parse_body, saved_book_from_body, stored_books,
    suggestions_from_body,
};
use crate::provider::api::{
    AdminApi, AuthApi, AuthReply, BookApi, ClientError, ImportReceipt, LoginRequest, RegisterRequest, SearchField,
    SuggestionApi,
};
use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const BOOKS_ENDPOINT: &'static str = "api/books";
const SEARCH_ENDPOINT: &'static str = "api/books/search";
const SUGGEST_ENDPOINT: &'static str = "api/books/suggest";
const ADD_TO_COLLECTION_ENDPOINT: &'static str = "api/books/add-to-collection";
const AUTH_ENDPOINT: &'static str = "api/auth";
const ADMIN_USERS_ENDPOINT: &'static str = "api/admin/users";

/// 도서 관리 서버 REST 클라이언트
///
/// 로그인 후 받은 세션 쿠키는 내부 쿠키 저장소에 보관 되어 이후의 모든 요청에 함께 전송 된다.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, None)
    }

    /// 타임아웃이 지정 되지 않으면 reqwest 기본값을 그대로 사용한다.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut url = Url::parse(base_url)
            .map_err(|err| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, err)))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder()
            .cookie_provider(Arc::new(Jar::default()));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build()
            .map_err(|err| ClientError::RequestFailed(format!("클라이언트 생성 실패: {}", err)))?;

        Ok(Self { http, base_url: url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url.join(path)
            .map_err(|err| ClientError::InvalidBaseUrl(format!("{}: {}", path, err)))
    }

    /// 요청을 전송하고 본문을 문자열로 읽는다. 2xx 이외의 응답은 본문 내용과 상관 없이 실패로 처리한다.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ClientError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| ClientError::RequestFailed(err.to_string()))?;

        let status = response.status();
        let text = response.text()
            .await
            .map_err(|err| ClientError::RequestFailed(err.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: failure_message(status, &text),
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl BookApi for Client {
    async fn get_books(&self) -> Result<Vec<Book>, ClientError> {
        let url = self.endpoint(BOOKS_ENDPOINT)?;
        debug!("GET {}", url);

        let text = self.execute(self.http.get(url)).await?;
        stored_books(list_from_body(&text)?)
    }

    async fn create_book(&self, book: &Book) -> Result<Book, ClientError> {
        let url = self.endpoint(BOOKS_ENDPOINT)?;
        debug!("POST {}", url);

        let text = self.execute(self.http.post(url).json(&book.without_id())).await?;
        saved_book_from_body(&text)
    }

    async fn update_book(&self, id: BookId, book: &Book) -> Result<Book, ClientError> {
        let url = self.endpoint(&format!("{}/{}", BOOKS_ENDPOINT, id))?;
        debug!("PUT {}", url);

        let text = self.execute(self.http.put(url).json(book)).await?;
        saved_book_from_body(&text)
    }

    async fn delete_book(&self, id: BookId) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("{}/{}", BOOKS_ENDPOINT, id))?;
        debug!("DELETE {}", url);

        self.execute(self.http.delete(url)).await.map(|_| ())
    }

    async fn search_books(&self, field: SearchField, value: &str) -> Result<Vec<Book>, ClientError> {
        let mut url = self.endpoint(&format!("{}/{}", SEARCH_ENDPOINT, field.as_str()))?;
        url.query_pairs_mut()
            .append_pair(field.as_str(), value);
        debug!("GET {}", url);

        let text = self.execute(self.http.get(url)).await?;
        stored_books(one_or_many_from_body(&text)?)
    }
}

#[async_trait]
impl SuggestionApi for Client {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>, ClientError> {
        let mut url = self.endpoint(SUGGEST_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("limit", &limit.to_string());
        debug!("GET {}", url);

        let text = self.execute(self.http.get(url)).await?;
        list_from_body(&text)
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Suggestion>, ClientError> {
        let mut url = self.endpoint(SEARCH_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("maxResults", &max_results.to_string());
        debug!("GET {}", url);

        let text = self.execute(self.http.get(url)).await?;
        suggestions_from_body(&text)
    }

    async fn add_to_collection(&self, suggestion: &Suggestion) -> Result<ImportReceipt, ClientError> {
        let url = self.endpoint(ADD_TO_COLLECTION_ENDPOINT)?;
        debug!("POST {}", url);

        let text = self.execute(self.http.post(url).json(suggestion)).await?;
        parse_body(&text)
    }
}

#[async_trait]
impl AuthApi for Client {
    async fn me(&self) -> Result<AuthReply, ClientError> {
        let url = self.endpoint(&format!("{}/me", AUTH_ENDPOINT))?;
        let text = self.execute(self.http.get(url)).await?;
        parse_body(&text)
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthReply, ClientError> {
        let url = self.endpoint(&format!("{}/login", AUTH_ENDPOINT))?;
        let text = self.execute(self.http.post(url).json(request)).await?;
        parse_body(&text)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthReply, ClientError> {
        let url = self.endpoint(&format!("{}/register", AUTH_ENDPOINT))?;
        let text = self.execute(self.http.post(url).json(request)).await?;
        parse_body(&text)
    }

    async fn logout(&self) -> Result<AuthReply, ClientError> {
        let url = self.endpoint(&format!("{}/logout", AUTH_ENDPOINT))?;
        let text = self.execute(self.http.post(url)).await?;
        if text.trim().is_empty() {
            return Ok(AuthReply { success: true, ..AuthReply::default() });
        }
        parse_body(&text)
    }
}

#[async_trait]
impl AdminApi for Client {
    async fn get_users(&self) -> Result<Vec<UserAccount>, ClientError> {
        let url = self.endpoint(ADMIN_USERS_ENDPOINT)?;
        debug!("GET {}", url);

        let text = self.execute(self.http.get(url)).await?;
        list_from_body(&text)
    }
}
