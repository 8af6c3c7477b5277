#![allow(dead_code)]

use async_trait::async_trait;
use book_library_client::item::{Book, BookId, Role, Suggestion, UserAccount};
use book_library_client::provider::api::{
    AdminApi, AuthApi, AuthReply, BookApi, ClientError, ImportReceipt, LoginRequest, RegisterRequest, SearchField,
    SuggestionApi,
};
use book_library_client::view::{Renderer, Toast, ViewEvent};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetBooks,
    CreateBook(Book),
    UpdateBook(BookId, Book),
    DeleteBook(BookId),
    SearchBooks(SearchField, String),
    Suggest(String, usize),
    Search(String, usize),
    AddToCollection(String),
    Me,
    Login(String),
    Register(String),
    Logout,
    GetUsers,
}

/// 메모리 위에서 동작하는 가짜 서버
///
/// 모든 호출을 기록하며 `fail`로 지정한 작업은 지정한 에러로 실패한다.
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    books: Mutex<Vec<Book>>,
    next_id: Mutex<u64>,
    suggestions: Mutex<Vec<Suggestion>>,
    suggest_delay: Mutex<Duration>,
    search_delay: Mutex<Duration>,
    receipt: Mutex<ImportReceipt>,
    accounts: Mutex<Vec<(String, String, Role)>>,
    logged_in: Mutex<Option<(String, Role)>>,
    users: Mutex<Vec<UserAccount>>,
    failures: Mutex<HashMap<&'static str, ClientError>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            books: Mutex::new(Vec::new()),
            next_id: Mutex::new(100),
            suggestions: Mutex::new(Vec::new()),
            suggest_delay: Mutex::new(Duration::ZERO),
            search_delay: Mutex::new(Duration::ZERO),
            receipt: Mutex::new(ImportReceipt { success: true, message: Some("Book added".into()) }),
            accounts: Mutex::new(Vec::new()),
            logged_in: Mutex::new(None),
            users: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_books(self, books: Vec<Book>) -> Self {
        *self.books.lock().unwrap() = books;
        self
    }

    pub fn with_suggestions(self, suggestions: Vec<Suggestion>) -> Self {
        *self.suggestions.lock().unwrap() = suggestions;
        self
    }

    pub fn with_account(self, username: &str, password: &str, role: Role) -> Self {
        self.accounts.lock().unwrap().push((username.into(), password.into(), role));
        self
    }

    pub fn with_users(self, users: Vec<UserAccount>) -> Self {
        *self.users.lock().unwrap() = users;
        self
    }

    pub fn set_suggest_delay(&self, delay: Duration) {
        *self.suggest_delay.lock().unwrap() = delay;
    }

    pub fn set_search_delay(&self, delay: Duration) {
        *self.search_delay.lock().unwrap() = delay;
    }

    pub fn set_receipt(&self, receipt: ImportReceipt) {
        *self.receipt.lock().unwrap() = receipt;
    }

    pub fn fail(&self, operation: &'static str, err: ClientError) {
        self.failures.lock().unwrap().insert(operation, err);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failures.lock().unwrap().remove(operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn suggest_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|call| matches!(call, Call::Suggest(..))).collect()
    }

    pub fn server_books(&self) -> Vec<Book> {
        self.books.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub fn server_error() -> ClientError {
    ClientError::Status { status: 500, message: "HTTP error! status: 500".into() }
}

pub fn book(id: u64, title: &str, author: &str) -> Book {
    Book::builder().id(id).title(title).author(author).build().unwrap()
}

pub fn form(title: &str, author: &str) -> Book {
    Book::builder().title(title).author(author).build_unchecked()
}

pub fn suggestion(google_id: &str, title: &str, authors: &str) -> Suggestion {
    Suggestion {
        google_id: Some(google_id.into()),
        authors: Some(authors.into()),
        ..Suggestion::new(title)
    }
}

#[async_trait]
impl BookApi for FakeApi {
    async fn get_books(&self) -> Result<Vec<Book>, ClientError> {
        self.record("get_books", Call::GetBooks)?;
        Ok(self.server_books())
    }

    async fn create_book(&self, book: &Book) -> Result<Book, ClientError> {
        self.record("create_book", Call::CreateBook(book.clone()))?;

        let mut next_id = self.next_id.lock().unwrap();
        let created = book.with_id(BookId::new(*next_id));
        *next_id += 1;

        self.books.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_book(&self, id: BookId, book: &Book) -> Result<Book, ClientError> {
        self.record("update_book", Call::UpdateBook(id, book.clone()))?;

        let updated = book.with_id(id);
        let mut books = self.books.lock().unwrap();
        if let Some(existing) = books.iter_mut().find(|b| b.id() == Some(id)) {
            *existing = updated.clone();
        }
        Ok(updated)
    }

    async fn delete_book(&self, id: BookId) -> Result<(), ClientError> {
        self.record("delete_book", Call::DeleteBook(id))?;
        self.books.lock().unwrap().retain(|b| b.id() != Some(id));
        Ok(())
    }

    async fn search_books(&self, field: SearchField, value: &str) -> Result<Vec<Book>, ClientError> {
        self.record("search_books", Call::SearchBooks(field, value.to_owned()))?;

        let value = value.to_lowercase();
        let found = self.server_books()
            .into_iter()
            .filter(|b| {
                let target = match field {
                    SearchField::Title => b.title().to_lowercase(),
                    SearchField::Author => b.author().to_lowercase(),
                    SearchField::Isbn => b.isbn().unwrap_or("").to_lowercase(),
                };
                target.contains(&value)
            })
            .collect();
        Ok(found)
    }
}

#[async_trait]
impl SuggestionApi for FakeApi {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>, ClientError> {
        self.record("suggest", Call::Suggest(query.to_owned(), limit))?;

        let delay = *self.suggest_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let query = query.to_lowercase();
        let found = self.suggestions.lock().unwrap()
            .iter()
            .filter(|s| s.title.to_lowercase().contains(&query))
            .take(limit)
            .cloned()
            .collect();
        Ok(found)
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Suggestion>, ClientError> {
        self.record("search", Call::Search(query.to_owned(), max_results))?;

        let delay = *self.search_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.suggestions.lock().unwrap().iter().take(max_results).cloned().collect())
    }

    async fn add_to_collection(&self, suggestion: &Suggestion) -> Result<ImportReceipt, ClientError> {
        self.record("add_to_collection", Call::AddToCollection(suggestion.key()))?;
        Ok(self.receipt.lock().unwrap().clone())
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn me(&self) -> Result<AuthReply, ClientError> {
        self.record("me", Call::Me)?;

        let reply = match self.logged_in.lock().unwrap().clone() {
            Some((username, role)) => AuthReply {
                success: true,
                username: Some(username),
                role: Some(role),
                message: None,
            },
            None => AuthReply { success: false, ..AuthReply::default() },
        };
        Ok(reply)
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthReply, ClientError> {
        self.record("login", Call::Login(request.username.clone()))?;

        let account = self.accounts.lock().unwrap()
            .iter()
            .find(|(username, password, _)| *username == request.username && *password == request.password)
            .cloned();

        let reply = match account {
            Some((username, _, role)) => {
                *self.logged_in.lock().unwrap() = Some((username.clone(), role.clone()));
                AuthReply {
                    success: true,
                    username: Some(username),
                    role: Some(role),
                    message: Some("Login successful".into()),
                }
            }
            None => AuthReply { success: false, ..AuthReply::default() },
        };
        Ok(reply)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthReply, ClientError> {
        self.record("register", Call::Register(request.username.clone()))?;

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|(username, _, _)| *username == request.username) {
            return Ok(AuthReply {
                success: false,
                message: Some("Username already exists".into()),
                ..AuthReply::default()
            });
        }

        accounts.push((request.username.clone(), request.password.clone(), Role::User));
        Ok(AuthReply { success: true, ..AuthReply::default() })
    }

    async fn logout(&self) -> Result<AuthReply, ClientError> {
        self.record("logout", Call::Logout)?;
        *self.logged_in.lock().unwrap() = None;
        Ok(AuthReply { success: true, ..AuthReply::default() })
    }
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn get_users(&self) -> Result<Vec<UserAccount>, ClientError> {
        self.record("get_users", Call::GetUsers)?;
        Ok(self.users.lock().unwrap().clone())
    }
}

/// 전달 받은 이벤트를 모두 기록하는 화면
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<ViewEvent>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Toast(toast) => Some(toast),
                _ => None,
            })
            .collect()
    }

    pub fn last_toast(&self) -> Option<Toast> {
        self.toasts().pop()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Renderer for Recorder {
    fn render(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}
