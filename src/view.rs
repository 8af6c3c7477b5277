use crate::admin::AdminStats;
use crate::collection::CollectionStats;
use crate::item::{Book, Suggestion, UserAccount, UserInfo};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
}

impl Toast {
    pub fn success<S: Into<String>>(title: S) -> Self {
        Self { kind: ToastKind::Success, title: title.into(), message: None }
    }

    pub fn error<S: Into<String>, M: Into<String>>(title: S, message: M) -> Self {
        Self { kind: ToastKind::Error, title: title.into(), message: Some(message.into()) }
    }

    pub fn warning<S: Into<String>, M: Into<String>>(title: S, message: M) -> Self {
        Self { kind: ToastKind::Warning, title: title.into(), message: Some(message.into()) }
    }

    pub fn with_message<M: Into<String>>(mut self, message: M) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// 화면 계층에 전달 되는 이벤트
///
/// 클라이언트는 DOM이나 HTML을 직접 다루지 않고, 변경된 데이터만 이 이벤트로 알린다.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Loading(bool),
    /// 전체 컬렉션이 바뀜
    BooksChanged(Vec<Book>),
    /// 검색/필터 결과, 컬렉션 자체는 바뀌지 않음
    BooksFiltered(Vec<Book>),
    Stats(CollectionStats),
    /// 로드 실패, 화면은 재시도 버튼을 보여준다.
    LoadFailed(String),
    SuggestionsShown(Vec<Suggestion>),
    SuggestionsHidden,
    SearchResults(Vec<Suggestion>),
    SearchFailed(String),
    /// 추천 결과를 컬렉션에 추가함, [`Suggestion::key`]
    SuggestionAdded(String),
    SessionChanged(Option<UserInfo>),
    Users(Vec<UserAccount>),
    AdminStats(AdminStats),
    Toast(Toast),
}

pub trait Renderer: Send + Sync {
    fn render(&self, event: ViewEvent);
}

impl Renderer for UnboundedSender<ViewEvent> {
    fn render(&self, event: ViewEvent) {
        // 수신측이 닫혀 있으면 화면이 없는 것이므로 버린다.
        let _ = self.send(event);
    }
}

impl<R: Renderer + ?Sized> Renderer for Arc<R> {
    fn render(&self, event: ViewEvent) {
        (**self).render(event)
    }
}

/// 아무것도 그리지 않는 화면
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Renderer for Headless {
    fn render(&self, _event: ViewEvent) {}
}
