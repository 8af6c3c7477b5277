use crate::error::LibraryError;
use crate::item::Suggestion;
use crate::provider::api::{ClientError, SuggestionApi};
use crate::view::{Renderer, ViewEvent};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 요청 종류
/// 추천(`suggest`)은 가벼운 요청으로 적은 수의 결과를, 검색(`search`)은 전체 결과를 받는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Suggest,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    /// 대기 중인 검색어 없음
    Idle,
    /// 입력을 받았고 디바운스 타이머가 동작 중
    Debouncing { query: String },
    /// 요청 전송 후 응답 대기 중
    AwaitingResponse { query: String, mode: RequestMode },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// 마지막 입력 이후 추천 요청을 보내기 까지 기다리는 시간
    pub debounce: Duration,
    /// 요청을 보내기 위한 최소 검색어 길이(문자 수)
    pub min_query_len: usize,
    pub suggest_limit: usize,
    pub search_limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_len: 3,
            suggest_limit: 5,
            search_limit: 12,
        }
    }
}

/// 검색창 입력을 받아 추천/검색 요청을 관리하는 컨트롤러
///
/// 키 입력마다 [`SearchController::input`]을 호출하면 디바운스 시간 동안 추가 입력이 없을 때 한번만 추천 요청을 보낸다.
/// 새 입력이 들어오면 이전 타이머는 취소 되지만, 이미 전송된 요청은 취소 되지 않으며 늦게 도착한 응답도 화면에 반영 된다.
///
/// 타이머는 tokio 태스크로 동작 하므로 tokio 런타임 안에서 사용해야 한다.
pub struct SearchController<A, R>
where
    A: SuggestionApi + 'static,
    R: Renderer + 'static,
{
    api: Arc<A>,
    renderer: Arc<R>,
    options: SearchOptions,
    shared: Arc<Shared>,
    timer: Option<JoinHandle<()>>,
}

/// 타이머 태스크와 공유하는 상태
#[derive(Debug)]
struct Shared {
    state: Mutex<SearchState>,
    suggestions: Mutex<Vec<Suggestion>>,
    results: Mutex<Vec<Suggestion>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(SearchState::Idle),
            suggestions: Mutex::new(Vec::new()),
            results: Mutex::new(Vec::new()),
        }
    }

    fn set_state(&self, state: SearchState) {
        *lock(&self.state) = state;
    }

    /// 현재 상태가 `expected`일 때만 `next`로 바꾼다.
    fn transition(&self, expected: &SearchState, next: SearchState) -> bool {
        let mut state = lock(&self.state);
        if *state == *expected {
            *state = next;
            true
        } else {
            false
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<A, R> SearchController<A, R>
where
    A: SuggestionApi + 'static,
    R: Renderer + 'static,
{
    pub fn new(api: Arc<A>, renderer: Arc<R>, options: SearchOptions) -> Self {
        Self {
            api,
            renderer,
            options,
            shared: Arc::new(Shared::new()),
            timer: None,
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn state(&self) -> SearchState {
        lock(&self.shared.state).clone()
    }

    /// 현재 화면에 보이는 추천 목록
    pub fn suggestions(&self) -> Vec<Suggestion> {
        lock(&self.shared.suggestions).clone()
    }

    /// 마지막 검색 결과
    pub fn results(&self) -> Vec<Suggestion> {
        lock(&self.shared.results).clone()
    }

    /// 검색창 입력
    ///
    /// 이전 타이머를 취소하고, 검색어가 최소 길이 이상이면 새 타이머를 시작한다.
    /// 최소 길이보다 짧으면 추천 목록을 숨기고 요청은 보내지 않는다.
    pub fn input(&mut self, raw: &str) {
        let query = raw.trim().to_owned();
        self.cancel_timer();

        if !self.is_long_enough(&query) {
            self.shared.set_state(SearchState::Idle);
            hide_suggestions(&self.shared, self.renderer.as_ref());
            return;
        }

        let debouncing = SearchState::Debouncing { query: query.clone() };
        self.shared.set_state(debouncing.clone());

        let api = Arc::clone(&self.api);
        let renderer = Arc::clone(&self.renderer);
        let shared = Arc::clone(&self.shared);
        let delay = self.options.debounce;
        let limit = self.options.suggest_limit;

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let awaiting = SearchState::AwaitingResponse { query: query.clone(), mode: RequestMode::Suggest };
            if !shared.transition(&debouncing, awaiting.clone()) {
                return;
            }

            // 요청은 타이머와 분리된 태스크에서 실행 되므로 이후 입력으로 타이머가 취소 되어도 중단 되지 않는다.
            tokio::spawn(async move {
                debug!("Requesting suggestions for '{}'", query);
                let result = api.suggest(&query, limit).await;
                apply_suggestions(&shared, renderer.as_ref(), &query, result);
                shared.transition(&awaiting, SearchState::Idle);
            });
        }));
    }

    /// 엔터 입력, 디바운스 없이 바로 전체 검색을 요청한다.
    pub async fn submit(&mut self, raw: &str) -> Result<Vec<Suggestion>, LibraryError> {
        let query = raw.trim().to_owned();
        if !self.is_long_enough(&query) {
            return Err(LibraryError::Validation(format!(
                "Query must be at least {} characters long",
                self.options.min_query_len
            )));
        }

        self.cancel_timer();
        hide_suggestions(&self.shared, self.renderer.as_ref());

        let awaiting = SearchState::AwaitingResponse { query: query.clone(), mode: RequestMode::Search };
        self.shared.set_state(awaiting.clone());

        debug!("Searching books for '{}'", query);
        let result = self.api.search(&query, self.options.search_limit).await;
        self.shared.transition(&awaiting, SearchState::Idle);

        match result {
            Ok(books) => {
                info!("Search '{}' returned {} books", query, books.len());
                *lock(&self.shared.results) = books.clone();
                self.renderer.render(ViewEvent::SearchResults(books.clone()));
                Ok(books)
            }
            Err(err) => {
                error!("Search '{}' failed: {}", query, err);
                lock(&self.shared.results).clear();
                self.renderer.render(ViewEvent::SearchFailed("Search failed. Please try again.".to_owned()));
                Err(err.into())
            }
        }
    }

    /// 추천 항목 선택, 네트워크 요청 없이 선택한 항목 하나만 결과로 보여준다.
    pub fn select(&mut self, suggestion: Suggestion) {
        hide_suggestions(&self.shared, self.renderer.as_ref());
        *lock(&self.shared.results) = vec![suggestion.clone()];
        self.renderer.render(ViewEvent::SearchResults(vec![suggestion]));
    }

    /// 검색 영역 밖을 클릭함, 진행 중인 요청에는 영향을 주지 않는다.
    pub fn dismiss(&self) {
        hide_suggestions(&self.shared, self.renderer.as_ref());
    }

    fn is_long_enough(&self, query: &str) -> bool {
        !query.is_empty() && query.chars().count() >= self.options.min_query_len
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<A, R> Drop for SearchController<A, R>
where
    A: SuggestionApi + 'static,
    R: Renderer + 'static,
{
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn hide_suggestions<R: Renderer + ?Sized>(shared: &Shared, renderer: &R) {
    lock(&shared.suggestions).clear();
    renderer.render(ViewEvent::SuggestionsHidden);
}

fn apply_suggestions<R: Renderer + ?Sized>(
    shared: &Shared,
    renderer: &R,
    query: &str,
    result: Result<Vec<Suggestion>, ClientError>,
) {
    match result {
        Ok(suggestions) if suggestions.is_empty() => hide_suggestions(shared, renderer),
        Ok(suggestions) => {
            *lock(&shared.suggestions) = suggestions.clone();
            renderer.render(ViewEvent::SuggestionsShown(suggestions));
        }
        Err(err) => {
            warn!("Suggestions for '{}' failed: {}", query, err);
            hide_suggestions(shared, renderer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Headless;

    #[test]
    fn defaults_match_the_search_panel() {
        let options = SearchOptions::default();
        assert_eq!(options.debounce, Duration::from_millis(300));
        assert_eq!(options.min_query_len, 3);
        assert_eq!(options.suggest_limit, 5);
        assert_eq!(options.search_limit, 12);
    }

    #[test]
    fn transition_only_from_expected_state() {
        let shared = Shared::new();
        let debouncing = SearchState::Debouncing { query: "abc".into() };
        assert!(!shared.transition(&debouncing, SearchState::Idle));

        shared.set_state(debouncing.clone());
        let awaiting = SearchState::AwaitingResponse { query: "abc".into(), mode: RequestMode::Suggest };
        assert!(shared.transition(&debouncing, awaiting.clone()));
        assert_eq!(*lock(&shared.state), awaiting);
    }

    #[test]
    fn failed_suggestions_are_hidden() {
        let shared = Shared::new();
        *lock(&shared.suggestions) = vec![Suggestion::new("Dune")];

        apply_suggestions(&shared, &Headless, "dun", Err(ClientError::RequestFailed("down".into())));
        assert!(lock(&shared.suggestions).is_empty());
    }
}
