use crate::error::LibraryError;
use crate::item::Suggestion;
use crate::provider::api::SuggestionApi;
use crate::view::{Renderer, Toast, ViewEvent};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

/// 외부 검색 결과를 서버의 개인 컬렉션에 추가한다.
///
/// 추가에 성공해도 [`crate::collection::Collection`]은 갱신 되지 않는다. 추가된 항목은 세션 동안 "추가됨"으로만 표시된다.
/// 같은 항목을 여러번 추가하는 것을 막지 않으므로 서버에 중복 도서가 생길 수 있다.
pub struct Importer<A, R>
where
    A: SuggestionApi,
    R: Renderer,
{
    api: Arc<A>,
    renderer: Arc<R>,
    added: HashSet<String>,
}

impl<A, R> Importer<A, R>
where
    A: SuggestionApi,
    R: Renderer,
{
    pub fn new(api: Arc<A>, renderer: Arc<R>) -> Self {
        Self {
            api,
            renderer,
            added: HashSet::new(),
        }
    }

    /// 성공 시 서버가 보낸 메시지를 반환한다.
    pub async fn import(&mut self, suggestion: &Suggestion) -> Result<Option<String>, LibraryError> {
        let receipt = match self.api.add_to_collection(suggestion).await {
            Ok(receipt) => receipt,
            Err(err) => return Err(self.fail(suggestion, err.into())),
        };

        if !receipt.success {
            let message = receipt.message.unwrap_or_else(|| "Failed to add book".to_owned());
            return Err(self.fail(suggestion, LibraryError::Rejected(message)));
        }

        let key = suggestion.key();
        info!("Suggestion added to collection (key: {}, title: {})", key, suggestion.title);
        self.added.insert(key.clone());
        self.renderer.render(ViewEvent::SuggestionAdded(key));
        self.renderer.render(ViewEvent::Toast(
            Toast::success("Book Added").with_message(format!("\"{}\" added to your library!", suggestion.title)),
        ));
        Ok(receipt.message)
    }

    pub fn is_added(&self, suggestion: &Suggestion) -> bool {
        self.added.contains(&suggestion.key())
    }

    fn fail(&self, suggestion: &Suggestion, err: LibraryError) -> LibraryError {
        error!("Failed to add '{}' to collection: {}", suggestion.title, err);
        self.renderer.render(ViewEvent::Toast(Toast::error(
            "Error",
            format!("Failed to add book to library: {}", err.message()),
        )));
        err
    }
}
