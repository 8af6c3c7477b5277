pub mod filter;

use crate::error::LibraryError;
use crate::item::{Book, BookId, ItemError};
use crate::provider::api::{BookApi, SearchField};
use crate::view::{Renderer, Toast, ViewEvent};
use chrono::Datelike;
use filter::{Filter, KeywordFilter};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 도서 검색 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// 현재 컬렉션에서 제목, 저자, ISBN을 대상으로 검색 (네트워크 요청 없음)
    All,
    /// 서버의 필드별 검색 API 사용
    Field(SearchField),
}

impl FromStr for SearchMode {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(SearchMode::All),
            "title" => Ok(SearchMode::Field(SearchField::Title)),
            "author" => Ok(SearchMode::Field(SearchField::Author)),
            "isbn" => Ok(SearchMode::Field(SearchField::Isbn)),
            _ => Err(ItemError::UnknownCode(s.to_owned())),
        }
    }
}

/// 편집 중인 대상, 한번에 하나만 존재한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing(BookId),
}

/// 컬렉션 통계
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub total_books: usize,
    pub total_authors: usize,
    pub latest_year: Option<i32>,
}

impl CollectionStats {
    pub fn from_books(books: &[Book]) -> Self {
        let authors = books.iter()
            .map(|book| book.author())
            .collect::<HashSet<_>>();
        let latest_year = books.iter()
            .filter_map(|book| book.publish_date())
            .map(|date| date.year())
            .max();

        Self {
            total_books: books.len(),
            total_authors: authors.len(),
            latest_year,
        }
    }
}

/// 서버의 도서 목록을 로컬에 유지하는 동기화기
///
/// 로컬 컬렉션은 서버가 요청을 확인한 뒤에만 변경 된다. 요청이 실패하면 로컬 상태는 그대로 유지 되고
/// 실패 사실은 반환값과 화면 이벤트로 전달 된다.
///
/// 변경 작업은 `&mut self`를 받기 때문에 하나의 컬렉션에 대해 동시에 두개 이상의 변경 요청을 보낼 수 없다.
pub struct Collection<A, R>
where
    A: BookApi,
    R: Renderer,
{
    api: Arc<A>,
    renderer: Arc<R>,
    books: Vec<Book>,
    editing: Option<EditTarget>,
}

impl<A, R> Collection<A, R>
where
    A: BookApi,
    R: Renderer,
{
    pub fn new(api: Arc<A>, renderer: Arc<R>) -> Self {
        Self {
            api,
            renderer,
            books: Vec::new(),
            editing: None,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats::from_books(&self.books)
    }

    /// 서버에서 전체 도서 목록을 가져와 로컬 컬렉션을 통째로 교체한다.
    pub async fn load(&mut self) -> Result<usize, LibraryError> {
        self.renderer.render(ViewEvent::Loading(true));
        let result = self.api.get_books().await;
        self.renderer.render(ViewEvent::Loading(false));

        match result {
            Ok(books) => {
                self.books = dedup_by_id(books);
                info!("Loaded {} books", self.books.len());
                self.notify_changed(Toast::success("Books loaded successfully"));
                Ok(self.books.len())
            }
            Err(err) => {
                let err = LibraryError::from(err);
                error!("Failed to load books: {}", err);
                self.renderer.render(ViewEvent::LoadFailed(
                    "Failed to load books. Please check if the server is running.".to_owned(),
                ));
                self.renderer.render(ViewEvent::Toast(Toast::error("Failed to load books", err.message())));
                Err(err)
            }
        }
    }

    /// 새 도서를 생성한다. 제목이나 저자가 비어 있으면 요청을 보내지 않고 실패한다.
    pub async fn create(&mut self, book: Book) -> Result<Book, LibraryError> {
        self.validate(&book)?;

        let created = self.api.create_book(&book)
            .await
            .map_err(|err| self.fail("Failed to save book", err.into()))?;

        let Some(id) = created.id() else {
            return Err(self.fail("Failed to save book", LibraryError::Parse("saved book has no id".to_owned())));
        };

        match self.position(id) {
            Some(index) => {
                warn!("Server returned an id already in the collection, replacing (id: {})", id);
                self.books[index] = created.clone();
            }
            None => self.books.push(created.clone()),
        }

        info!("Book created (id: {}, title: {})", id, created.title());
        self.notify_changed(Toast::success("Book added successfully"));
        Ok(created)
    }

    /// 도서를 수정한다. `id`는 현재 컬렉션에 있어야 하며 전송 전에 서버에 다시 확인하지 않는다.
    pub async fn update(&mut self, id: BookId, book: Book) -> Result<Book, LibraryError> {
        self.validate(&book)?;

        let updated = self.api.update_book(id, &book.with_id(id))
            .await
            .map_err(|err| self.fail("Failed to save book", err.into()))?;

        match self.position(id) {
            Some(index) => self.books[index] = updated.clone(),
            None => warn!("Updated book is not in the local collection (id: {})", id),
        }

        info!("Book updated (id: {})", id);
        self.notify_changed(Toast::success("Book updated successfully"));
        Ok(updated)
    }

    /// 서버가 삭제를 확인한 경우에만 로컬에서 제거한다.
    pub async fn delete(&mut self, id: BookId) -> Result<(), LibraryError> {
        self.api.delete_book(id)
            .await
            .map_err(|err| self.fail("Failed to delete book", err.into()))?;

        self.books.retain(|book| book.id() != Some(id));

        info!("Book deleted (id: {})", id);
        self.notify_changed(Toast::success("Book deleted successfully"));
        Ok(())
    }

    /// 컬렉션을 변경하지 않는 읽기 전용 뷰
    /// 반환된 이터레이터는 복제해서 여러번 순회할 수 있다.
    pub fn filter<'a, F>(&'a self, filter: F) -> impl Iterator<Item = &'a Book> + Clone + 'a
    where
        F: Filter + Clone + 'a,
    {
        self.books.iter().filter(move |book| filter.accept(book))
    }

    /// 도서를 검색한다.
    ///
    /// [`SearchMode::All`]은 로컬 컬렉션에서 찾고, 그 외에는 서버의 필드별 검색을 사용한다.
    /// 검색어가 비어 있으면 전체 컬렉션을 반환한다.
    pub async fn search(&self, query: &str, mode: SearchMode) -> Result<Vec<Book>, LibraryError> {
        let query = query.trim();
        let found = if query.is_empty() {
            self.books.clone()
        } else {
            match mode {
                SearchMode::All => self.filter(KeywordFilter::new(query)).cloned().collect(),
                SearchMode::Field(field) => self.api.search_books(field, query)
                    .await
                    .map_err(|err| self.fail("Search failed", err.into()))?,
            }
        };

        self.renderer.render(ViewEvent::BooksFiltered(found.clone()));
        Ok(found)
    }

    pub fn editing(&self) -> Option<EditTarget> {
        self.editing
    }

    /// 편집을 시작한다. 기존 도서를 편집 할 때는 폼을 채울 도서를 반환하며,
    /// 컬렉션에 없는 아이디라면 편집 상태를 바꾸지 않고 [`None`]을 반환한다.
    pub fn begin_edit(&mut self, target: EditTarget) -> Option<Book> {
        match target {
            EditTarget::New => {
                self.editing = Some(EditTarget::New);
                None
            }
            EditTarget::Existing(id) => {
                let book = self.get(id).cloned()?;
                self.editing = Some(target);
                Some(book)
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// 편집 중인 대상에 따라 생성 또는 수정 요청을 보낸다. 성공한 경우에만 편집 상태가 해제 된다.
    pub async fn save(&mut self, form: Book) -> Result<Book, LibraryError> {
        let saved = match self.editing {
            Some(EditTarget::Existing(id)) => self.update(id, form).await?,
            _ => self.create(form).await?,
        };
        self.editing = None;
        Ok(saved)
    }

    /// 세션 종료 시 로컬 컬렉션을 비운다.
    pub fn clear(&mut self) {
        self.books.clear();
        self.editing = None;
        self.renderer.render(ViewEvent::BooksChanged(Vec::new()));
        self.renderer.render(ViewEvent::Stats(CollectionStats::default()));
    }

    fn position(&self, id: BookId) -> Option<usize> {
        self.books.iter().position(|book| book.id() == Some(id))
    }

    fn validate(&self, book: &Book) -> Result<(), LibraryError> {
        book.validate().map_err(|err| {
            let err = LibraryError::from(err);
            warn!("Book form rejected: {}", err);
            self.renderer.render(ViewEvent::Toast(Toast::error("Validation Error", err.message())));
            err
        })
    }

    fn fail(&self, title: &str, err: LibraryError) -> LibraryError {
        error!("{}: {}", title, err);
        self.renderer.render(ViewEvent::Toast(Toast::error(title, err.message())));
        err
    }

    fn notify_changed(&self, toast: Toast) {
        self.renderer.render(ViewEvent::BooksChanged(self.books.clone()));
        self.renderer.render(ViewEvent::Stats(self.stats()));
        self.renderer.render(ViewEvent::Toast(toast));
    }
}

fn dedup_by_id(books: Vec<Book>) -> Vec<Book> {
    let mut seen = HashSet::new();
    books.into_iter()
        .filter(|book| match book.id() {
            Some(id) => {
                let first = seen.insert(id);
                if !first {
                    warn!("Duplicated book id in server response, dropped (id: {})", id);
                }
                first
            }
            None => true,
        })
        .collect()
}
