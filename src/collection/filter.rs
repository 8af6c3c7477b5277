use crate::item::Book;

/// 컬렉션 조회용 필터
pub trait Filter {
    fn accept(&self, book: &Book) -> bool;
}

impl<T> Filter for T
where
    T: Fn(&Book) -> bool,
{
    fn accept(&self, book: &Book) -> bool {
        self(book)
    }
}

/// 제목, 저자, ISBN 중 하나라도 검색어를 포함하면 통과 시키는 필터 (대소문자 구분 없음)
///
/// 검색어는 공백으로 나누어 각각 비교하며, 나눈 검색어 중 하나만 포함 되어도 통과한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    terms: Vec<String>,
}

impl KeywordFilter {
    pub fn new(query: &str) -> Self {
        let terms = query.split_whitespace()
            .map(|term| term.to_lowercase())
            .collect();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Filter for KeywordFilter {
    fn accept(&self, book: &Book) -> bool {
        let title = book.title().to_lowercase();
        let author = book.author().to_lowercase();
        let isbn = book.isbn().map(str::to_lowercase).unwrap_or_default();

        self.terms.iter().any(|term| {
            title.contains(term.as_str())
                || author.contains(term.as_str())
                || isbn.contains(term.as_str())
        })
    }
}
