use crate::error::LibraryError;
use crate::item::UserAccount;
use crate::provider::api::{AdminApi, BookApi};
use crate::view::{Renderer, Toast, ViewEvent};
use chrono::{Duration, NaiveDateTime};
use std::sync::Arc;
use tracing::{error, info};

/// 최근 가입자로 보는 기간(일)
const RECENT_REGISTRATION_DAYS: i64 = 7;

/// 관리자 화면 통계
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: usize,
    pub admin_users: usize,
    pub total_books: usize,
    /// 최근 7일 이내 가입자 수
    pub recent_registrations: usize,
}

impl AdminStats {
    pub fn compute(users: &[UserAccount], total_books: usize, now: NaiveDateTime) -> Self {
        let since = now - Duration::days(RECENT_REGISTRATION_DAYS);

        Self {
            total_users: users.len(),
            admin_users: users.iter().filter(|user| user.role.is_admin()).count(),
            total_books,
            recent_registrations: users.iter()
                .filter_map(|user| user.created_at)
                .filter(|created_at| *created_at > since)
                .count(),
        }
    }
}

/// 관리자 대시보드
///
/// 권한 확인은 [`crate::session::Session::require_admin`]으로 호출 전에 해야 한다.
pub struct AdminDashboard<A, R>
where
    A: AdminApi + BookApi,
    R: Renderer,
{
    api: Arc<A>,
    renderer: Arc<R>,
}

impl<A, R> AdminDashboard<A, R>
where
    A: AdminApi + BookApi,
    R: Renderer,
{
    pub fn new(api: Arc<A>, renderer: Arc<R>) -> Self {
        Self { api, renderer }
    }

    pub async fn users(&self) -> Result<Vec<UserAccount>, LibraryError> {
        let users = self.api.get_users()
            .await
            .map_err(|err| self.fail("Failed to load users", err.into()))?;

        info!("Loaded {} users", users.len());
        self.renderer.render(ViewEvent::Users(users.clone()));
        Ok(users)
    }

    /// 사용자와 도서 목록을 모두 조회해 통계를 계산한다.
    pub async fn stats(&self, now: NaiveDateTime) -> Result<AdminStats, LibraryError> {
        let users = self.api.get_users()
            .await
            .map_err(|err| self.fail("Failed to load statistics", err.into()))?;
        let books = self.api.get_books()
            .await
            .map_err(|err| self.fail("Failed to load statistics", err.into()))?;

        let stats = AdminStats::compute(&users, books.len(), now);
        self.renderer.render(ViewEvent::AdminStats(stats.clone()));
        Ok(stats)
    }

    fn fail(&self, title: &str, err: LibraryError) -> LibraryError {
        error!("{}: {}", title, err);
        self.renderer.render(ViewEvent::Toast(Toast::error(title, err.message())));
        err
    }
}
