use crate::admin::AdminDashboard;
use crate::collection::Collection;
use crate::config::Features;
use crate::error::LibraryError;
use crate::import::Importer;
use crate::item::UserInfo;
use crate::provider::api::{AdminApi, AuthApi, BookApi, SuggestionApi};
use crate::search::{SearchController, SearchOptions};
use crate::session::Session;
use crate::view::{Renderer, Toast, ViewEvent};
use std::sync::Arc;
use tracing::{info, warn};

/// 클라이언트 구성 요소를 묶는 최상위 객체
///
/// 설정의 [`Features`]에 따라 검색과 관리자 기능을 만들거나 만들지 않는다.
pub struct Library<A, R>
where
    A: BookApi + SuggestionApi + AuthApi + AdminApi + 'static,
    R: Renderer + 'static,
{
    features: Features,
    renderer: Arc<R>,
    session: Session<A, R>,
    collection: Collection<A, R>,
    importer: Option<Importer<A, R>>,
    search: Option<SearchController<A, R>>,
    admin: Option<AdminDashboard<A, R>>,
}

impl<A, R> Library<A, R>
where
    A: BookApi + SuggestionApi + AuthApi + AdminApi + 'static,
    R: Renderer + 'static,
{
    pub fn new(api: Arc<A>, renderer: Arc<R>, features: Features, search_options: SearchOptions) -> Self {
        let search = features.book_search
            .then(|| SearchController::new(Arc::clone(&api), Arc::clone(&renderer), search_options));
        let importer = features.book_search
            .then(|| Importer::new(Arc::clone(&api), Arc::clone(&renderer)));
        let admin = features.admin
            .then(|| AdminDashboard::new(Arc::clone(&api), Arc::clone(&renderer)));

        Self {
            features,
            session: Session::new(Arc::clone(&api), Arc::clone(&renderer)),
            collection: Collection::new(api, Arc::clone(&renderer)),
            renderer,
            importer,
            search,
            admin,
        }
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn session(&self) -> &Session<A, R> {
        &self.session
    }

    pub fn collection(&self) -> &Collection<A, R> {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut Collection<A, R> {
        &mut self.collection
    }

    pub fn search(&self) -> Result<&SearchController<A, R>, LibraryError> {
        self.search.as_ref().ok_or(LibraryError::Disabled("book_search"))
    }

    pub fn search_mut(&mut self) -> Result<&mut SearchController<A, R>, LibraryError> {
        self.search.as_mut().ok_or(LibraryError::Disabled("book_search"))
    }

    pub fn importer(&self) -> Result<&Importer<A, R>, LibraryError> {
        self.importer.as_ref().ok_or(LibraryError::Disabled("book_search"))
    }

    pub fn importer_mut(&mut self) -> Result<&mut Importer<A, R>, LibraryError> {
        self.importer.as_mut().ok_or(LibraryError::Disabled("book_search"))
    }

    /// 관리자 대시보드, 기능이 켜져 있고 관리자로 로그인 되어 있어야 한다.
    pub fn admin(&self) -> Result<&AdminDashboard<A, R>, LibraryError> {
        let dashboard = self.admin.as_ref().ok_or(LibraryError::Disabled("admin"))?;
        self.session.require_admin()?;
        Ok(dashboard)
    }

    /// 화면 시작 시 호출한다.
    ///
    /// 로그인이 필요한 설정이면 세션을 먼저 확인하고, 로그인 되어 있지 않으면 컬렉션을 로드하지 않고 [`None`]을 반환한다.
    pub async fn start(&mut self) -> Result<Option<usize>, LibraryError> {
        if self.features.auth_gated && self.session.check().await.is_none() {
            info!("Not logged in, collection is not loaded");
            return Ok(None);
        }

        self.collection.load().await.map(Some)
    }

    /// 로그인 후 컬렉션을 로드한다. 컬렉션 로드 실패는 로그인 결과에 영향을 주지 않는다.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<UserInfo, LibraryError> {
        let user = self.session.login(username, password).await?;

        if let Err(err) = self.collection.load().await {
            warn!("Logged in but collection could not be loaded: {}", err);
        }
        Ok(user)
    }

    /// 관리자 화면 로그인, 관리자가 아닌 계정이면 [`LibraryError::Forbidden`]
    pub async fn admin_login(&mut self, username: &str, password: &str) -> Result<UserInfo, LibraryError> {
        if !self.features.admin {
            return Err(LibraryError::Disabled("admin"));
        }

        let user = self.session.login(username, password).await?;
        if let Err(err) = self.session.require_admin() {
            warn!("Admin login refused for {}: {}", user.username, err);
            self.renderer.render(ViewEvent::Toast(
                Toast::warning("Access denied", "Administrator privileges are required"),
            ));
            return Err(err);
        }
        Ok(user)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), LibraryError> {
        self.session.register(username, email, password, confirm_password).await
    }

    /// 로그아웃 후 로컬 컬렉션을 비운다.
    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.collection.clear();
        if let Some(search) = &self.search {
            search.dismiss();
        }
    }
}
