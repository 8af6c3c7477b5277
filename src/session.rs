use crate::error::LibraryError;
use crate::item::{Role, UserInfo};
use crate::provider::api::{AuthApi, AuthReply, LoginRequest, RegisterRequest};
use crate::view::{Renderer, Toast, ViewEvent};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 세션 쿠키 기반 로그인 상태
///
/// 인증 자체는 서버가 처리하며 클라이언트는 현재 사용자 정보만 보관한다.
pub struct Session<A, R>
where
    A: AuthApi,
    R: Renderer,
{
    api: Arc<A>,
    renderer: Arc<R>,
    current: Option<UserInfo>,
}

impl<A, R> Session<A, R>
where
    A: AuthApi,
    R: Renderer,
{
    pub fn new(api: Arc<A>, renderer: Arc<R>) -> Self {
        Self { api, renderer, current: None }
    }

    pub fn current(&self) -> Option<&UserInfo> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// 서버에 현재 세션을 확인한다. 어떤 실패든 로그인 되지 않은 것으로 처리한다.
    pub async fn check(&mut self) -> Option<UserInfo> {
        let user = match self.api.me().await {
            Ok(reply) if reply.success => user_from_reply(&reply, ""),
            Ok(_) => None,
            Err(err) => {
                warn!("Auth check failed: {}", err);
                None
            }
        };

        self.set_current(user.clone());
        user
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<UserInfo, LibraryError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(self.fail("Login failed", LibraryError::Validation(
                "Username and password are required".to_owned(),
            )));
        }

        let request = LoginRequest {
            username: username.trim().to_owned(),
            password: password.to_owned(),
        };
        let reply = self.api.login(&request)
            .await
            .map_err(|err| self.fail("Login failed", err.into()))?;

        if !reply.success {
            let message = reply.message.unwrap_or_else(|| "Invalid username or password".to_owned());
            return Err(self.fail("Login failed", LibraryError::Rejected(message)));
        }

        let user = user_from_reply(&reply, &request.username)
            .unwrap_or_else(|| UserInfo { username: request.username.clone(), role: Role::User });

        info!("Logged in as {} ({})", user.username, user.role);
        self.set_current(Some(user.clone()));
        self.renderer.render(ViewEvent::Toast(
            Toast::success("Login successful").with_message(format!("Welcome back, {}!", user.username)),
        ));
        Ok(user)
    }

    /// 회원 가입. 비밀번호 확인 값이 다르면 요청을 보내지 않는다.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), LibraryError> {
        if password != confirm_password {
            return Err(self.fail("Registration failed", LibraryError::Validation(
                "Passwords do not match".to_owned(),
            )));
        }
        if username.trim().is_empty() || password.is_empty() {
            return Err(self.fail("Registration failed", LibraryError::Validation(
                "Username and password are required".to_owned(),
            )));
        }

        let request = RegisterRequest {
            username: username.trim().to_owned(),
            email: email.trim().to_owned(),
            password: password.to_owned(),
        };
        let reply = self.api.register(&request)
            .await
            .map_err(|err| self.fail("Registration failed", err.into()))?;

        if !reply.success {
            let message = reply.message.unwrap_or_else(|| "Registration failed".to_owned());
            return Err(self.fail("Registration failed", LibraryError::Rejected(message)));
        }

        info!("Registered {}", request.username);
        self.renderer.render(ViewEvent::Toast(
            Toast::success("Registration successful").with_message("Please login with your new account"),
        ));
        Ok(())
    }

    /// 로그아웃. 서버 응답과 상관 없이 로컬 세션은 항상 비워진다.
    pub async fn logout(&mut self) {
        match self.api.logout().await {
            Ok(_) => {
                self.renderer.render(ViewEvent::Toast(
                    Toast::success("Logout successful").with_message("See you next time!"),
                ));
            }
            Err(err) => warn!("Logout request failed, clearing local session anyway: {}", err),
        }

        self.set_current(None);
    }

    pub fn require_admin(&self) -> Result<&UserInfo, LibraryError> {
        match &self.current {
            Some(user) if user.role.is_admin() => Ok(user),
            Some(user) => Err(LibraryError::Forbidden(format!("{} is not an administrator", user.username))),
            None => Err(LibraryError::Forbidden("Not logged in".to_owned())),
        }
    }

    fn set_current(&mut self, user: Option<UserInfo>) {
        self.current = user;
        self.renderer.render(ViewEvent::SessionChanged(self.current.clone()));
    }

    fn fail(&self, title: &str, err: LibraryError) -> LibraryError {
        error!("{}: {}", title, err);
        self.renderer.render(ViewEvent::Toast(Toast::error(title, err.message())));
        err
    }
}

fn user_from_reply(reply: &AuthReply, fallback_username: &str) -> Option<UserInfo> {
    let username = reply.username.clone()
        .filter(|name| !name.is_empty())
        .or_else(|| Some(fallback_username.to_owned()).filter(|name| !name.is_empty()))?;

    Some(UserInfo {
        username,
        role: reply.role.clone().unwrap_or(Role::User),
    })
}
