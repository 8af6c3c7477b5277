use crate::item::ItemError;
use crate::provider::api::ClientError;
use std::fmt;
use std::fmt::{Display, Formatter};

/// 클라이언트 작업(로드, 저장, 검색, 인증 등)이 실패 했을 때 호출자에게 전달 되는 에러
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// 필수 입력값 검사 실패, 네트워크 요청은 발생하지 않는다.
    Validation(String),

    /// 전송 실패 또는 2xx 이외의 응답
    Fetch { status: Option<u16>, message: String },

    /// 응답 본문을 해석할 수 없음
    Parse(String),

    /// 서버가 `success: false`로 응답함
    Rejected(String),

    /// 권한 부족
    Forbidden(String),

    /// 설정에서 비활성화된 기능
    Disabled(&'static str),
}

impl LibraryError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LibraryError::Validation(_))
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, LibraryError::Fetch { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            LibraryError::Fetch { status, .. } => *status,
            _ => None,
        }
    }

    /// 토스트 알림 본문으로 사용할 메시지
    pub fn message(&self) -> String {
        match self {
            LibraryError::Validation(message)
            | LibraryError::Fetch { message, .. }
            | LibraryError::Parse(message)
            | LibraryError::Rejected(message)
            | LibraryError::Forbidden(message) => message.clone(),
            LibraryError::Disabled(feature) => format!("{} is disabled", feature),
        }
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Validation(message) => write!(f, "Validation error, {}", message),
            LibraryError::Fetch { status: Some(status), message } => write!(f, "Fetch failed ({}), {}", status, message),
            LibraryError::Fetch { status: None, message } => write!(f, "Fetch failed, {}", message),
            LibraryError::Parse(message) => write!(f, "Unreadable response, {}", message),
            LibraryError::Rejected(message) => write!(f, "Rejected, {}", message),
            LibraryError::Forbidden(message) => write!(f, "Forbidden, {}", message),
            LibraryError::Disabled(feature) => write!(f, "Feature disabled, {}", feature),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<ClientError> for LibraryError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::InvalidBaseUrl(message) | ClientError::RequestFailed(message) => {
                LibraryError::Fetch { status: None, message }
            }
            ClientError::Status { status, message } => LibraryError::Fetch { status: Some(status), message },
            ClientError::ResponseParseFailed(message) => LibraryError::Parse(message),
        }
    }
}

impl From<ItemError> for LibraryError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::RequireArgumentMissing(_) => LibraryError::Validation("Title and Author are required".to_owned()),
            ItemError::UnknownCode(_) => LibraryError::Validation(err.to_string()),
        }
    }
}
