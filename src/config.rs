pub mod log;

use crate::search::SearchOptions;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    base_url: String,
    /// 요청 타임아웃(초), 설정하지 않으면 reqwest 기본값을 따른다.
    timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url<S: Into<String>>(&mut self, base_url: S) {
        self.base_url = base_url.into();
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: None,
        }
    }
}

/// 화면 별로 켜고 끌 수 있는 기능
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Features {
    /// 시작 시 로그인을 확인하고, 로그인 되지 않았으면 컬렉션을 로드하지 않는다.
    pub auth_gated: bool,
    /// 추천/외부 검색과 컬렉션 추가
    pub book_search: bool,
    /// 관리자 대시보드
    pub admin: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            auth_gated: true,
            book_search: true,
            admin: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    debounce_ms: u64,
    min_query_len: usize,
    suggest_limit: usize,
    search_limit: usize,
}

impl SearchConfig {
    pub fn to_options(&self) -> SearchOptions {
        SearchOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            min_query_len: self.min_query_len.max(1),
            suggest_limit: self.suggest_limit,
            search_limit: self.search_limit,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        let options = SearchOptions::default();
        Self {
            debounce_ms: options.debounce.as_millis() as u64,
            min_query_len: options.min_query_len,
            suggest_limit: options.suggest_limit,
            search_limit: options.search_limit,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    client: ClientConfig,
    features: Features,
    search: SearchConfig,
    logger: Option<log::Config>,
}

impl AppConfig {
    pub fn client(&self) -> &ClientConfig {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut ClientConfig {
        &mut self.client
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn features_mut(&mut self) -> &mut Features {
        &mut self.features
    }

    pub fn search(&self) -> &SearchConfig {
        &self.search
    }

    pub fn logger(&self) -> Option<&log::Config> {
        self.logger.as_ref()
    }
}

/// 실행 환경에 따라 .env 파일을 로드한다.
pub fn load_dotenv() {
    let env_filename = env::var("RUN_MODE")
        .map(|env| format!(".env.{}", env))
        .unwrap_or_else(|_| ".env".into());

    dotenvy::from_filename(env_filename).ok();
}

/// `config/{RUN_MODE}.json` 위에 `LIBRARY__` 로 시작하는 환경 변수를 덮어 설정을 읽는다.
///
/// 예) `LIBRARY__CLIENT__BASE_URL=http://books.local/`
pub fn load_config() -> Result<AppConfig, config::ConfigError> {
    let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    let builder = config::Config::builder()
        .add_source(config::File::with_name(&format!("config/{}.json", env)).required(false))
        .add_source(
            config::Environment::with_prefix("LIBRARY")
                .separator("__")
                .try_parsing(true),
        );

    build_config(builder)
}

fn build_config(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, config::ConfigError> {
    builder.build()?.try_deserialize()
}
