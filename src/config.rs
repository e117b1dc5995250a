use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{
    crawler::{google_finance, nse_india},
    declare::MarketSegment,
    logging,
};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub system: System,
    #[serde(default)]
    pub upstream: Upstream,
    #[serde(default)]
    pub gateway: Gateway,
}

/// 這個行程要啟動哪些服務
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Resolver,
    Gateway,
    All,
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resolver" => Ok(Role::Resolver),
            "gateway" => Ok(Role::Gateway),
            "all" => Ok(Role::All),
            other => Err(anyhow::anyhow!("Unknown role '{}'", other)),
        }
    }
}

impl Role {
    pub fn runs_resolver(&self) -> bool {
        matches!(self, Role::Resolver | Role::All)
    }

    pub fn runs_gateway(&self) -> bool {
        matches!(self, Role::Gateway | Role::All)
    }
}

const SYSTEM_ROLE: &str = "SYSTEM_ROLE";
const SYSTEM_RESOLVER_PORT: &str = "SYSTEM_RESOLVER_PORT";
const SYSTEM_GATEWAY_PORT: &str = "SYSTEM_GATEWAY_PORT";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct System {
    pub role: Role,
    pub resolver_port: u16,
    pub gateway_port: u16,
}

impl Default for System {
    fn default() -> Self {
        System {
            role: Role::All,
            resolver_port: 8000,
            gateway_port: 8001,
        }
    }
}

const UPSTREAM_QUOTE_BASE_URL: &str = "UPSTREAM_QUOTE_BASE_URL";
const UPSTREAM_SEARCH_BASE_URL: &str = "UPSTREAM_SEARCH_BASE_URL";
const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
const UPSTREAM_CONNECT_TIMEOUT_SECS: &str = "UPSTREAM_CONNECT_TIMEOUT_SECS";
const UPSTREAM_QUOTE_USER_AGENT: &str = "UPSTREAM_QUOTE_USER_AGENT";
const UPSTREAM_SEARCH_USER_AGENT: &str = "UPSTREAM_SEARCH_USER_AGENT";
const UPSTREAM_SEARCH_ACCEPT_LANGUAGE: &str = "UPSTREAM_SEARCH_ACCEPT_LANGUAGE";

/// 外部網站（報價與搜尋）
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Upstream {
    pub quote_base_url: String,
    pub search_base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// 空字串表示不送 User-Agent
    pub quote_user_agent: String,
    pub search_user_agent: String,
    pub search_accept_language: String,
}

impl Default for Upstream {
    fn default() -> Self {
        Upstream {
            quote_base_url: format!("https://{}/finance/quote/", google_finance::HOST),
            search_base_url: format!("https://{}/", nse_india::HOST),
            timeout_secs: 15,
            connect_timeout_secs: 8,
            quote_user_agent: String::new(),
            search_user_agent: "Mozilla/5.0".to_string(),
            search_accept_language: "en-US,en".to_string(),
        }
    }
}

impl Upstream {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

const GATEWAY_QUOTE_SERVICE_URL: &str = "GATEWAY_QUOTE_SERVICE_URL";
const GATEWAY_SEARCH_SERVICE_URL: &str = "GATEWAY_SEARCH_SERVICE_URL";
const GATEWAY_TIMEOUT_SECS: &str = "GATEWAY_TIMEOUT_SECS";
const GATEWAY_DEFAULT_SEGMENT: &str = "GATEWAY_DEFAULT_SEGMENT";
const GATEWAY_DEFAULT_SYMBOL: &str = "GATEWAY_DEFAULT_SYMBOL";

/// 前端閘道轉發到 resolver 的設定
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Gateway {
    pub quote_service_url: String,
    pub search_service_url: String,
    pub timeout_secs: u64,
    pub default_segment: String,
    pub default_symbol: String,
}

impl Default for Gateway {
    fn default() -> Self {
        Gateway {
            quote_service_url: "http://127.0.0.1:8000".to_string(),
            search_service_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 20,
            default_segment: MarketSegment::Index.to_string(),
            default_symbol: "NIFTY_50".to_string(),
        }
    }
}

impl Gateway {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| {
    App::get().unwrap_or_else(|why| {
        logging::error_file_async(format!("Failed to load {} because {:?}", CONFIG_PATH, why));
        App::default().override_with_env()
    })
});

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來自 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(role) = env::var(SYSTEM_ROLE) {
            match Role::from_str(&role) {
                Ok(role) => self.system.role = role,
                Err(why) => logging::error_file_async(format!("{}: {:?}", SYSTEM_ROLE, why)),
            }
        }

        override_parsed(SYSTEM_RESOLVER_PORT, &mut self.system.resolver_port);
        override_parsed(SYSTEM_GATEWAY_PORT, &mut self.system.gateway_port);

        if let Ok(url) = env::var(UPSTREAM_QUOTE_BASE_URL) {
            self.upstream.quote_base_url = url;
        }

        if let Ok(url) = env::var(UPSTREAM_SEARCH_BASE_URL) {
            self.upstream.search_base_url = url;
        }

        override_parsed(UPSTREAM_TIMEOUT_SECS, &mut self.upstream.timeout_secs);
        override_parsed(
            UPSTREAM_CONNECT_TIMEOUT_SECS,
            &mut self.upstream.connect_timeout_secs,
        );

        if let Ok(ua) = env::var(UPSTREAM_QUOTE_USER_AGENT) {
            self.upstream.quote_user_agent = ua;
        }

        if let Ok(ua) = env::var(UPSTREAM_SEARCH_USER_AGENT) {
            self.upstream.search_user_agent = ua;
        }

        if let Ok(lang) = env::var(UPSTREAM_SEARCH_ACCEPT_LANGUAGE) {
            self.upstream.search_accept_language = lang;
        }

        if let Ok(url) = env::var(GATEWAY_QUOTE_SERVICE_URL) {
            self.gateway.quote_service_url = url;
        }

        if let Ok(url) = env::var(GATEWAY_SEARCH_SERVICE_URL) {
            self.gateway.search_service_url = url;
        }

        override_parsed(GATEWAY_TIMEOUT_SECS, &mut self.gateway.timeout_secs);

        if let Ok(segment) = env::var(GATEWAY_DEFAULT_SEGMENT) {
            self.gateway.default_segment = segment;
        }

        if let Ok(symbol) = env::var(GATEWAY_DEFAULT_SYMBOL) {
            self.gateway.default_symbol = symbol;
        }

        self
    }
}

/// 數值型的 env 解析失敗時保留原值並記錄
fn override_parsed<T: FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = env::var(key) {
        match raw.trim().parse::<T>() {
            Ok(value) => *target = value,
            Err(_) => logging::error_file_async(format!("Ignore invalid {}: {}", key, raw)),
        }
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
