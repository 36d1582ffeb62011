//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정은 TOML 파일과 `PRODUCT__` 접두사 환경 변수에서 로드되며,
//! 모든 항목은 기본값을 가지므로 파일 없이도 기동할 수 있습니다.

use secrecy::SecretString;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// 개발용 기본 JWT 시크릿. 운영환경에서는 반드시 교체해야 합니다.
pub const DEV_JWT_SECRET: &str = "dev-secret-key-change-in-production";

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthSettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 입력 검증 정책
    pub validation: ValidationPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthSettings::default(),
            logging: LoggingConfig::default(),
            validation: ValidationPolicy::default(),
        }
    }
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `CoreError::Config`를 반환합니다.
    pub fn socket_addr(&self) -> CoreResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| CoreError::Config(format!("잘못된 소켓 주소: {}", e)))
    }
}

/// 데이터베이스 설정.
///
/// `url`이 없으면 서버는 인메모리 저장소로 기동합니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL (없으면 인메모리 모드)
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 30,
        }
    }
}

/// 인증 설정.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// JWT 서명 시크릿. 프로세스 수명 동안 불변이며,
    /// 교체 시 발급된 모든 토큰이 무효화됩니다.
    pub jwt_secret: SecretString,
    /// 토큰 유효 기간 (분)
    pub token_ttl_minutes: i64,
    /// 사용자를 데이터베이스에서 조회할지 여부.
    /// false면 `bootstrap_users` 기반 인메모리 저장소를 사용합니다.
    pub users_from_database: bool,
    /// 기동 시 등록되는 사용자 목록
    pub bootstrap_users: Vec<BootstrapUser>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(DEV_JWT_SECRET.into()),
            token_ttl_minutes: 60,
            users_from_database: false,
            bootstrap_users: vec![BootstrapUser::default()],
        }
    }
}

/// 기동 시 등록되는 사용자.
///
/// 외부 프로비저닝이 없는 배포에서 사용되는 고정 계정입니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapUser {
    /// 사용자 이름 (대소문자 구분)
    pub username: String,
    /// 평문 비밀번호 (기동 시 Argon2 해시로 변환 후 폐기)
    pub password: String,
    /// 권한 태그 목록
    pub permissions: Vec<String>,
}

impl Default for BootstrapUser {
    fn default() -> Self {
        // 테스트 계정: testuser / Test123
        Self {
            username: "testuser".to_string(),
            password: "Test123".to_string(),
            permissions: vec!["user".to_string(), "admin".to_string()],
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 입력 검증 정책.
///
/// 검증 임계값은 코드에 고정하지 않고 배포 설정으로 주입합니다.
/// 기본값은 "비어 있지만 않으면 통과"로, 기존 시스템의 동작과 같습니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// 사용자 이름 최소 길이
    pub min_username_len: usize,
    /// 비밀번호 최소 길이
    pub min_password_len: usize,
    /// 페이지당 최대 항목 수
    pub max_page_size: u32,
    /// 페이지당 기본 항목 수
    pub default_page_size: u32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_username_len: 1,
            min_password_len: 1,
            max_page_size: 100,
            default_page_size: 10,
        }
    }
}

impl ValidationPolicy {
    /// 로그인 자격증명 검증.
    pub fn check_credentials(&self, username: &str, password: &str) -> CoreResult<()> {
        if username.is_empty() || username.len() < self.min_username_len {
            return Err(CoreError::Validation(format!(
                "username은 최소 {}자 이상이어야 합니다",
                self.min_username_len
            )));
        }
        if password.is_empty() || password.len() < self.min_password_len {
            return Err(CoreError::Validation(format!(
                "password는 최소 {}자 이상이어야 합니다",
                self.min_password_len
            )));
        }
        Ok(())
    }

    /// 상품 입력 필드 검증.
    pub fn check_product(&self, name: &str, stock: i32) -> CoreResult<()> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation(
                "name은 비어 있을 수 없습니다".to_string(),
            ));
        }
        if stock < 0 {
            return Err(CoreError::Validation(
                "stock은 0 이상이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 요청된 페이지 크기를 정책 범위로 제한합니다.
    pub fn clamp_page_size(&self, requested: Option<u32>) -> u32 {
        match requested {
            Some(0) | None => self.default_page_size,
            Some(n) => n.min(self.max_page_size),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 존재하지 않으면 기본값 + 환경 변수만으로 구성합니다.
    /// 환경 변수는 `PRODUCT__` 접두사와 `__` 구분자를 사용합니다
    /// (예: `PRODUCT__SERVER__PORT=8080`).
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let mut builder = config::Config::builder();

        if path.as_ref().exists() {
            builder = builder.add_source(config::File::from(path.as_ref()));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("PRODUCT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }
}
