//! 인증 및 권한 부여.
//!
//! 상태 비저장(stateless) JWT 기반 인증 파이프라인을 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenCodec`]: 토큰 생성/검증 (서명 + 만료)
//! - [`UserStore`]: 자격증명 저장소 capability (인메모리 / PostgreSQL)
//! - [`AuthService`]: 로그인과 요청 인증을 조율
//! - [`AuthIdentity`]: 보호된 핸들러용 추출기
//!
//! # 흐름
//!
//! ```text
//! 로그인:  클라이언트 → AuthService::login → UserStore → TokenCodec::mint → 토큰
//! 요청:    클라이언트 → AuthIdentity 추출기 → TokenCodec::verify
//!                      → UserStore(권한 재조회) → 핸들러(AuthenticatedIdentity)
//! ```

mod jwt;
mod middleware;
mod password;
mod service;
mod store;

pub use jwt::{Claims, MintError, TokenCodec, TokenError};
pub use middleware::{AuthIdentity, AuthRejection};
pub use password::{hash_password, verify_password, HashError};
pub use service::{AuthError, AuthService};
pub use store::{InMemoryUserStore, PgUserStore, StoreError, UserStore};
