//! 인증 주체 타입.
//!
//! - `Principal` - 자격증명 저장소가 보유하는 알려진 사용자
//! - `AuthenticatedIdentity` - 토큰 검증으로 파생되는 요청 단위 신원

use std::collections::BTreeSet;

/// 알려진 인증 주체.
///
/// 자격증명 저장소가 소유하며, 프로세스 수명 동안 불변입니다.
/// 비밀번호는 평문이 아니라 PHC 형식 Argon2 해시로만 보관합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// 사용자 이름 (고유, 대소문자 구분)
    pub username: String,
    /// PHC 형식 비밀번호 해시 (주체별 솔트 포함)
    pub password_hash: String,
    /// 평탄한 권한 태그 집합
    pub permissions: BTreeSet<String>,
}

impl Principal {
    /// 새 주체를 생성합니다.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        permissions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            permissions: permissions.into_iter().collect(),
        }
    }
}

/// 토큰 검증에 성공한 요청의 신원.
///
/// 정확히 하나의 진행 중인 요청에 붙어 다니며, 요청이 끝나면
/// 폐기됩니다. 전역 상태에 저장하지 않고 핸들러 인자로 명시적으로
/// 전달됩니다. 권한은 토큰에 담기지 않고 요청마다 자격증명
/// 저장소에서 새로 조회한 값입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    /// 토큰의 subject (사용자 이름)
    pub subject: String,
    /// 요청 시점에 조회한 권한 태그 집합
    pub permissions: BTreeSet<String>,
}

impl AuthenticatedIdentity {
    /// 주어진 권한 태그를 보유하는지 확인합니다.
    pub fn has_permission(&self, tag: &str) -> bool {
        self.permissions.contains(tag)
    }
}

impl From<&Principal> for AuthenticatedIdentity {
    fn from(principal: &Principal) -> Self {
        Self {
            subject: principal.username.clone(),
            permissions: principal.permissions.clone(),
        }
    }
}
