//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증. 해시는 주체별 솔트가 포함된
//! PHC 문자열로 보관되며, 평문 비밀번호는 검증 직후 폐기됩니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 비밀번호 해싱 에러.
#[derive(Debug, thiserror::Error)]
#[error("비밀번호 해싱 실패")]
pub struct HashError;

/// 비밀번호 해싱.
///
/// 솔트는 호출마다 새로 생성되므로 같은 비밀번호라도 해시가 다릅니다.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| HashError)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 저장된 PHC 해시와 입력 비밀번호를 비교합니다. 해시 형식이 깨진
/// 경우도 불일치로 취급합니다 — 호출자 입장에서 "일치하지 않음"은
/// 에러가 아니라 정상적인 결과이기 때문입니다.
pub fn verify_password(password: &str, phc_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc_hash) else {
        tracing::warn!("저장된 비밀번호 해시 형식이 유효하지 않습니다");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Test123").unwrap();

        // PHC 형식 확인 (argon2id)
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password("Test123", &hash));
        assert!(!verify_password("Test124", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn test_same_password_different_salts() {
        let hash1 = hash_password("Test123").unwrap();
        let hash2 = hash_password("Test123").unwrap();

        // 솔트가 다르므로 해시도 다름
        assert_ne!(hash1, hash2);

        // 하지만 둘 다 검증 가능
        assert!(verify_password("Test123", &hash1));
        assert!(verify_password("Test123", &hash2));
    }

    #[test]
    fn test_invalid_hash_format_is_mismatch() {
        assert!(!verify_password("Test123", "not-a-valid-phc-hash"));
        assert!(!verify_password("Test123", ""));
    }

    #[test]
    fn test_unicode_password() {
        let hash = hash_password("한글비밀번호123").unwrap();
        assert!(verify_password("한글비밀번호123", &hash));
        assert!(!verify_password("한글비밀번호124", &hash));
    }
}
