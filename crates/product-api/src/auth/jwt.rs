//! JWT 토큰 처리.
//!
//! HS256으로 서명된 Access Token의 생성/검증 로직.
//!
//! 토큰은 자기 완결적입니다. 서버는 세션 상태를 보관하지 않으며,
//! 유효성은 서명 검증과 만료 시각 비교만으로 결정됩니다. 페이로드에는
//! subject만 담기고 권한은 담기지 않습니다 — 권한은 요청마다 자격증명
//! 저장소에서 새로 조회하므로, 권한 회수는 발급된 토큰에도 즉시
//! 적용됩니다. 그 대가로 검증 시점에 저장소 조회가 한 번 필요합니다.
//!
//! 서명 키는 기동 시 한 번 설정되고 프로세스 수명 동안 불변입니다.
//! 키를 교체하면 발급된 모든 토큰이 무효화됩니다 (의도된 동작).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// JWT Access Token 페이로드.
///
/// subject와 발급/만료 시각만 서명 대상입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 이름
    pub sub: String,
    /// Issued At - 토큰 발급 시각 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시각 (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 새로운 Claims 생성.
    ///
    /// `now`는 호출자가 주입합니다. 검증 중 시계 조정으로 비교가
    /// 어긋나지 않도록, 한 연산에서 시각은 한 번만 읽습니다.
    pub fn new(subject: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: subject.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// 토큰 검증 에러.
///
/// 외부 응답에서는 모두 동일한 401로 합쳐지지만, 내부 관측
/// (로그/메트릭)을 위해 종류를 구분합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// 토큰 형식 자체가 유효하지 않음 (잘린 문자열, 임의 바이트 등)
    #[error("잘못된 토큰 형식")]
    Malformed,
    /// 서명 불일치 - 페이로드가 변조되었거나 다른 키로 서명됨
    #[error("토큰 서명이 유효하지 않습니다")]
    TamperedOrForged,
    /// 만료 시각 경과
    #[error("토큰이 만료되었습니다")]
    Expired,
}

impl TokenError {
    /// 메트릭 라벨용 종류 문자열.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::TamperedOrForged => "tampered_or_forged",
            TokenError::Expired => "expired",
        }
    }
}

/// 토큰 생성 에러.
///
/// 검증 에러와 달리 서버 측 장애입니다 (페이로드 직렬화 실패 등).
#[derive(Debug, thiserror::Error)]
#[error("토큰 인코딩 실패: {0}")]
pub struct MintError(#[from] jsonwebtoken::errors::Error);

/// 토큰 코덱.
///
/// 프로세스 전역 시크릿으로 토큰을 생성/검증합니다. 생성과 검증은
/// 불변 입력에 대한 순수 계산이므로 잠금 없이 동시 호출이 안전합니다.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// 시크릿과 TTL(분)로 코덱을 생성합니다.
    pub fn new(secret: &SecretString, ttl_minutes: i64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        // 만료는 decode가 아니라 verify에 주입된 `now`로 직접 비교한다.
        // decode는 서명 검증과 필수 클레임(exp) 존재 확인만 담당.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// 토큰 유효 기간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Access Token 생성.
    ///
    /// 페이로드는 `{sub, iat = now, exp = now + ttl}`로 고정됩니다.
    /// TTL은 설정값이며 호출마다 달라지지 않습니다.
    pub fn mint(&self, subject: &str, now: DateTime<Utc>) -> Result<String, MintError> {
        let claims = Claims::new(subject, now, self.ttl);
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// 토큰 디코딩 및 검증.
    ///
    /// 검증 순서가 중요합니다: 서명이 확인되기 전에는 페이로드의
    /// 어떤 필드도 신뢰하지 않습니다 (공격자가 만든 값으로 동작하는
    /// 것을 방지). 서명이 일치한 뒤에만 주입된 `now`로 만료를
    /// 비교합니다.
    ///
    /// 같은 토큰에 대해 몇 번을 호출해도 결과가 같습니다 (읽기 전용,
    /// 부수 효과 없음).
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        TokenError::TamperedOrForged
                    }
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed,
                }
            })?;

        if now.timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn test_codec() -> TokenCodec {
        TokenCodec::new(&SecretString::new(TEST_SECRET.into()), 60)
    }

    #[test]
    fn test_mint_and_verify_roundtrip() {
        let codec = test_codec();
        let now = Utc::now();

        let token = codec.mint("testuser", now).unwrap();
        assert!(!token.is_empty());

        let claims = codec.verify(&token, now).unwrap();
        assert_eq!(claims.sub, "testuser");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, (now + Duration::minutes(60)).timestamp());
    }

    #[test]
    fn test_verify_is_idempotent() {
        let codec = test_codec();
        let now = Utc::now();
        let token = codec.mint("testuser", now).unwrap();

        let first = codec.verify(&token, now).unwrap();
        let second = codec.verify(&token, now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_expired_token() {
        let codec = test_codec();
        let now = Utc::now();
        let token = codec.mint("testuser", now).unwrap();

        // 만료 직전은 유효
        let just_before = now + Duration::minutes(60);
        assert!(codec.verify(&token, just_before).is_ok());

        // TTL + 1초 뒤에는 Expired (Malformed/TamperedOrForged가 아님)
        let after = now + Duration::minutes(60) + Duration::seconds(1);
        assert_eq!(codec.verify(&token, after), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_forged() {
        let codec = test_codec();
        let other = TokenCodec::new(
            &SecretString::new("another-secret-key-for-testing-minimum-32ch".into()),
            60,
        );
        let now = Utc::now();

        let token = other.mint("testuser", now).unwrap();
        assert_eq!(codec.verify(&token, now), Err(TokenError::TamperedOrForged));
    }

    #[test]
    fn test_tampered_payload_is_forged() {
        let codec = test_codec();
        let now = Utc::now();
        let token = codec.mint("testuser", now).unwrap();

        // 페이로드 세그먼트의 문자 하나를 교체
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        assert_eq!(parts.len(), 3);
        let payload = parts[1].clone();
        let flipped = if payload.starts_with('A') { "B" } else { "A" };
        parts[1] = format!("{}{}", flipped, &payload[1..]);
        let tampered = parts.join(".");

        assert_eq!(
            codec.verify(&tampered, now),
            Err(TokenError::TamperedOrForged)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = test_codec();
        let now = Utc::now();

        for input in ["", "not-a-token", "a.b", "a.b.c", "....."] {
            assert_eq!(
                codec.verify(input, now),
                Err(TokenError::Malformed),
                "input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_truncated_token_never_verifies() {
        let codec = test_codec();
        let now = Utc::now();
        let token = codec.mint("testuser", now).unwrap();

        // 어디를 잘라도 성공해서는 안 됨
        for len in 0..token.len() {
            assert!(codec.verify(&token[..len], now).is_err());
        }
    }

    #[test]
    fn test_missing_exp_claim_is_malformed() {
        // exp 없는 페이로드를 직접 서명해도 검증을 통과하지 못함
        #[derive(Serialize)]
        struct NoExp {
            sub: String,
            iat: i64,
        }

        let claims = NoExp {
            sub: "testuser".to_string(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let codec = test_codec();
        assert_eq!(
            codec.verify(&token, Utc::now()),
            Err(TokenError::Malformed)
        );
    }

    proptest! {
        /// 페이로드 비트가 하나라도 바뀌면 검증은 반드시 실패한다.
        #[test]
        fn prop_any_payload_mutation_fails(index in 0usize..64, replacement in "[A-Za-z0-9_-]") {
            let codec = test_codec();
            let now = Utc::now();
            let token = codec.mint("testuser", now).unwrap();

            let parts: Vec<&str> = token.split('.').collect();
            let payload = parts[1];
            let index = index % payload.len();
            let original = &payload[index..index + 1];

            prop_assume!(original != replacement);

            let mutated_payload =
                format!("{}{}{}", &payload[..index], replacement, &payload[index + 1..]);
            let mutated = format!("{}.{}.{}", parts[0], mutated_payload, parts[2]);

            prop_assert_eq!(codec.verify(&mutated, now), Err(TokenError::TamperedOrForged));
        }

        /// 임의의 비토큰 문자열은 패닉 없이 Malformed로 실패한다.
        #[test]
        fn prop_random_strings_are_malformed(input in "[ -~]{0,120}") {
            let codec = test_codec();
            prop_assume!(input.matches('.').count() != 2);

            prop_assert_eq!(codec.verify(&input, Utc::now()), Err(TokenError::Malformed));
        }
    }
}
