/// 토큰 검증기
/// 연결 핸드셰이크에서 제시된 bearer 토큰을 검증하고 식별자를 추출한다.
/// 토큰 발급은 외부 인증 서버의 몫이며, 본 서비스는 검증만 수행한다.
// region:    --- Imports
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// endregion: --- Imports

// region:    --- Identity

/// 연결에 결부되는 인증된 주체 (username 클레임이 최소 단위)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
}

// endregion: --- Identity

// region:    --- Auth Error

/// 핸드셰이크 단계의 인증 오류
#[derive(Debug)]
pub enum AuthError {
    /// 토큰이 제시되지 않음
    Unauthenticated,
    /// 서명 또는 클레임 검증 실패
    InvalidCredential(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Unauthenticated => write!(f, "Authentication error: No token provided"),
            AuthError::InvalidCredential(e) => write!(f, "Authentication error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

// endregion: --- Auth Error

// region:    --- Token Verifier

/// HS256 공유 시크릿 기반 토큰 검증기
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// 공유 시크릿으로 검증기 생성
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 발급자가 로그인 폼 본문을 그대로 서명하므로 exp 가 없을 수 있다.
        // exp 가 실려 있으면 만료는 검사한다.
        validation.required_spec_claims = HashSet::new();
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// 토큰 검증 및 식별자 추출
    pub fn verify(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token.ok_or(AuthError::Unauthenticated)?;
        let data = decode::<Identity>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))?;
        Ok(data.claims)
    }
}

/// Authorization 헤더 값에서 bearer 토큰 추출
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
}

// endregion: --- Token Verifier

// region:    --- Tests


// endregion: --- Tests
