/// 서비스 부트스트랩 설정
/// DATABASE_URL 은 DatabaseManager 가 직접 읽는다.
// region:    --- Config

/// 환경 변수 기반 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 리스너 바인드 주소
    pub bind_addr: String,
    /// 토큰 검증용 공유 시크릿 (발급자와 합의된 값)
    pub jwt_secret: String,
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
        }
    }
}

// endregion: --- Config
