/// 소켓 서비스
/// 실시간 계층의 조립 지점. 전역 싱글턴 없이 부트스트랩에서 명시적으로 생성해
/// 연결 핸들러와 만료 스위퍼에 주입한다.
// region:    --- Imports
use crate::auth::TokenVerifier;
use crate::bidding::processor::BidProcessor;
use crate::broadcast::Broadcaster;
use crate::ledger::AuctionLedger;
use crate::registry::ConnectionRegistry;
use crate::socket::events::{ServerEvent, UserPresence};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tracing::info;

pub mod events;
pub mod handler;

// endregion: --- Imports

// region:    --- Socket Service

pub struct SocketService {
    pub verifier: TokenVerifier,
    pub registry: Arc<ConnectionRegistry>,
    pub broadcaster: Broadcaster,
    pub processor: BidProcessor,
    pub ledger: Arc<AuctionLedger>,
}

impl SocketService {
    /// 소켓 서비스 생성
    pub fn new(verifier: TokenVerifier, ledger: Arc<AuctionLedger>) -> Arc<Self> {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        let processor = BidProcessor::new(Arc::clone(&ledger), broadcaster.clone());
        Arc::new(Self {
            verifier,
            registry,
            broadcaster,
            processor,
            ledger,
        })
    }

    /// 웹소켓 라우터
    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/ws", get(handler::ws_handler))
            .with_state(Arc::clone(self))
    }

    /// 로그인 사용자 전파 (외부 인증 계층이 호출)
    pub fn new_logged_user_broadcast(&self, user: UserPresence) {
        info!("{:<12} --> 로그인 사용자 전파: {}", "Socket", user.username);
        self.broadcaster.to_all(ServerEvent::UserLoggedIn(user));
    }

    /// 로그아웃 사용자 전파 (외부 인증 계층이 호출)
    pub fn user_logged_out_broadcast(&self, user: UserPresence) {
        info!("{:<12} --> 로그아웃 사용자 전파: {}", "Socket", user.username);
        self.broadcaster.to_all(ServerEvent::UserLoggedOut(user));
    }
}

// endregion: --- Socket Service
