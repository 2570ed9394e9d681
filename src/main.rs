// region:    --- Imports
use crate::auth::TokenVerifier;
use crate::broadcast::Broadcaster;
use crate::config::Config;
use crate::database::DatabaseManager;
use crate::ledger::AuctionLedger;
use crate::repository::PostgresItemRepository;
use crate::scheduler::ExpirySweeper;
use crate::socket::SocketService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod auth;
mod bidding;
mod broadcast;
mod config;
mod database;
mod ledger;
mod registry;
mod repository;
mod scheduler;
mod socket;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let config = Config::from_env();

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new().await);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 상품 저장소 및 원장 적재
    let repository = Arc::new(PostgresItemRepository::new(Arc::clone(&db_manager)));
    let ledger = Arc::new(AuctionLedger::load(repository).await?);
    info!("{:<12} --> 원장 적재 성공", "Main");

    // 소켓 서비스 조립 (검증기/레지스트리/브로드캐스터/입찰 처리기)
    let verifier = TokenVerifier::new(&config.jwt_secret);
    let service = SocketService::new(verifier, Arc::clone(&ledger));

    // 만료 스위퍼 시작
    let sweeper = ExpirySweeper::new(
        Arc::clone(&ledger),
        Broadcaster::new(Arc::clone(&service.registry)),
    );
    let _sweeper_handle = sweeper.start();
    info!("{:<12} --> 만료 스위퍼 시작", "Main");

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = service.router().layer(cors);

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
