/// 웹소켓 연결 핸들러
/// 연결 상태 전이: Connecting -> Authenticated -> Active -> Closed.
/// 토큰 검증 실패 시 업그레이드 자체를 거부한다(401).
// region:    --- Imports
use crate::auth::extract_bearer_token;
use crate::bidding::model::BidEvent;
use crate::registry::{ConnectionHandle, ConnectionId};
use crate::socket::events::{ClientEvent, ServerEvent};
use crate::socket::SocketService;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

// endregion: --- Imports

// 연결별 송신 큐 용량
const EVENT_QUEUE_CAPACITY: usize = 256;

// region:    --- Upgrade Handler

/// 핸드셰이크 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// 웹소켓 업그레이드 핸들러
/// 토큰은 auth 페이로드 자리(Authorization 헤더)를 먼저 확인하고,
/// 구형 클라이언트를 위해 token 쿼리 파라미터로 폴백한다.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(service): State<Arc<SocketService>>,
) -> Response {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| extract_bearer_token(v).unwrap_or(v).to_string())
        .or(query.token);

    let identity = match service.verifier.verify(token.as_deref()) {
        Ok(identity) => identity,
        Err(e) => {
            warn!("{:<12} --> 핸드셰이크 인증 실패: {}", "Socket", e);
            return (StatusCode::UNAUTHORIZED, e.to_string()).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, identity.username, service))
}

// endregion: --- Upgrade Handler

// region:    --- Connection Loop

/// 인증된 연결 처리
async fn handle_socket(socket: WebSocket, username: String, service: Arc<SocketService>) {
    let conn_id = ConnectionId::generate();
    info!("{:<12} --> {} 사용자 연결됨 ({})", "Socket", username, conn_id);

    // 연결 등록 (동일 username 의 기존 연결은 대체된다)
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(EVENT_QUEUE_CAPACITY);
    service
        .registry
        .register(&username, ConnectionHandle::new(conn_id, tx));

    // 신규 연결에 현재 상품 목록 스냅샷 전송
    service
        .broadcaster
        .to_one(&username, ServerEvent::ItemsUpdate(service.ledger.snapshot().await));

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // 송신 큐를 소켓으로 비우는 전달 태스크
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("{:<12} --> 이벤트 직렬화 실패: {}", "Socket", e),
            }
        }
    });

    // 인바운드 이벤트 루프
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => handle_client_event(&text, &username, &service).await,
            Ok(Message::Close(_)) => break,
            // ping/pong 은 axum 이 응답한다
            Ok(_) => {}
            Err(e) => {
                warn!("{:<12} --> 소켓 수신 오류 ({}): {}", "Socket", conn_id, e);
                break;
            }
        }
    }

    // 진행 중이던 입찰은 정상 완료되고, 이 연결로의 전달만 중단된다
    info!("{:<12} --> {} 사용자 연결 해제 ({})", "Socket", username, conn_id);
    service.registry.unregister(conn_id);
    send_task.abort();
}

/// 인바운드 이벤트 분기
async fn handle_client_event(text: &str, username: &str, service: &Arc<SocketService>) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(ClientEvent::NewUser { username: reported }) => {
            info!(
                "{:<12} --> newUser:username 이벤트 수신: {}",
                "Socket", reported
            );
        }
        Ok(ClientEvent::Bid(bid)) => {
            // 제출자 식별자는 페이로드가 아니라 세션에서 취한다
            if bid.user != username {
                warn!(
                    "{:<12} --> 입찰 user 필드 불일치: {} (세션: {})",
                    "Socket", bid.user, username
                );
            }
            let bid = BidEvent {
                user: username.to_string(),
                ..bid
            };
            service.processor.process(bid).await;
        }
        Ok(ClientEvent::Message(chat)) => {
            // 채팅은 본 엔진의 계약 밖 - 패스스루
            info!("{:<12} --> send:message 수신: {}", "Socket", chat);
        }
        Err(e) => {
            warn!("{:<12} --> 이벤트 파싱 실패: {}", "Socket", e);
        }
    }
}

// endregion: --- Connection Loop
