/// 소켓 이벤트 계약
/// 인바운드/아웃바운드 이벤트는 {"event": ..., "data": ...} 봉투에 담긴다.
/// 이벤트 이름은 기존 클라이언트 계약을 그대로 따른다.
// region:    --- Imports
use crate::bidding::model::{BidEvent, Item};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Events

/// 클라이언트 -> 서버 이벤트
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// 신규 사용자 알림 (로그 전용)
    #[serde(rename = "newUser:username")]
    NewUser { username: String },
    /// 입찰 제출
    #[serde(rename = "send:bid")]
    Bid(BidEvent),
    /// 채팅 패스스루 (본 엔진의 계약 밖)
    #[serde(rename = "send:message")]
    Message(serde_json::Value),
}

/// 서버 -> 클라이언트 이벤트
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// 로그인 사용자 알림
    #[serde(rename = "new:item")]
    UserLoggedIn(UserPresence),
    /// 로그아웃 사용자 알림
    #[serde(rename = "remove:item")]
    UserLoggedOut(UserPresence),
    /// 즉시 낙찰 알림 (해당 상품)
    #[serde(rename = "item:sold")]
    ItemSold(Item),
    /// 전체 상품 목록 스냅샷
    #[serde(rename = "items:update")]
    ItemsUpdate(Vec<Item>),
}

/// 접속 상태 브로드캐스트 페이로드 (식별자 서술자)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPresence {
    pub username: String,
}

// endregion: --- Events

// region:    --- Tests


// endregion: --- Tests
