use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 상품 모델
// JSON 필드명은 기존 클라이언트 계약을 그대로 따른다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: String,
    pub description: String,
    #[serde(rename = "currentbid")]
    pub current_bid: i64,
    #[serde(rename = "buynow")]
    pub buy_now_price: i64,
    #[serde(rename = "wininguser")]
    pub winning_user: Option<String>,
    pub owner: String,
    #[serde(rename = "dateEnd")]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "remainingtime")]
    pub remaining_time: i64,
    pub sold: bool,
}

impl Item {
    /// 입찰 종료 여부 (낙찰 완료 또는 종료 시각 경과)
    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.sold || self.end_time <= now
    }
}

// 입찰 이벤트 모델
// 금액은 클라이언트가 자유 숫자 필드로 보내므로 f64 로 받고 원장에서 검증한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidEvent {
    pub item: String,
    pub bid: f64,
    pub user: String,
}
