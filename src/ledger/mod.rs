/// 경매 원장
/// 상품 상태의 단일 변경 지점. 모든 입찰/만료 변경은 여기서 직렬화된다.
/// 상품별 뮤텍스로 같은 상품의 동시 입찰은 순차 처리되고,
/// 다른 상품끼리는 서로 블로킹하지 않는다.
// region:    --- Imports
use crate::bidding::model::Item;
use crate::repository::ItemRepository;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

// endregion: --- Imports

// 최소 입찰 증가분
const MIN_INCREMENT: i64 = 1;

// 즉시 낙찰 후 클라이언트가 판매 완료 상태를 표시할 수 있는 유예 시간(초)
const BUY_NOW_GRACE_SECS: i64 = 5;

// region:    --- Bid Outcome

/// 입찰 거절 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidRejection {
    /// 참조된 상품 없음
    NotFound,
    /// 판매 종료(낙찰 또는 기간 만료)
    ItemClosed,
    /// 양의 정수 금액이 아님
    InvalidAmount,
    /// 현재가 + 최소 증가분 미만
    BidTooLow,
}

impl BidRejection {
    pub fn code(&self) -> &'static str {
        match self {
            BidRejection::NotFound => "NOT_FOUND",
            BidRejection::ItemClosed => "ITEM_CLOSED",
            BidRejection::InvalidAmount => "INVALID_AMOUNT",
            BidRejection::BidTooLow => "BID_TOO_LOW",
        }
    }
}

impl std::fmt::Display for BidRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// 입찰 처리 결과
#[derive(Debug, Clone)]
pub enum BidOutcome {
    /// 수락: 갱신된 상품과 즉시 낙찰 여부
    Accepted { item: Item, immediate_sale: bool },
    /// 거절: 상태 변경 없음
    Rejected(BidRejection),
}

// endregion: --- Bid Outcome

// region:    --- Auction Ledger

/// 경매 원장
pub struct AuctionLedger {
    items: DashMap<String, Arc<Mutex<Item>>>,
    repository: Arc<dyn ItemRepository>,
}

impl AuctionLedger {
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self {
            items: DashMap::new(),
            repository,
        }
    }

    /// 저장소의 전체 상품으로 원장 적재
    pub async fn load(repository: Arc<dyn ItemRepository>) -> Result<Self, String> {
        let ledger = Self::new(repository);
        let items = ledger.repository.find_all().await?;
        info!("{:<12} --> 상품 {}건 적재", "Ledger", items.len());
        for item in items {
            ledger.items.insert(item.id.clone(), Arc::new(Mutex::new(item)));
        }
        Ok(ledger)
    }

    /// 상품 등재 (외부 상품 생성 경로의 협력자 표면)
    pub fn insert(&self, item: Item) {
        self.items
            .insert(item.id.clone(), Arc::new(Mutex::new(item)));
    }

    /// 상품 조회
    pub async fn get(&self, item_id: &str) -> Option<Item> {
        let slot = self.items.get(item_id).map(|e| Arc::clone(e.value()))?;
        let item = slot.lock().await;
        Some(item.clone())
    }

    /// 전체 상품 스냅샷 (id 순 정렬)
    pub async fn snapshot(&self) -> Vec<Item> {
        let slots: Vec<Arc<Mutex<Item>>> =
            self.items.iter().map(|e| Arc::clone(e.value())).collect();
        let mut items = Vec::with_capacity(slots.len());
        for slot in slots {
            items.push(slot.lock().await.clone());
        }
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// 입찰 적용
    /// 검증 순서: 존재 -> 종료 여부 -> 금액 형식 -> 최소 증가분.
    /// 수락 시 저장소에 기록 후 메모리에 반영한다. 저장 실패면 메모리 상태는 불변이다.
    pub async fn apply_bid(
        &self,
        item_id: &str,
        amount: f64,
        bidder: &str,
    ) -> Result<BidOutcome, String> {
        let Some(slot) = self.items.get(item_id).map(|e| Arc::clone(e.value())) else {
            return Ok(BidOutcome::Rejected(BidRejection::NotFound));
        };
        let mut item = slot.lock().await;

        let now = Utc::now();
        if item.is_closed(now) {
            return Ok(BidOutcome::Rejected(BidRejection::ItemClosed));
        }

        if !amount.is_finite() || amount <= 0.0 || amount.fract() != 0.0 {
            return Ok(BidOutcome::Rejected(BidRejection::InvalidAmount));
        }
        let amount = amount as i64;

        if amount < item.current_bid + MIN_INCREMENT {
            return Ok(BidOutcome::Rejected(BidRejection::BidTooLow));
        }

        let mut updated = item.clone();
        updated.winning_user = Some(bidder.to_string());

        // 즉시구매 가격 이상이면 즉시구매 가격으로 낙찰 처리
        let immediate_sale = amount >= updated.buy_now_price;
        if immediate_sale {
            updated.current_bid = updated.buy_now_price;
            updated.remaining_time = BUY_NOW_GRACE_SECS;
            updated.end_time = now + Duration::seconds(BUY_NOW_GRACE_SECS);
        } else {
            updated.current_bid = amount;
        }

        self.repository.save(&updated).await?;
        *item = updated.clone();

        Ok(BidOutcome::Accepted {
            item: updated,
            immediate_sale,
        })
    }

    /// 잔여 시간 갱신 틱
    /// 열린 상품의 remaining_time 을 재계산하고 0 에 도달하면 sold 로 전이한다.
    /// 변경된 상품 목록을 반환한다. 저장 실패 상품은 메모리 상태를 유지하고 다음 틱에 재시도한다.
    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<Item> {
        let slots: Vec<Arc<Mutex<Item>>> =
            self.items.iter().map(|e| Arc::clone(e.value())).collect();

        let mut changed = Vec::new();
        for slot in slots {
            let mut item = slot.lock().await;
            if item.sold {
                continue;
            }

            let remaining = (item.end_time - now).num_seconds().max(0);
            if remaining == item.remaining_time && remaining > 0 {
                continue;
            }

            let mut updated = item.clone();
            updated.remaining_time = remaining;
            if remaining == 0 {
                updated.sold = true;
            }

            match self.repository.save(&updated).await {
                Ok(()) => {
                    *item = updated.clone();
                    changed.push(updated);
                }
                Err(e) => {
                    error!(
                        "{:<12} --> 상품 저장 오류 id: {}: {}",
                        "Ledger", updated.id, e
                    );
                }
            }
        }
        changed
    }
}

// endregion: --- Auction Ledger

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryItemRepository;
    use async_trait::async_trait;

    fn item(id: &str, current_bid: i64, buy_now_price: i64, secs_left: i64) -> Item {
        Item {
            id: id.to_string(),
            description: "테스트 상품".to_string(),
            current_bid,
            buy_now_price,
            winning_user: None,
            owner: "seller".to_string(),
            end_time: Utc::now() + Duration::seconds(secs_left),
            remaining_time: secs_left,
            sold: false,
        }
    }

    fn ledger_with(items: Vec<Item>) -> AuctionLedger {
        let ledger = AuctionLedger::new(Arc::new(MemoryItemRepository::new()));
        for item in items {
            ledger.insert(item);
        }
        ledger
    }

    /// 수락된 입찰은 현재가와 최고 입찰자를 갱신한다
    #[tokio::test]
    async fn test_accepted_bid_updates_state() {
        let ledger = ledger_with(vec![item("A", 250, 1000, 3600)]);

        let outcome = ledger.apply_bid("A", 260.0, "alice").await.unwrap();
        match outcome {
            BidOutcome::Accepted {
                item,
                immediate_sale,
            } => {
                assert_eq!(item.current_bid, 260);
                assert_eq!(item.winning_user.as_deref(), Some("alice"));
                assert!(!immediate_sale);
                assert!(!item.sold);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        // 원장 상태에도 반영
        let stored = ledger.get("A").await.unwrap();
        assert_eq!(stored.current_bid, 260);
    }

    /// 현재가 + 1 미만 입찰은 거절되고 상태 변경이 없다
    #[tokio::test]
    async fn test_bid_below_increment_rejected() {
        let ledger = ledger_with(vec![item("A", 250, 1000, 3600)]);

        for amount in [250.0, 249.0, 1.0] {
            let outcome = ledger.apply_bid("A", amount, "alice").await.unwrap();
            assert!(matches!(
                outcome,
                BidOutcome::Rejected(BidRejection::BidTooLow)
            ));
        }

        let stored = ledger.get("A").await.unwrap();
        assert_eq!(stored.current_bid, 250);
        assert_eq!(stored.winning_user, None);
    }

    /// 양의 정수가 아닌 금액은 거절된다
    #[tokio::test]
    async fn test_invalid_amount_rejected() {
        let ledger = ledger_with(vec![item("A", 250, 1000, 3600)]);

        for amount in [0.0, -10.0, 260.5, f64::NAN, f64::INFINITY] {
            let outcome = ledger.apply_bid("A", amount, "alice").await.unwrap();
            assert!(matches!(
                outcome,
                BidOutcome::Rejected(BidRejection::InvalidAmount)
            ));
        }
    }

    /// 존재하지 않는 상품 입찰
    #[tokio::test]
    async fn test_unknown_item_rejected() {
        let ledger = ledger_with(vec![]);

        let outcome = ledger.apply_bid("ghost", 100.0, "alice").await.unwrap();
        assert!(matches!(
            outcome,
            BidOutcome::Rejected(BidRejection::NotFound)
        ));
    }

    /// 즉시구매 가격과 같은 입찰은 유예 시간과 함께 즉시 낙찰 처리된다
    #[tokio::test]
    async fn test_buy_now_price_triggers_immediate_sale() {
        let ledger = ledger_with(vec![item("A", 250, 1000, 3600)]);

        let outcome = ledger.apply_bid("A", 1000.0, "alice").await.unwrap();
        match outcome {
            BidOutcome::Accepted {
                item,
                immediate_sale,
            } => {
                assert!(immediate_sale);
                assert_eq!(item.current_bid, 1000);
                assert_eq!(item.remaining_time, 5);
                assert_eq!(item.winning_user.as_deref(), Some("alice"));
                // 판매 완료 전이는 유예 시간 경과 후 스위퍼가 수행한다
                assert!(!item.sold);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    /// 즉시구매 가격 초과 입찰은 즉시구매 가격으로 낙찰 처리된다
    #[tokio::test]
    async fn test_bid_above_buy_now_clamps_to_buy_now() {
        let ledger = ledger_with(vec![item("A", 250, 1000, 3600)]);

        let outcome = ledger.apply_bid("A", 5000.0, "alice").await.unwrap();
        match outcome {
            BidOutcome::Accepted {
                item,
                immediate_sale,
            } => {
                assert!(immediate_sale);
                assert_eq!(item.current_bid, 1000);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    /// 종료된 상품 입찰은 거절된다
    #[tokio::test]
    async fn test_closed_item_rejected() {
        let mut sold_item = item("A", 250, 1000, 3600);
        sold_item.sold = true;
        let expired_item = item("B", 250, 1000, -10);
        let ledger = ledger_with(vec![sold_item, expired_item]);

        for id in ["A", "B"] {
            let outcome = ledger.apply_bid(id, 500.0, "alice").await.unwrap();
            assert!(matches!(
                outcome,
                BidOutcome::Rejected(BidRejection::ItemClosed)
            ));
        }
    }

    /// 틱은 잔여 시간을 재계산하고 0 도달 시 sold 로 전이한다
    #[tokio::test]
    async fn test_tick_expires_items() {
        let ledger = ledger_with(vec![item("A", 250, 1000, 60)]);
        let now = Utc::now();

        let changed = ledger.tick(now + Duration::seconds(30)).await;
        assert_eq!(changed.len(), 1);
        assert!(!changed[0].sold);
        assert!(changed[0].remaining_time <= 30);

        let changed = ledger.tick(now + Duration::seconds(61)).await;
        assert_eq!(changed.len(), 1);
        assert!(changed[0].sold);
        assert_eq!(changed[0].remaining_time, 0);

        // 만료 후 입찰은 거절
        let outcome = ledger.apply_bid("A", 500.0, "alice").await.unwrap();
        assert!(matches!(
            outcome,
            BidOutcome::Rejected(BidRejection::ItemClosed)
        ));

        // 이미 sold 인 상품은 더 이상 변경 대상이 아니다
        let changed = ledger.tick(now + Duration::seconds(120)).await;
        assert!(changed.is_empty());
    }

    /// 잔여 시간 변화가 없으면 틱은 아무것도 반환하지 않는다
    #[tokio::test]
    async fn test_tick_without_change_is_empty() {
        let ledger = ledger_with(vec![item("A", 250, 1000, 3600)]);
        let now = Utc::now();

        let first = ledger.tick(now).await;
        let second = ledger.tick(now).await;
        // 첫 틱은 초 단위 절사로 한 번 변경될 수 있고, 같은 시각의 재틱은 변경이 없다
        assert!(first.len() <= 1);
        assert!(second.is_empty());
    }

    /// 동시 입찰 직렬화: 유실 갱신 없이 최댓값이 남는다
    #[tokio::test]
    async fn test_concurrent_bids_no_lost_update() {
        let ledger = Arc::new(ledger_with(vec![item("A", 100, 1_000_000, 3600)]));

        let mut handles = vec![];
        for i in 1..=50i64 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                let amount = (100 + i * 10) as f64;
                let outcome = ledger
                    .apply_bid("A", amount, &format!("bidder-{}", i))
                    .await
                    .unwrap();
                (amount as i64, outcome)
            }));
        }

        let mut accepted_max = 0;
        let mut accepted_count = 0;
        for handle in handles {
            let (amount, outcome) = handle.await.unwrap();
            if let BidOutcome::Accepted { .. } = outcome {
                accepted_count += 1;
                accepted_max = accepted_max.max(amount);
            }
        }

        // 어떤 직렬 순서로 적용하든 최종가는 수락된 입찰의 최댓값이다
        let stored = ledger.get("A").await.unwrap();
        assert!(accepted_count >= 1);
        assert_eq!(stored.current_bid, accepted_max);
        assert_eq!(stored.current_bid, 600);
    }

    /// 저장 실패 시 메모리 상태는 불변이고 오류가 반환된다
    #[tokio::test]
    async fn test_storage_failure_leaves_state_unchanged() {
        struct FailingRepository;

        #[async_trait]
        impl crate::repository::ItemRepository for FailingRepository {
            async fn find_by_id(&self, _id: &str) -> Result<Option<Item>, String> {
                Err("storage down".to_string())
            }
            async fn save(&self, _item: &Item) -> Result<(), String> {
                Err("storage down".to_string())
            }
            async fn find_all(&self) -> Result<Vec<Item>, String> {
                Err("storage down".to_string())
            }
        }

        let ledger = AuctionLedger::new(Arc::new(FailingRepository));
        ledger.insert(item("A", 250, 1000, 3600));

        let result = ledger.apply_bid("A", 300.0, "alice").await;
        assert!(result.is_err());

        let stored = ledger.get("A").await.unwrap();
        assert_eq!(stored.current_bid, 250);
        assert_eq!(stored.winning_user, None);
    }
}

// endregion: --- Tests
