/// 입찰 처리기
/// 인바운드 입찰 이벤트와 원장/브로드캐스터 사이의 프로토콜 접착부.
/// 1. 상품 조회 (없으면 로그 후 무시 - 브로드캐스트 없음)
/// 2. 원장 적용 (거절 시 브로드캐스트 없음)
/// 3. 즉시 낙찰이면 item:sold 전파 후 items:update 스냅샷 전파
/// 4. 일반 수락이면 items:update 스냅샷만 전파
// region:    --- Imports
use crate::bidding::model::BidEvent;
use crate::broadcast::Broadcaster;
use crate::ledger::{AuctionLedger, BidOutcome};
use crate::socket::events::ServerEvent;
use std::sync::Arc;
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Bid Processor

#[derive(Clone)]
pub struct BidProcessor {
    ledger: Arc<AuctionLedger>,
    broadcaster: Broadcaster,
}

impl BidProcessor {
    pub fn new(ledger: Arc<AuctionLedger>, broadcaster: Broadcaster) -> Self {
        Self {
            ledger,
            broadcaster,
        }
    }

    /// 입찰 이벤트 처리
    pub async fn process(&self, bid: BidEvent) {
        info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "BidProcessor", bid);

        // 상품이 동시적으로 제거되었을 수 있다. 클라이언트 가시 오류가 아니다.
        if self.ledger.get(&bid.item).await.is_none() {
            warn!(
                "{:<12} --> 존재하지 않는 상품 입찰 무시: {}",
                "BidProcessor", bid.item
            );
            return;
        }

        match self.ledger.apply_bid(&bid.item, bid.bid, &bid.user).await {
            Ok(BidOutcome::Accepted {
                item,
                immediate_sale,
            }) => {
                info!(
                    "{:<12} --> 입찰 수락 id: {}, 현재가: {}",
                    "BidProcessor", item.id, item.current_bid
                );
                if immediate_sale {
                    self.broadcaster.to_all(ServerEvent::ItemSold(item));
                }
                let snapshot = self.ledger.snapshot().await;
                self.broadcaster.to_all(ServerEvent::ItemsUpdate(snapshot));
            }
            Ok(BidOutcome::Rejected(reason)) => {
                // 거절은 제출자에게 통지하지 않는다
                info!(
                    "{:<12} --> 입찰 거절 id: {}, code: {}",
                    "BidProcessor", bid.item, reason
                );
            }
            Err(e) => {
                error!("{:<12} --> 입찰 처리 중 저장 오류: {}", "BidProcessor", e);
            }
        }
    }
}

// endregion: --- Bid Processor

// region:    --- Tests


// endregion: --- Tests
