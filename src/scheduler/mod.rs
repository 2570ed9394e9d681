/// 만료 스위퍼
/// 1초 주기 타이머로 원장 틱을 구동해 잔여 시간을 갱신하고,
/// 시간이 다한 상품을 낙찰 완료로 전이시킨 뒤 전체 스냅샷을 전파한다.
/// 루프가 틱 완료를 기다리므로 동시에 두 틱이 겹치지 않는다.
// region:    --- Imports
use crate::broadcast::Broadcaster;
use crate::ledger::AuctionLedger;
use crate::socket::events::ServerEvent;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

// endregion: --- Imports

// region:    --- Expiry Sweeper

/// 만료 스위퍼
pub struct ExpirySweeper {
    ledger: Arc<AuctionLedger>,
    broadcaster: Broadcaster,
}

impl ExpirySweeper {
    pub fn new(ledger: Arc<AuctionLedger>, broadcaster: Broadcaster) -> Self {
        Self { ledger, broadcaster }
    }

    /// 스위퍼 시작
    /// 태스크 수명은 반환된 핸들을 쥔 부트스트랩이 소유한다.
    pub fn start(&self) -> JoinHandle<()> {
        let ledger = Arc::clone(&self.ledger);
        let broadcaster = self.broadcaster.clone();
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let changed = ledger.tick(Utc::now()).await;
                if changed.is_empty() {
                    continue;
                }
                debug!(
                    "{:<12} --> 상품 {}건 변경, 스냅샷 전파",
                    "Sweeper",
                    changed.len()
                );
                broadcaster.to_all(ServerEvent::ItemsUpdate(ledger.snapshot().await));
            }
        })
    }
}

// endregion: --- Expiry Sweeper

// region:    --- Tests


// endregion: --- Tests
