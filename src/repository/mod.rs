/// 상품 저장소
/// 원장이 소비하는 협력자 인터페이스. 배포 환경은 Postgres 구현을,
/// 테스트와 저장소 없는 구동은 인메모리 구현을 사용한다.
// region:    --- Imports
use crate::bidding::model::Item;
use crate::database::DatabaseManager;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub mod queries;

// endregion: --- Imports

// region:    --- Item Repository Trait

/// 상품 저장소 트레이트
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, String>;
    async fn save(&self, item: &Item) -> Result<(), String>;
    async fn find_all(&self) -> Result<Vec<Item>, String>;
}

// endregion: --- Item Repository Trait

// region:    --- Postgres Item Repository

/// 상품 저장소 Postgres 구현체
pub struct PostgresItemRepository {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresItemRepository {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl ItemRepository for PostgresItemRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, String> {
        info!("{:<12} --> 상품 조회 id: {}", "Repository", id);
        let id = id.to_string();
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Item>(queries::GET_ITEM)
                        .bind(&id)
                        .fetch_optional(&mut **tx)
                        .await
                })
            })
            .await
            .map_err(|e: sqlx::Error| e.to_string())
    }

    async fn save(&self, item: &Item) -> Result<(), String> {
        info!("{:<12} --> 상품 저장 id: {}", "Repository", item.id);
        let item = item.clone();
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query(queries::UPSERT_ITEM)
                        .bind(&item.id)
                        .bind(&item.description)
                        .bind(item.current_bid)
                        .bind(item.buy_now_price)
                        .bind(&item.winning_user)
                        .bind(&item.owner)
                        .bind(item.end_time)
                        .bind(item.remaining_time)
                        .bind(item.sold)
                        .execute(&mut **tx)
                        .await
                        .map(|_| ())
                })
            })
            .await
            .map_err(|e: sqlx::Error| e.to_string())
    }

    async fn find_all(&self) -> Result<Vec<Item>, String> {
        info!("{:<12} --> 모든 상품 조회", "Repository");
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Item>(queries::GET_ALL_ITEMS)
                        .fetch_all(&mut **tx)
                        .await
                })
            })
            .await
            .map_err(|e: sqlx::Error| e.to_string())
    }
}

// endregion: --- Postgres Item Repository

// region:    --- Memory Item Repository

/// 상품 저장소 인메모리 구현체
#[derive(Default)]
pub struct MemoryItemRepository {
    items: RwLock<HashMap<String, Item>>,
}

impl MemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for MemoryItemRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, String> {
        Ok(self.items.read().get(id).cloned())
    }

    async fn save(&self, item: &Item) -> Result<(), String> {
        self.items
            .write()
            .insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Item>, String> {
        let mut items: Vec<Item> = self.items.read().values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }
}

// endregion: --- Memory Item Repository

// region:    --- Tests


// endregion: --- Tests
