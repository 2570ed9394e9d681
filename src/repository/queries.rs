/// 상품 조회
pub const GET_ITEM: &str =
    "SELECT id, description, current_bid, buy_now_price, winning_user, owner, end_time, remaining_time, sold FROM items WHERE id = $1";

/// 모든 상품 조회
pub const GET_ALL_ITEMS: &str =
    "SELECT id, description, current_bid, buy_now_price, winning_user, owner, end_time, remaining_time, sold FROM items ORDER BY end_time";

/// 상품 저장 (신규 또는 갱신)
pub const UPSERT_ITEM: &str = r#"
    INSERT INTO items (id, description, current_bid, buy_now_price, winning_user, owner, end_time, remaining_time, sold)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (id) DO UPDATE SET
        description = EXCLUDED.description,
        current_bid = EXCLUDED.current_bid,
        winning_user = EXCLUDED.winning_user,
        end_time = EXCLUDED.end_time,
        remaining_time = EXCLUDED.remaining_time,
        sold = EXCLUDED.sold
"#;
