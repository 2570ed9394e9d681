/// 연결 레지스트리
/// username <-> 연결 핸들 양방향 매핑을 관리한다.
/// 동일 username 의 재접속은 last-writer-wins 로 기존 매핑을 대체한다(명시적 정책).
// region:    --- Imports
use crate::socket::events::ServerEvent;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

// endregion: --- Imports

// region:    --- Connection Handle

/// 연결 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// 새 연결 식별자 발급
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// 라이브 연결 핸들
/// sender 는 연결별 송신 큐로, 전담 전달 태스크가 소켓으로 비운다.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub sender: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self { id, sender }
    }
}

// endregion: --- Connection Handle

// region:    --- Connection Registry

/// 양방향 매핑 본체
/// 두 방향이 찢어진 상태로 관측되지 않도록 하나의 락 아래 둔다.
#[derive(Debug, Default)]
struct RegistryInner {
    handle_by_username: HashMap<String, ConnectionHandle>,
    username_by_connection: HashMap<ConnectionId, String>,
}

/// 연결 레지스트리
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 연결 등록
    /// 동일 username 의 기존 매핑은 대체되며, 낡은 역방향 엔트리도 함께 제거한다.
    pub fn register(&self, username: &str, handle: ConnectionHandle) {
        let mut inner = self.inner.write();
        if let Some(stale) = inner
            .handle_by_username
            .insert(username.to_string(), handle.clone())
        {
            inner.username_by_connection.remove(&stale.id);
        }
        inner
            .username_by_connection
            .insert(handle.id, username.to_string());
    }

    /// 연결 해제
    /// 미등록 연결이면 no-op (disconnect 가 등록과 경합할 수 있다).
    /// 대체된 구 연결의 해제가 새 매핑을 지우지 않도록 id 일치 시에만 정방향을 제거한다.
    pub fn unregister(&self, id: ConnectionId) {
        let mut inner = self.inner.write();
        let Some(username) = inner.username_by_connection.remove(&id) else {
            return;
        };
        if inner
            .handle_by_username
            .get(&username)
            .is_some_and(|h| h.id == id)
        {
            inner.handle_by_username.remove(&username);
        }
    }

    /// username 으로 현재 핸들 조회
    pub fn resolve_handle(&self, username: &str) -> Option<ConnectionHandle> {
        self.inner.read().handle_by_username.get(username).cloned()
    }

    /// 지정한 username 집합의 핸들 스냅샷
    pub fn resolve_handles(&self, usernames: &HashSet<String>) -> Vec<ConnectionHandle> {
        let inner = self.inner.read();
        usernames
            .iter()
            .filter_map(|u| inner.handle_by_username.get(u).cloned())
            .collect()
    }

    /// 전체 핸들 스냅샷
    pub fn all_handles(&self) -> Vec<ConnectionHandle> {
        self.inner.read().handle_by_username.values().cloned().collect()
    }

    /// 한 username 을 제외한 핸들 스냅샷
    pub fn handles_except(&self, exclude: &str) -> Vec<ConnectionHandle> {
        self.inner
            .read()
            .handle_by_username
            .iter()
            .filter(|(u, _)| u.as_str() != exclude)
            .map(|(_, h)| h.clone())
            .collect()
    }

    /// 연결 id 의 username 역조회
    pub fn username_of(&self, id: ConnectionId) -> Option<String> {
        self.inner.read().username_by_connection.get(&id).cloned()
    }

    /// 현재 연결 수
    pub fn connection_count(&self) -> usize {
        self.inner.read().handle_by_username.len()
    }
}

// endregion: --- Connection Registry

// region:    --- Tests


// endregion: --- Tests
