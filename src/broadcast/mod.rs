/// 브로드캐스터
/// 명명된 이벤트를 전체/단일/단일 제외 대상으로 전파한다. 비즈니스 로직 없음.
/// 개별 대상 전송 실패는 격리되어 나머지 전파를 중단시키지 않는다.
// region:    --- Imports
use crate::registry::{ConnectionHandle, ConnectionRegistry};
use crate::socket::events::ServerEvent;
use std::sync::Arc;
use tracing::{debug, warn};

// endregion: --- Imports

// region:    --- Broadcaster

#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 전체 연결로 전파
    pub fn to_all(&self, event: ServerEvent) {
        let handles = self.registry.all_handles();
        debug!("{:<12} --> 전체 전파 (대상 {}건)", "Broadcast", handles.len());
        for handle in handles {
            Self::deliver(&handle, event.clone());
        }
    }

    /// 단일 연결로 전송
    pub fn to_one(&self, username: &str, event: ServerEvent) {
        match self.registry.resolve_handle(username) {
            Some(handle) => Self::deliver(&handle, event),
            None => debug!("{:<12} --> 대상 연결 없음: {}", "Broadcast", username),
        }
    }

    /// 한 연결을 제외한 전체로 전파
    pub fn to_others(&self, exclude: &str, event: ServerEvent) {
        for handle in self.registry.handles_except(exclude) {
            Self::deliver(&handle, event.clone());
        }
    }

    // 대상별 best-effort 전송. 큐가 닫혔거나 가득 차면 건너뛴다.
    fn deliver(handle: &ConnectionHandle, event: ServerEvent) {
        if let Err(e) = handle.sender.try_send(event) {
            warn!("{:<12} --> 전송 실패 ({}): {}", "Broadcast", handle.id, e);
        }
    }
}

// endregion: --- Broadcaster

// region:    --- Tests


// endregion: --- Tests
