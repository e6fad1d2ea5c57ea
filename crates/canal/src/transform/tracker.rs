//! 추적 맵 — 상관 키별 최근 관측 시각과 TTL 리퍼
//!
//! 범위 계열 변환기가 공유하는 상태입니다. 백그라운드 리퍼가 `reap
//! interval`마다 깨어나 TTL을 넘긴 엔트리를 제거하므로, 종료 이벤트가
//! 오지 않는 스트림에서도 상태 증가가 유한하게 유지됩니다.
//!
//! 리퍼는 tokio 태스크가 아니라 일반 스레드입니다. 변환기는 동기
//! 파이프라인과 비동기 canal 양쪽에서 쓰이는데, 동기 경로에는 붙잡을
//! 런타임이 없습니다. 스레드는 채널 `recv_timeout`에 기대어 잠들고,
//! 소유 변환기가 드롭되면 즉시 깨어나 종료합니다.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

type Entries = Arc<Mutex<HashMap<String, Instant>>>;

pub(crate) struct Tracker {
    entries: Entries,
    stop: Option<mpsc::Sender<()>>,
    reaper: Option<thread::JoinHandle<()>>,
}

impl Tracker {
    /// TTL과 리핑 간격으로 추적 맵을 만들고 리퍼 스레드를 띄웁니다.
    pub(crate) fn new(ttl: Duration, reap_interval: Duration) -> Self {
        let entries: Entries = Arc::new(Mutex::new(HashMap::new()));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let shared = Arc::clone(&entries);
        let reap_interval = reap_interval.max(Duration::from_millis(1));
        let reaper = thread::Builder::new()
            .name("ceelog-reaper".to_owned())
            .spawn(move || loop {
                match stop_rx.recv_timeout(reap_interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let mut entries = lock(&shared);
                        entries.retain(|_, last_seen| last_seen.elapsed() <= ttl);
                    }
                    // 송신측 드롭 또는 명시적 신호 — 종료
                    _ => break,
                }
            })
            .ok();

        Self {
            entries,
            stop: Some(stop_tx),
            reaper,
        }
    }

    /// 맵을 잠근 채 클로저를 실행합니다.
    ///
    /// 메시지별 알고리즘 전체가 이 잠금 아래에서 수행됩니다.
    pub(crate) fn with_lock<T>(&self, f: impl FnOnce(&mut HashMap<String, Instant>) -> T) -> T {
        let mut entries = lock(&self.entries);
        f(&mut entries)
    }
}

fn lock(entries: &Mutex<HashMap<String, Instant>>) -> MutexGuard<'_, HashMap<String, Instant>> {
    // 잠금을 쥔 코드는 패닉하지 않으므로 poison은 사실상 도달 불가 —
    // 그래도 내부 값으로 복구해 진행한다
    match entries.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        // 송신측을 끊으면 리퍼의 recv가 즉시 Disconnected로 깨어난다
        self.stop.take();
        if let Some(handle) = self.reaper.take() {
            let _ = handle.join();
        }
    }
}
