//! 有界 Worker Pool：把阻塞调用（Agent / Tool）卸载到 spawn_blocking 线程
//!
//! Semaphore 控制全局并发槽位（默认 5），超出的提交按 FIFO 排队而不是拒绝；
//! 许可随阻塞闭包一起移动，闭包真正返回后才释放，因此超时的调用在跑完之前仍占用槽位。

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio::time::timeout;

use crate::config::PoolSection;
use crate::core::CoreError;

/// 默认槽位数
pub const DEFAULT_POOL_SIZE: usize = 5;

/// 进程级共享的阻塞调用池
#[derive(Debug)]
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    capacity: usize,
    /// 单次调用的执行期限；None 表示不限
    call_timeout: Option<Duration>,
}

impl WorkerPool {
    pub fn new(capacity: usize, call_timeout: Option<Duration>) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
            call_timeout,
        }
    }

    /// 从 [pool] 配置段创建；call_timeout_secs 为 0 时不设期限
    pub fn from_config(cfg: &PoolSection) -> Self {
        let call_timeout =
            (cfg.call_timeout_secs > 0).then(|| Duration::from_secs(cfg.call_timeout_secs));
        Self::new(cfg.size, call_timeout)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 当前正在执行（持有槽位）的阻塞调用数
    pub fn in_flight(&self) -> usize {
        self.capacity - self.slots.available_permits()
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout
    }

    /// 提交阻塞闭包并挂起等待结果，不阻塞调度线程
    ///
    /// 排队等待槽位的时间不计入期限；期限只约束闭包开始执行之后。
    pub async fn run<F, T>(&self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CoreError::PoolClosed)?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            f()
        });

        let joined = match self.call_timeout {
            Some(deadline) => match timeout(deadline, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    let millis = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
                    return Err(CoreError::Timeout(millis));
                }
            },
            None => handle.await,
        };

        joined.map_err(join_error_message)
    }

    /// 关闭池：之后的提交立即返回 PoolClosed，已在执行的调用不受影响
    pub fn close(&self) {
        self.slots.close();
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE, None)
    }
}

fn join_error_message(err: JoinError) -> CoreError {
    if err.is_cancelled() {
        return CoreError::Panicked("blocking task cancelled".to_string());
    }
    match err.try_into_panic() {
        Ok(payload) => CoreError::Panicked(panic_payload(payload.as_ref())),
        Err(err) => CoreError::Panicked(err.to_string()),
    }
}

fn panic_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
