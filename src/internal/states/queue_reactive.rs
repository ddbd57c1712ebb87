//! # QueueReactiveProperty：微队列
//!
//! 基于 tokio::sync::mpsc 的单向消息队列：各分片 worker 与统计任务是生产者，
//! 下载引擎是唯一消费者，按 FIFO 顺序把事件分发给钩子。
//!
//! - 无锁（`mpsc::unbounded_channel`），生产者发送不会挂起
//! - 生产者可 Clone，消费者只有一个
//! - 仅库内部使用（`pub(crate)`）

use tokio::sync::mpsc;

/// 微队列生产者端，可 Clone。
#[derive(Clone, Debug)]
pub(crate) struct QueueReactiveProperty<T: Send + 'static> {
    sender: mpsc::UnboundedSender<T>,
}

/// 微队列消费者，不可 Clone。
#[derive(Debug)]
pub(crate) struct QueueReactiveConsumer<T: Send + 'static> {
    receiver: mpsc::UnboundedReceiver<T>,
}

impl<T> QueueReactiveProperty<T>
where
    T: Send + 'static,
{
    /// 返回 (生产者, 消费者)。
    pub(crate) fn new() -> (Self, QueueReactiveConsumer<T>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, QueueReactiveConsumer { receiver })
    }

    /// 发送消息到队列；消费者已关闭时返回 `Err(T)`。
    pub(crate) fn send(&self, value: T) -> Result<(), T> {
        self.sender.send(value).map_err(|e| e.0)
    }
}

impl<T> QueueReactiveConsumer<T>
where
    T: Send + 'static,
{
    /// 异步接收下一条消息；发送端全部关闭时返回 `None`。
    pub(crate) async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// 非阻塞接收，队列为空时立即返回 `None`。
    pub(crate) fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}
