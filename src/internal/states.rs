//! 响应式状态：对外发布统计快照的 watch 属性，以及引擎内部的事件队列。

pub(crate) mod queue_reactive;
pub mod reactive_core;
pub mod unlock_reactive;
