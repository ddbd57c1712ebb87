use crate::internal::downloader::traits::download::{DownloadHook, HookAbort};

use super::download_event::DownloadEvent;
use super::download_result::DownloadResult;
use super::resource_meta::ResourceMeta;

/// 钩子容器：按注册顺序依次执行多个钩子。
#[derive(Default)]
pub struct DownloadHooksContainer {
    hooks: Vec<Box<dyn DownloadHook>>,
}

impl DownloadHooksContainer {
    /// 添加一个下载钩子；支持多次调用以注册多个钩子。
    pub fn add(&mut self, hook: impl DownloadHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub async fn run_before_start(&mut self, meta: &ResourceMeta) -> Result<(), HookAbort> {
        for h in self.hooks.iter_mut() {
            h.before_start(meta).await?;
        }
        Ok(())
    }

    /// 分发一条事件：统计快照走 `on_progress`，其余走 `on_event`。
    pub fn dispatch(&mut self, event: &DownloadEvent) {
        for h in self.hooks.iter_mut() {
            match event {
                DownloadEvent::Progress(snapshot) => h.on_progress(snapshot),
                other => h.on_event(other),
            }
        }
    }

    pub async fn run_after_complete(&mut self, result: &DownloadResult) {
        for h in self.hooks.iter_mut() {
            h.after_complete(result).await;
        }
    }
}
