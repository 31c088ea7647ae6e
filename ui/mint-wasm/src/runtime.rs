//! Browser timers and task spawning for the session and contract binding.

use gloo_timers::future::sleep;
use mint_contract::Delay;
use mint_session::Scheduler;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserRuntime;

impl Scheduler for BrowserRuntime {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        spawn_local(async move {
            sleep(delay).await;
            task();
        });
    }

    fn spawn(&self, task: Pin<Box<dyn Future<Output = ()>>>) {
        spawn_local(task);
    }
}

impl Delay for BrowserRuntime {
    fn delay(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()>>> {
        Box::pin(sleep(duration))
    }
}
