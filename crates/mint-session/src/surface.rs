use mint_types::{ContractStats, UserStats, WalletAddress};
use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

/// Everything the session shows to the user.
pub trait MintSurface {
    fn alert(&self, message: &str);

    /// Connected panel with the account badge and network label; connect
    /// buttons switch to their "connected" look.
    fn show_connected(&self, account: &WalletAddress, network: &str);

    /// Hide every minting/display element and reset the connect buttons.
    fn show_disconnected(&self);

    fn show_nft_display(&self);
    fn hide_nft_display(&self);

    /// Progress indicator on, mint buttons disabled.
    fn show_mint_progress(&self);
    fn hide_mint_progress(&self);

    fn show_success(&self);
    fn hide_success(&self);

    fn render_contract_stats(&self, stats: &ContractStats);
    fn render_user_stats(&self, stats: &UserStats);

    /// Full page reload after the wallet switched chains under us.
    fn reload(&self);
}

pub trait Scheduler {
    /// Run `task` once after `delay`.
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);

    /// Drive `task` to completion on the local executor.
    fn spawn(&self, task: Pin<Box<dyn Future<Output = ()>>>);
}

/// Pending timer scheduled through [`schedule_cancellable`]. Dropping the
/// handle cancels the timer if it has not fired yet.
#[derive(Debug, Default)]
pub struct TimerHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TimerHandle {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancelled.set(true);
    }
}

pub fn schedule_cancellable(
    scheduler: &dyn Scheduler,
    delay: Duration,
    task: impl FnOnce() + 'static,
) -> TimerHandle {
    let handle = TimerHandle::default();
    let cancelled = handle.cancelled.clone();
    scheduler.schedule(
        delay,
        Box::new(move || {
            if !cancelled.get() {
                task();
            }
        }),
    );
    handle
}
