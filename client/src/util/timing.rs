//! Timer helpers for countdowns and delayed redirects.
//!
//! Browser-only: on native builds `sleep` returns at once and tickers never
//! start, so nothing loops without a real clock.

use std::time::Duration;

use portal::util::liveness::Liveness;

pub async fn sleep(duration: Duration) {
    #[cfg(feature = "csr")]
    {
        gloo_timers::future::sleep(duration).await;
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = duration;
    }
}

/// Call `on_tick` once per second until `liveness` dies or `on_tick` returns
/// `false`. The owning view kills `liveness` in `on_cleanup`.
pub fn spawn_ticker<F>(liveness: Liveness, on_tick: F)
where
    F: Fn() -> bool + 'static,
{
    #[cfg(feature = "csr")]
    {
        leptos::task::spawn_local(async move {
            loop {
                sleep(Duration::from_secs(1)).await;
                if !liveness.is_alive() || !on_tick() {
                    break;
                }
            }
        });
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (liveness, on_tick);
    }
}
