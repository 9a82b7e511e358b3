//! Handler timing

use std::time::Instant;
use tfplug::context::Context;

/// Logs how long a handler ran when dropped.
pub struct ElapsedGuard {
    name: &'static str,
    log_id: String,
    started: Instant,
}

/// `let _guard = log_elapsed(&ctx, "resource.tencentcloud_mps_flow.read");`
pub fn log_elapsed(ctx: &Context, name: &'static str) -> ElapsedGuard {
    ElapsedGuard {
        name,
        log_id: ctx.log_id().to_string(),
        started: Instant::now(),
    }
}

impl Drop for ElapsedGuard {
    fn drop(&mut self) {
        tracing::debug!(
            "{} [ELAPSED] {} elapsed time: {:.3}s",
            self.log_id,
            self.name,
            self.started.elapsed().as_secs_f64()
        );
    }
}
