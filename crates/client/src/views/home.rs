use carpool_core::SummaryCounts;

use crate::api::{Query, endpoints};
use crate::views::Context;

/// Entry page counters. `counts` is `None` when the summary could not be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeSummary {
    pub counts: Option<SummaryCounts>,
}

#[derive(Debug, Clone)]
pub struct HomeView {
    ctx: Context,
}

impl HomeView {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub async fn summary(&self) -> HomeSummary {
        let counts = match self.ctx.api.get_data(endpoints::SUMMARY, &Query::new()).await {
            Ok(value) => serde_json::from_value::<SummaryCounts>(value)
                .inspect_err(|err| tracing::error!(error = %err, "error loading summary"))
                .ok(),
            Err(_) => None,
        };
        HomeSummary { counts }
    }
}
