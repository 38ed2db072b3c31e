use std::collections::BTreeMap;

use async_graphql::{Context, Object, Result, SimpleObject};

use crate::{
    api::OrderFilter,
    dataset::{Dataset, Order},
};

#[derive(SimpleObject)]
pub(super) struct ReviewScoreCount {
    /// Review score in 1..=5.
    score: u8,
    /// The number of rows carrying that score.
    count: usize,
}

#[derive(SimpleObject)]
pub(super) struct ReviewStat {
    /// Histogram of the scores present, ascending by score. Scores that do
    /// not occur are omitted, not zero-filled; rows without a score are
    /// skipped.
    review_scores: Vec<ReviewScoreCount>,
}

pub(super) fn compute(orders: &[Order]) -> ReviewStat {
    let review_scores = orders
        .iter()
        .filter_map(|order| order.review_score)
        .fold(BTreeMap::new(), |mut acc, score| {
            *acc.entry(score).or_insert(0) += 1;
            acc
        })
        .into_iter()
        .map(|(score, count)| ReviewScoreCount { score, count })
        .collect();
    ReviewStat { review_scores }
}

#[derive(Default)]
pub(super) struct ReviewStatQuery {}

#[Object]
impl ReviewStatQuery {
    #[allow(clippy::unused_async)]
    async fn review_stat(&self, ctx: &Context<'_>, filter: OrderFilter) -> Result<ReviewStat> {
        let dataset = ctx.data::<Dataset>()?;
        Ok(compute(&filter.apply(dataset.orders())))
    }
}
