use chrono::{Duration, Utc};

use crate::adapters::postgres::{BookHistoryRepository, RankedBook};
use crate::application::errors::Result;

/// 貸出ランキングサービス
///
/// 直近の貸出回数が多い書誌を返す。おすすめ表示に使われる。
pub struct RankingService {
    histories: BookHistoryRepository,
}

impl RankingService {
    pub fn new(histories: BookHistoryRepository) -> Self {
        Self { histories }
    }

    pub async fn top_books(&self, days: i64, limit: i64) -> Result<Vec<RankedBook>> {
        let since = Utc::now() - Duration::days(days);
        Ok(self.histories.ranking(since, limit).await?)
    }
}
