//! Response DTOs handed to the chat adapter

use chrono::{DateTime, Utc};
use serde::Serialize;

use keybot_db::models::GamePlatformCountRow;

/// Per-platform key availability inside a game summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformKeyCount {
    /// Canonical platform search name (e.g. "steam")
    pub platform: String,
    pub count: i64,
    /// Soonest expiration among the counted keys, if any expire
    pub nearest_expiration: Option<DateTime<Utc>>,
}

/// One game in a paginated listing, with its platform breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub name: String,
    pub platforms: Vec<PlatformKeyCount>,
}

impl GameSummary {
    /// Group query rows into per-game summaries
    ///
    /// Rows arrive in page order with consecutive rows sharing a game id;
    /// grouping must preserve that order, so this folds sequentially
    /// rather than bucketing into a map.
    pub fn from_rows(rows: Vec<GamePlatformCountRow>) -> Vec<Self> {
        let mut summaries: Vec<Self> = Vec::new();
        let mut last_game_id = None;

        for row in rows {
            if last_game_id != Some(row.game_id) {
                last_game_id = Some(row.game_id);
                summaries.push(Self {
                    name: row.game_name.clone(),
                    platforms: Vec::new(),
                });
            }
            if let Some(summary) = summaries.last_mut() {
                summary.platforms.push(PlatformKeyCount {
                    platform: row.platform,
                    count: row.key_count,
                    nearest_expiration: row.nearest_expiration,
                });
            }
        }

        summaries
    }
}

/// Pagination header for a listing response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// 1-based page number of this response
    pub page: u32,
    /// Total pages under the current filters (at least 1)
    pub pages: u32,
    /// Total games under the current filters
    pub total: i64,
}

impl PageInfo {
    pub fn new(page: u32, per_page: u32, total: i64) -> Self {
        let pages = if total <= 0 {
            1
        } else {
            // div_ceil is only stable on the unsigned types
            let games = total.unsigned_abs();
            u32::try_from(games.div_ceil(u64::from(per_page.max(1)))).unwrap_or(u32::MAX)
        };
        Self { page, pages, total }
    }

    /// Whether the requested page is past the end of the listing
    pub fn out_of_range(&self) -> bool {
        self.page > self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(game_id: i64, name: &str, platform: &str, count: i64) -> GamePlatformCountRow {
        GamePlatformCountRow {
            game_id,
            game_name: name.to_string(),
            platform: platform.to_string(),
            key_count: count,
            nearest_expiration: None,
        }
    }

    #[test]
    fn test_grouping_preserves_row_order() {
        let rows = vec![
            row(7, "Zork", "gog", 2),
            row(7, "Zork", "steam", 1),
            row(3, "Axiom Verge", "steam", 4),
        ];

        let summaries = GameSummary::from_rows(rows);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Zork");
        assert_eq!(summaries[0].platforms.len(), 2);
        assert_eq!(summaries[1].name, "Axiom Verge");
        assert_eq!(summaries[1].platforms[0].count, 4);
    }

    #[test]
    fn test_page_math() {
        assert_eq!(PageInfo::new(1, 20, 0).pages, 1);
        assert_eq!(PageInfo::new(1, 20, 20).pages, 1);
        assert_eq!(PageInfo::new(1, 20, 21).pages, 2);
        assert!(PageInfo::new(3, 20, 21).out_of_range());
        assert!(!PageInfo::new(2, 20, 21).out_of_range());
    }
}
