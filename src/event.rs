use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fixtures::Fixture;

/// 試合の標準的な長さ（分）
pub const DEFAULT_MATCH_DURATION_MINUTES: i64 = 120;

/// 既定のリマインダー（開始前の分数）
pub const DEFAULT_REMINDER_MINUTES: [u32; 2] = [60, 15];

/// カレンダーのリマインダー設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: String,
    pub minutes: u32,
}

impl Reminder {
    pub fn popup(minutes: u32) -> Self {
        Self {
            method: "popup".to_string(),
            minutes,
        }
    }
}

/// カレンダーイベント
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    /// プロバイダが割り当てたID（作成前は None）
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reminders: Vec<Reminder>,
}

impl CalendarEvent {
    /// 試合からイベントを作成する
    pub fn from_fixture(fixture: &Fixture, match_duration: Duration) -> Self {
        let title = format!("⚽ {} vs {}", fixture.home_team, fixture.away_team);
        let description = format!(
            "{}\n\nHome: {}\nAway: {}",
            fixture.competition, fixture.home_team, fixture.away_team
        );

        Self {
            id: None,
            title,
            description: Some(description),
            location: fixture.venue.clone(),
            start: fixture.kickoff,
            end: fixture.kickoff + match_duration,
            reminders: DEFAULT_REMINDER_MINUTES
                .iter()
                .map(|m| Reminder::popup(*m))
                .collect(),
        }
    }

    pub fn dedup_key(&self, policy: DedupPolicy) -> DedupKey {
        match policy {
            DedupPolicy::Exact => DedupKey::Exact {
                title: self.title.trim().to_string(),
                start: self.start,
            },
            DedupPolicy::Matchup => DedupKey::Matchup {
                teams: normalize_title(&self.title),
                date: self.start.date_naive(),
            },
        }
    }
}

/// 重複判定の方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// タイトルと開始時刻の完全一致
    #[default]
    Exact,
    /// 対戦カードと開催日の一致
    Matchup,
}

/// 重複判定キー
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Exact { title: String, start: DateTime<Utc> },
    Matchup { teams: String, date: NaiveDate },
}

// 英数字以外を落として小文字化（絵文字や空白の揺れを吸収）
fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture() -> Fixture {
        Fixture {
            home_team: "Borussia Dortmund".to_string(),
            away_team: "FC Bayern München".to_string(),
            kickoff: Utc.with_ymd_and_hms(2024, 11, 30, 17, 30, 0).unwrap(),
            venue: Some("Signal Iduna Park".to_string()),
            competition: "Bundesliga".to_string(),
        }
    }

    #[test]
    fn event_is_derived_from_fixture() {
        let event = CalendarEvent::from_fixture(
            &fixture(),
            Duration::minutes(DEFAULT_MATCH_DURATION_MINUTES),
        );

        assert_eq!(event.title, "⚽ Borussia Dortmund vs FC Bayern München");
        assert_eq!(
            event.description.as_deref(),
            Some("Bundesliga\n\nHome: Borussia Dortmund\nAway: FC Bayern München")
        );
        assert_eq!(event.location.as_deref(), Some("Signal Iduna Park"));
        assert_eq!(event.end - event.start, Duration::hours(2));
        assert_eq!(event.id, None);
    }

    #[test]
    fn event_carries_two_popup_reminders() {
        let event = CalendarEvent::from_fixture(&fixture(), Duration::hours(2));
        assert_eq!(event.reminders, vec![Reminder::popup(60), Reminder::popup(15)]);
    }

    #[test]
    fn exact_key_ignores_surrounding_whitespace_only() {
        let event = CalendarEvent::from_fixture(&fixture(), Duration::hours(2));
        let mut existing = event.clone();
        existing.title = format!("  {}  ", event.title);
        assert_eq!(
            event.dedup_key(DedupPolicy::Exact),
            existing.dedup_key(DedupPolicy::Exact)
        );

        existing.start = event.start + Duration::minutes(30);
        assert_ne!(
            event.dedup_key(DedupPolicy::Exact),
            existing.dedup_key(DedupPolicy::Exact)
        );
    }

    #[test]
    fn matchup_key_tolerates_title_drift_and_same_day_reschedule() {
        let event = CalendarEvent::from_fixture(&fixture(), Duration::hours(2));
        let mut existing = event.clone();
        existing.title = "Borussia Dortmund vs FC Bayern München".to_string();
        existing.start = event.start - Duration::hours(3);

        assert_eq!(
            event.dedup_key(DedupPolicy::Matchup),
            existing.dedup_key(DedupPolicy::Matchup)
        );
        assert_ne!(
            event.dedup_key(DedupPolicy::Exact),
            existing.dedup_key(DedupPolicy::Exact)
        );
    }

    #[test]
    fn dedup_policy_parses_from_lowercase() {
        let policy: DedupPolicy = serde_json::from_str("\"matchup\"").unwrap();
        assert_eq!(policy, DedupPolicy::Matchup);
        assert_eq!(DedupPolicy::default(), DedupPolicy::Exact);
    }
}
