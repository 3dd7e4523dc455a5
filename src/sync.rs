use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use console::style;
use log::{debug, info};

use crate::calendar::CalendarApi;
use crate::event::{CalendarEvent, DedupPolicy, DEFAULT_MATCH_DURATION_MINUTES};
use crate::error::Result;
use crate::fixtures::{FetchWindow, FixtureSource};
use crate::teams::Team;

pub const DEFAULT_DAYS_AHEAD: u32 = 90;

/// 同期結果の件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// 取得した試合数
    pub considered: usize,
    /// 新規作成したイベント数
    pub created: usize,
    /// 既存のためスキップした数
    pub skipped: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fixtures considered, {} events created, {} skipped as duplicates",
            self.considered, self.created, self.skipped
        )
    }
}

/// 試合データ取得とカレンダー登録をつなぐ
pub struct FixtureSync<'a> {
    fixtures: &'a dyn FixtureSource,
    calendar: &'a dyn CalendarApi,
    policy: DedupPolicy,
    match_duration: Duration,
}

impl<'a> FixtureSync<'a> {
    pub fn new(fixtures: &'a dyn FixtureSource, calendar: &'a dyn CalendarApi) -> Self {
        Self {
            fixtures,
            calendar,
            policy: DedupPolicy::default(),
            match_duration: Duration::minutes(DEFAULT_MATCH_DURATION_MINUTES),
        }
    }

    pub fn with_policy(mut self, policy: DedupPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_match_duration(mut self, match_duration: Duration) -> Self {
        self.match_duration = match_duration;
        self
    }

    /// チームの試合を取得し、未登録のものだけカレンダーに追加する
    ///
    /// どこかで失敗した時点で中断する。それまでに作成したイベントは残るが、
    /// 次回実行時の重複判定で認識される。
    pub async fn sync_team_fixtures(&self, team: &Team, days_ahead: u32) -> Result<SyncReport> {
        self.sync_team_fixtures_at(team, days_ahead, Utc::now()).await
    }

    /// 基準時刻を指定して同期する
    ///
    /// 試合の取得と既存イベントの一覧は同じ期間を使う。
    pub async fn sync_team_fixtures_at(
        &self,
        team: &Team,
        days_ahead: u32,
        now: DateTime<Utc>,
    ) -> Result<SyncReport> {
        let window = FetchWindow::starting_at(now, days_ahead);
        println!("\n🔄 Fetching fixtures for {}...", style(team.name).bold());
        info!("Syncing team {} ({}) for the next {} days", team.name, team.id, days_ahead);

        let fixtures = self.fixtures.fetch_upcoming(team.id, window).await?;
        let mut report = SyncReport {
            considered: fixtures.len(),
            ..SyncReport::default()
        };

        if fixtures.is_empty() {
            println!("No upcoming fixtures found for {}", team.name);
            return Ok(report);
        }

        println!("📅 Found {} upcoming matches", fixtures.len());

        let (start, end) = window.whole_days();
        let existing = self.calendar.list_events(start, end).await?;
        let mut seen: HashSet<_> = existing.iter().map(|e| e.dedup_key(self.policy)).collect();
        debug!("{} existing events form the dedup universe", seen.len());

        println!("{}", "=".repeat(60));
        for fixture in &fixtures {
            let event = CalendarEvent::from_fixture(fixture, self.match_duration);
            let key = event.dedup_key(self.policy);

            if seen.contains(&key) {
                println!("⏭️  Skipping (already exists): {}", event.title);
                report.skipped += 1;
                continue;
            }

            let id = self.calendar.create_event(&event).await?;
            info!("Created event {} for '{}'", id, event.title);
            println!(
                "{} {} on {}",
                style("✅ Added:").green(),
                event.title,
                event.start.format("%Y-%m-%d")
            );

            seen.insert(key);
            report.created += 1;
        }
        println!("{}", "=".repeat(60));

        Ok(report)
    }
}
