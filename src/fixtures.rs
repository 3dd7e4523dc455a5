use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use log::{debug, info};
use serde::Deserialize;

use crate::error::{Result, SyncError};
use crate::utils::{ensure_success, AuthStatuses};

pub const DEFAULT_API_BASE_URL: &str = "https://api.football-data.org/v4";

const PROVIDER: &str = "football-data.org";

/// 試合情報
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub home_team: String,
    pub away_team: String,
    /// キックオフ時刻（UTC）
    pub kickoff: DateTime<Utc>,
    pub venue: Option<String>,
    pub competition: String,
}

/// 取得対象の期間 [from, to]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl FetchWindow {
    pub fn starting_at(now: DateTime<Utc>, days_ahead: u32) -> Self {
        Self {
            from: now,
            to: now + Duration::days(i64::from(days_ahead)),
        }
    }

    pub fn from_now(days_ahead: u32) -> Self {
        Self::starting_at(Utc::now(), days_ahead)
    }

    /// dateFrom パラメータ
    pub fn date_from(&self) -> NaiveDate {
        self.from.date_naive()
    }

    /// dateTo パラメータ
    pub fn date_to(&self) -> NaiveDate {
        self.to.date_naive()
    }

    /// 期間の両端の日を丸ごと含む [from日の0時, to日の翌日0時)
    pub fn whole_days(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.from_utc_datetime(&self.date_from().and_time(NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&(self.date_to() + Duration::days(1)).and_time(NaiveTime::MIN));
        (start, end)
    }
}

/// 試合データの取得元
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// window の日付範囲に入る予定試合を取得する
    async fn fetch_upcoming(&self, team_id: u32, window: FetchWindow) -> Result<Vec<Fixture>>;
}

// football-data.org のレスポンス構造体
#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<MatchDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchDto {
    utc_date: DateTime<Utc>,
    home_team: TeamDto,
    away_team: TeamDto,
    competition: CompetitionDto,
    #[serde(default)]
    venue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeamDto {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompetitionDto {
    name: String,
}

impl From<MatchDto> for Fixture {
    fn from(dto: MatchDto) -> Self {
        Fixture {
            home_team: dto.home_team.name.unwrap_or_else(|| "TBD".to_string()),
            away_team: dto.away_team.name.unwrap_or_else(|| "TBD".to_string()),
            kickoff: dto.utc_date,
            venue: dto.venue.filter(|v| !v.trim().is_empty()),
            competition: dto.competition.name,
        }
    }
}

/// football-data.org のAPIクライアント
#[derive(Debug, Clone)]
pub struct FootballDataClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl FootballDataClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SyncError::Auth("football-data.org API key is empty".to_string()));
        }

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }

    /// 指定した期間の試合を取得
    pub async fn fetch_window(&self, team_id: u32, window: &FetchWindow) -> Result<Vec<Fixture>> {
        let url = format!("{}/teams/{}/matches", self.base_url, team_id);
        let date_from = window.date_from().to_string();
        let date_to = window.date_to().to_string();

        debug!("GET {} dateFrom={} dateTo={}", url, date_from, date_to);

        let response = self
            .client
            .get(&url)
            .header("X-Auth-Token", &self.api_key)
            .query(&[
                ("dateFrom", date_from.as_str()),
                ("dateTo", date_to.as_str()),
                ("status", "SCHEDULED"),
            ])
            .send()
            .await?;

        let response =
            ensure_success(response, PROVIDER, AuthStatuses::UnauthorizedOrForbidden).await?;

        let body: MatchesResponse = response.json().await?;
        info!("Fetched {} scheduled matches for team {}", body.matches.len(), team_id);

        Ok(body.matches.into_iter().map(Fixture::from).collect())
    }
}

#[async_trait]
impl FixtureSource for FootballDataClient {
    async fn fetch_upcoming(&self, team_id: u32, window: FetchWindow) -> Result<Vec<Fixture>> {
        self.fetch_window(team_id, &window).await
    }
}
