use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::config::AppConfig;
use crate::error::{Result, SyncError};
use crate::event::{CalendarEvent, Reminder};
use crate::utils::{ensure_success, format_datetime, AuthStatuses};

pub const DEFAULT_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

const PROVIDER: &str = "Google Calendar";
const PAGE_SIZE: &str = "250";

/// カレンダー操作
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// 開始時刻が [start, end) にあるイベント一覧
    async fn list_events(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<CalendarEvent>>;

    /// イベントを作成し、割り当てられたIDを返す
    async fn create_event(&self, event: &CalendarEvent) -> Result<String>;
}

// Google Calendar APIのリクエスト/レスポンス構造体
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: Option<DateTime<FixedOffset>>,
    date: Option<NaiveDate>,
}

impl EventTime {
    // 終日イベントは UTC の0時として扱う
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        match (&self.date_time, &self.date) {
            (Some(dt), _) => Some(dt.with_timezone(&Utc)),
            (None, Some(date)) => Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTimeRequest {
    date_time: String,
    time_zone: &'static str,
}

impl EventTimeRequest {
    fn utc(dt: &DateTime<Utc>) -> Self {
        Self {
            date_time: format_datetime(dt),
            time_zone: "UTC",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Reminders {
    use_default: bool,
    overrides: Vec<Reminder>,
}

#[derive(Debug, Serialize)]
struct EventRequest<'a> {
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    start: EventTimeRequest,
    end: EventTimeRequest,
    reminders: Reminders,
}

impl<'a> From<&'a CalendarEvent> for EventRequest<'a> {
    fn from(event: &'a CalendarEvent) -> Self {
        Self {
            summary: &event.title,
            description: event.description.as_deref(),
            location: event.location.as_deref(),
            start: EventTimeRequest::utc(&event.start),
            end: EventTimeRequest::utc(&event.end),
            reminders: Reminders {
                use_default: false,
                overrides: event.reminders.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<EventItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventItem {
    id: String,
    status: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    #[serde(default)]
    start: EventTime,
    #[serde(default)]
    end: EventTime,
}

impl EventItem {
    fn into_event(self) -> Option<CalendarEvent> {
        if self.status.as_deref() == Some("cancelled") {
            return None;
        }
        let title = self.summary?;
        let start = self.start.to_utc()?;
        let end = self.end.to_utc().unwrap_or(start);

        Some(CalendarEvent {
            id: Some(self.id),
            title,
            description: self.description,
            location: self.location,
            start,
            end,
            reminders: Vec::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
}

/// Google Calendar のAPIクライアント
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    access_token: String,
    calendar_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleCalendarClient {
    /// 取得済みのアクセストークンからクライアントを作成
    pub fn with_token(
        access_token: impl Into<String>,
        calendar_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            calendar_id: calendar_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// 設定に従って認証し、クライアントを作成
    pub async fn authenticate(config: &AppConfig) -> Result<Self> {
        let access_token = auth::authenticate(&config.credentials_path, &config.token_path).await?;
        info!("Authenticated with Google Calendar");

        Ok(Self::with_token(
            access_token,
            config.calendar_id.clone(),
            config.calendar_base_url.clone(),
        ))
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_events(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<CalendarEvent>> {
        let url = self.events_url();
        let time_min = format_datetime(&start);
        let time_max = format_datetime(&end);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("timeMin", time_min.clone()),
                ("timeMax", time_max.clone()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            debug!("GET {} timeMin={} timeMax={} pageToken={:?}", url, time_min, time_max, page_token);

            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&query)
                .send()
                .await?;
            let response = ensure_success(response, PROVIDER, AuthStatuses::Unauthorized).await?;
            let page: EventsPage = response.json().await?;

            debug!("Retrieved {} events from calendar {}", page.items.len(), self.calendar_id);

            events.extend(
                page.items
                    .into_iter()
                    .filter_map(EventItem::into_event)
                    .filter(|e| e.start >= start && e.start < end),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!("Found {} existing events between {} and {}", events.len(), time_min, time_max);
        Ok(events)
    }

    async fn create_event(&self, event: &CalendarEvent) -> Result<String> {
        let body = EventRequest::from(event);
        debug!("POST {} summary='{}' start={}", self.events_url(), event.title, event.start);

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response, PROVIDER, AuthStatuses::Unauthorized).await?;

        let created: CreatedEvent = response.json().await?;
        if created.id.is_empty() {
            warn!("Calendar returned an empty event id for '{}'", event.title);
            return Err(SyncError::Upstream {
                provider: PROVIDER.to_string(),
                status: 200,
                message: "created event has no id".to_string(),
            });
        }

        debug!("Created calendar event with ID: {}", created.id);
        Ok(created.id)
    }
}
