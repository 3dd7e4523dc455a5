use chrono::{DateTime, Utc};
use log::{debug, error};
use reqwest::{Response, StatusCode};

use crate::error::{Result, SyncError};

/// プロバイダごとに認証エラーとみなすステータス
#[derive(Debug, Clone, Copy)]
pub enum AuthStatuses {
    /// 401のみ
    Unauthorized,
    /// 401と403
    UnauthorizedOrForbidden,
}

impl AuthStatuses {
    fn matches(self, status: StatusCode) -> bool {
        match self {
            AuthStatuses::Unauthorized => status == StatusCode::UNAUTHORIZED,
            AuthStatuses::UnauthorizedOrForbidden => {
                status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
            }
        }
    }
}

/// レスポンスのステータスを検査し、非2xxをエラー種別に変換する
pub async fn ensure_success(
    response: Response,
    provider: &str,
    auth_statuses: AuthStatuses,
) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        debug!(
            "{} responded {} {}",
            provider,
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        );
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = retry_after(&response);
        error!("{} rate limit hit, retry after {:?}s", provider, retry_after_secs);
        return Err(SyncError::RateLimited { retry_after_secs });
    }

    let body = match response.text().await {
        Ok(text) => text,
        Err(_) => "Failed to read error response".to_string(),
    };

    error!("{} API error: HTTP {} - {}", provider, status.as_u16(), body);

    if auth_statuses.matches(status) {
        return Err(SyncError::Auth(format!(
            "{} rejected the credentials (HTTP {}): {}",
            provider,
            status.as_u16(),
            body
        )));
    }

    Err(SyncError::Upstream {
        provider: provider.to_string(),
        status: status.as_u16(),
        message: body,
    })
}

// football-data.org は X-RequestCounter-Reset、Googleは Retry-After
fn retry_after(response: &Response) -> Option<u64> {
    ["X-RequestCounter-Reset", "Retry-After"]
        .iter()
        .filter_map(|name| response.headers().get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| value.trim().parse::<u64>().ok())
}

/// RFC3339形式の日付文字列を生成（秒精度、Zサフィックス）
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_datetime_drops_subseconds() {
        let dt = Utc.with_ymd_and_hms(2024, 8, 24, 13, 30, 0).unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(format_datetime(&dt), "2024-08-24T13:30:00Z");
    }

    #[test]
    fn auth_statuses_respect_provider_rules() {
        assert!(AuthStatuses::Unauthorized.matches(StatusCode::UNAUTHORIZED));
        assert!(!AuthStatuses::Unauthorized.matches(StatusCode::FORBIDDEN));
        assert!(AuthStatuses::UnauthorizedOrForbidden.matches(StatusCode::FORBIDDEN));
        assert!(!AuthStatuses::UnauthorizedOrForbidden.matches(StatusCode::NOT_FOUND));
    }
}
