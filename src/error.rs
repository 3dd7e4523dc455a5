use thiserror::Error;

/// 同期処理全体で使うエラー型
#[derive(Debug, Error)]
pub enum SyncError {
    /// APIキーや認証情報ファイルが無い
    #[error("configuration error: {0}")]
    Configuration(String),

    /// OAuthフローの失敗、または更新できないトークン
    #[error("authentication failed: {0}")]
    Auth(String),

    /// プロバイダ側のレート制限
    #[error("rate limited by provider{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// その他の非2xxレスポンス
    #[error("{provider} returned HTTP {status}: {message}")]
    Upstream {
        provider: String,
        status: u16,
        message: String,
    },

    /// チーム検索に失敗
    #[error("team '{0}' not found")]
    NotFound(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(" (retry in {}s)", secs),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_message_includes_retry_hint() {
        let err = SyncError::RateLimited {
            retry_after_secs: Some(42),
        };
        assert_eq!(err.to_string(), "rate limited by provider (retry in 42s)");

        let err = SyncError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(err.to_string(), "rate limited by provider");
    }

    #[test]
    fn upstream_message_names_provider_and_status() {
        let err = SyncError::Upstream {
            provider: "football-data.org".to_string(),
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "football-data.org returned HTTP 500: boom");
    }
}
