use std::future::Future;
use std::io::ErrorKind;
use std::path::Path;
use std::pin::Pin;

use log::{debug, info, warn};
use yup_oauth2::authenticator_delegate::InstalledFlowDelegate;
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::error::{Result, SyncError};

/// Google Calendar の読み書きスコープ
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// 認証URLをブラウザで開き、ターミナルにも表示する
struct BrowserFlowDelegate;

impl InstalledFlowDelegate for BrowserFlowDelegate {
    fn present_user_url<'a>(
        &'a self,
        url: &'a str,
        need_code: bool,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<String, String>> + Send + 'a>> {
        Box::pin(async move {
            println!("\nOpen this URL in your browser to authorize Google Calendar access:\n");
            println!("{}\n", url);

            if let Err(e) = open::that(url) {
                warn!("Could not open browser automatically: {}", e);
            }

            if need_code {
                return Err("interactive code entry is not supported, use the redirect flow".to_string());
            }
            Ok(String::new())
        })
    }
}

/// 保存済みトークンを読み込み（期限切れなら更新し）、無ければブラウザで認可してアクセストークンを返す
///
/// トークンは `token_path` に保存され、次回以降の実行で再利用される。
pub async fn authenticate(credentials_path: &Path, token_path: &Path) -> Result<String> {
    let secret = match yup_oauth2::read_application_secret(credentials_path).await {
        Ok(secret) => secret,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SyncError::Configuration(format!(
                "{} not found; download the OAuth desktop client secret from Google Cloud Console",
                credentials_path.display()
            )));
        }
        Err(e) => {
            return Err(SyncError::Auth(format!(
                "malformed client secret in {}: {}",
                credentials_path.display(),
                e
            )));
        }
    };

    if token_path.exists() {
        debug!("Reusing token cache at {}", token_path.display());
    } else {
        info!("No token cache found, browser authorization will be required");
    }

    let auth = InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
        .persist_tokens_to_disk(token_path)
        .flow_delegate(Box::new(BrowserFlowDelegate))
        .build()
        .await
        .map_err(|e| SyncError::Auth(format!("failed to create authenticator: {}", e)))?;

    let token = auth
        .token(&[CALENDAR_SCOPE])
        .await
        .map_err(|e| SyncError::Auth(format!("failed to obtain access token: {}", e)))?;

    let access_token = token
        .token()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SyncError::Auth("authorization returned no access token".to_string()))?
        .to_string();

    debug!("Access token obtained, length: {}", access_token.len());
    Ok(access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_client_secret_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = authenticate(&dir.path().join("credentials.json"), &dir.path().join("token.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
    }

    #[tokio::test]
    async fn malformed_client_secret_is_an_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = dir.path().join("credentials.json");
        let mut file = std::fs::File::create(&credentials).unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = authenticate(&credentials, &dir.path().join("token.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Auth(_)));
    }
}
