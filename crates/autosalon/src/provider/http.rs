//! HTTP plumbing shared by the REST-backed providers.

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use crate::error::{AutosalonError, ProviderError, Result};

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn build_client() -> Result<Client> {
    let builder = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("autosalon/", env!("CARGO_PKG_VERSION")));
    // Unit tests talk to loopback servers; a proxy from the environment would intercept them.
    #[cfg(test)]
    let builder = builder.no_proxy();
    builder
        .build()
        .map_err(|e| AutosalonError::Provider(ProviderError::Transport(e.to_string())))
}

pub(crate) fn map_reqwest_error(e: reqwest::Error) -> AutosalonError {
    let err = if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_decode() {
        ProviderError::Decode(e.to_string())
    } else {
        ProviderError::Transport(e.to_string())
    };
    AutosalonError::Provider(err)
}

/// Passes successful responses through and turns the rest into provider errors.
///
/// `missing` names the record a 404 refers to, if any.
pub(crate) async fn check_status(res: Response, missing: Option<&str>) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::PermissionDenied(body),
        StatusCode::NOT_FOUND => match missing {
            Some(id) => ProviderError::NotFound(id.to_string()),
            None => ProviderError::Http {
                status: status.as_u16(),
                body,
            },
        },
        s => ProviderError::Http {
            status: s.as_u16(),
            body,
        },
    };
    Err(AutosalonError::Provider(err))
}

pub(crate) fn decode_error(msg: impl Into<String>) -> AutosalonError {
    AutosalonError::Provider(ProviderError::Decode(msg.into()))
}


#[cfg(test)]
mod tests {
    use super::test_server::serve;
    use super::*;

    async fn status_error(status: u16, missing: Option<&str>) -> ProviderError {
        let url = serve(status, "{\"message\":\"nope\"}").await;
        let res = build_client().unwrap().get(&url).send().await.unwrap();
        match check_status(res, missing).await {
            Err(AutosalonError::Provider(err)) => err,
            other => panic!("expected provider error, got {:?}", other.map(|r| r.status())),
        }
    }

    #[tokio::test]
    async fn test_auth_failures_are_permission_denied() {
        assert!(matches!(
            status_error(401, None).await,
            ProviderError::PermissionDenied(_)
        ));
        assert!(matches!(
            status_error(403, Some("7")).await,
            ProviderError::PermissionDenied(_)
        ));
    }

    #[tokio::test]
    async fn test_not_found_names_the_record() {
        match status_error(404, Some("7")).await {
            ProviderError::NotFound(id) => assert_eq!(id, "7"),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert!(matches!(
            status_error(404, None).await,
            ProviderError::Http { status: 404, .. }
        ));
    }

    #[tokio::test]
    async fn test_other_statuses_keep_the_body() {
        match status_error(500, None).await {
            ProviderError::Http { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("nope"));
            }
            other => panic!("expected Http, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let url = serve(200, "[]").await;
        let res = build_client().unwrap().get(&url).send().await.unwrap();
        assert!(check_status(res, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let err = build_client()
            .unwrap()
            .get(super::test_server::UNREACHABLE)
            .send()
            .await
            .unwrap_err();
        assert!(matches!(
            map_reqwest_error(err),
            AutosalonError::Provider(ProviderError::Transport(_))
        ));
    }
}
