//! HTTP access to a FrontLoop backend for observers and the customer chat.

use fl_core::error::ClientError;
use fl_core::remote::{AgentClient, RequestStore};
use fl_core::types::{ChatInput, ChatReply, HelpRequest, HelpRequestId, ResolveRequestInput};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| transport(&err))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    async fn fetch_requests(&self, query: &[(&str, &str)]) -> Result<Vec<HelpRequest>, ClientError> {
        let response = self
            .client
            .get(self.url("/requests"))
            .query(query)
            .send()
            .await
            .map_err(|err| transport(&err))?;
        decode(response).await
    }
}

fn transport(err: &reqwest::Error) -> ClientError {
    ClientError::Transport {
        message: err.to_string(),
    }
}

/// Turn a response into `T`, or into a `RemoteRejection` carrying the backend's own
/// message when the status is not a success.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await.map_err(|err| transport(&err))?;

    if !status.is_success() {
        tracing::debug!(%status, "backend rejected request");
        return Err(match serde_json::from_str::<ErrorBody>(&body) {
            Ok(error) => ClientError::RemoteRejection {
                code: error.code,
                message: error.message,
            },
            Err(_) => ClientError::RemoteRejection {
                code: status.as_u16().to_string(),
                message: if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body
                },
            },
        });
    }

    serde_json::from_str(&body).map_err(|err| ClientError::Transport {
        message: format!("invalid response from backend: {err}"),
    })
}

impl RequestStore for HttpClient {
    async fn list_requests(&self) -> Result<Vec<HelpRequest>, ClientError> {
        self.fetch_requests(&[]).await
    }

    async fn get_request(&self, id: &HelpRequestId) -> Result<Option<HelpRequest>, ClientError> {
        let requests = self.fetch_requests(&[("id", id.as_str())]).await?;
        Ok(requests.into_iter().find(|request| &request.id == id))
    }

    async fn resolve_request(
        &self,
        id: &HelpRequestId,
        answer: &str,
    ) -> Result<HelpRequest, ClientError> {
        let response = self
            .client
            .post(self.url("/respond"))
            .json(&ResolveRequestInput {
                request_id: id.clone(),
                answer: answer.to_string(),
            })
            .send()
            .await
            .map_err(|err| transport(&err))?;
        decode(response).await
    }
}

impl AgentClient for HttpClient {
    async fn converse(&self, message: &str, customer_name: &str) -> Result<ChatReply, ClientError> {
        let response = self
            .client
            .post(self.url("/chat"))
            .json(&ChatInput {
                message: message.to_string(),
                customer_name: customer_name.to_string(),
            })
            .send()
            .await
            .map_err(|err| transport(&err))?;
        decode(response).await
    }
}
