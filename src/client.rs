// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Mackerel dashboards API client.
///
/// [`DashboardClient`] is the seam between the dashboard logic and the
/// network: commands only depend on the trait, and [`MackerelClient`] is the
/// HTTP implementation used by the binary.
use std::fmt;

use async_trait::async_trait;
use masterror::AppError;
use reqwest::{Method, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    dashboard::{DashboardList, Organization, RemoteDashboard},
    error::Error,
    retry::{RetryConfig, retry_with_backoff_if},
};

/// API endpoint used when none is configured.
pub const DEFAULT_API_BASE: &str = "https://api.mackerelio.com/";

/// Operations the dashboard commands need from Mackerel.
#[async_trait]
pub trait DashboardClient: Send + Sync
{
    /// Organization the API key belongs to.
    async fn get_org(&self,) -> Result<Organization, AppError,>;

    /// Every dashboard of the organization.
    async fn find_dashboards(&self,) -> Result<Vec<RemoteDashboard,>, AppError,>;

    /// A single dashboard with its widgets.
    async fn find_dashboard(&self, id: &str,) -> Result<RemoteDashboard, AppError,>;

    async fn create_dashboard(
        &self,
        dashboard: &RemoteDashboard,
    ) -> Result<RemoteDashboard, AppError,>;

    async fn update_dashboard(
        &self,
        id: &str,
        dashboard: &RemoteDashboard,
    ) -> Result<RemoteDashboard, AppError,>;

    /// Deletes a dashboard and returns what was deleted.
    async fn delete_dashboard(&self, id: &str,) -> Result<RemoteDashboard, AppError,>;
}

/// Connection settings for [`MackerelClient`].
#[derive(Debug, Clone,)]
pub struct ClientConfig
{
    /// Value of the `X-Api-Key` header.
    pub api_key:  String,
    /// Base URL of the API, with or without a trailing slash.
    pub api_base: String,
    /// Backoff applied to read requests.
    pub retry:    RetryConfig,
}

impl ClientConfig
{
    /// Builds a configuration from optional CLI or environment values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when no API key is available.
    pub fn new(api_key: Option<&str,>, api_base: Option<&str,>,) -> Result<Self, Error,>
    {
        let api_key = api_key
            .map(str::trim,)
            .filter(|key| !key.is_empty(),)
            .ok_or_else(|| Error::validation("MACKEREL_APIKEY is not set (use --apikey)",),)?;

        let api_base = api_base
            .map(str::trim,)
            .filter(|base| !base.is_empty(),)
            .unwrap_or(DEFAULT_API_BASE,);

        Ok(Self {
            api_key:  api_key.to_owned(),
            api_base: api_base.to_owned(),
            retry:    RetryConfig::default(),
        },)
    }
}

/// HTTP implementation of [`DashboardClient`].
#[derive(Debug, Clone,)]
pub struct MackerelClient
{
    http:   reqwest::Client,
    config: ClientConfig,
}

impl MackerelClient
{
    /// Creates a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the HTTP client cannot be initialized.
    pub fn new(config: ClientConfig,) -> Result<Self, AppError,>
    {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),)
            .build()
            .map_err(|e| AppError::internal(format!("failed to initialize HTTP client: {e}"),),)?;

        Ok(Self {
            http,
            config,
        },)
    }

    fn endpoint(&self, path: &str,) -> String
    {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    async fn send<B, T,>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B,>,
    ) -> Result<T, RequestFailure,>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path,);
        debug!(%method, %url, "calling Mackerel API");

        let mut request = self
            .http
            .request(method.clone(), &url,)
            .header("X-Api-Key", &self.config.api_key,)
            .header(header::ACCEPT, "application/json",);
        if let Some(body,) = body {
            request = request.json(body,);
        }

        let response = request.send().await.map_err(|e| RequestFailure {
            error:     AppError::service(format!("{method} {path} failed: {e}"),),
            transient: true,
        },)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RequestFailure {
                error:     status_error(status, &method, path, &text,),
                transient: is_transient_status(status,),
            },);
        }

        response.json::<T>().await.map_err(|e| RequestFailure {
            error:     AppError::service(format!("invalid response from {method} {path}: {e}"),),
            transient: false,
        },)
    }

    async fn get<T,>(&self, path: &str,) -> Result<T, AppError,>
    where
        T: DeserializeOwned,
    {
        let operation = format!("GET {path}");
        retry_with_backoff_if(
            &self.config.retry,
            &operation,
            move || self.send::<(), T,>(Method::GET, path, None,),
            |failure: &RequestFailure| failure.transient,
        )
        .await
        .map_err(|failure| failure.error,)
    }

    async fn send_once<B, T,>(&self, method: Method, path: &str, body: Option<&B,>,) -> Result<T, AppError,>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(method, path, body,).await.map_err(|failure| failure.error,)
    }
}

/// Failed request, tagged with whether repeating it may succeed.
#[derive(Debug,)]
struct RequestFailure
{
    error:     AppError,
    transient: bool,
}

impl fmt::Display for RequestFailure
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}", self.error)
    }
}

/// Server errors and rate limiting are worth another attempt; other client
/// errors are not.
fn is_transient_status(status: StatusCode,) -> bool
{
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn status_error(status: StatusCode, method: &Method, path: &str, body: &str,) -> AppError
{
    let message = format!("{method} {path} returned {status}: {}", body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::unauthorized(message,),
        StatusCode::NOT_FOUND => AppError::not_found(message,),
        StatusCode::BAD_REQUEST => AppError::validation(message,),
        _ => AppError::service(message,),
    }
}

#[async_trait]
impl DashboardClient for MackerelClient
{
    async fn get_org(&self,) -> Result<Organization, AppError,>
    {
        self.get("/api/v0/org",).await
    }

    async fn find_dashboards(&self,) -> Result<Vec<RemoteDashboard,>, AppError,>
    {
        let list: DashboardList = self.get("/api/v0/dashboards",).await?;
        Ok(list.dashboards,)
    }

    async fn find_dashboard(&self, id: &str,) -> Result<RemoteDashboard, AppError,>
    {
        self.get(&format!("/api/v0/dashboards/{id}"),).await
    }

    async fn create_dashboard(
        &self,
        dashboard: &RemoteDashboard,
    ) -> Result<RemoteDashboard, AppError,>
    {
        self.send_once(Method::POST, "/api/v0/dashboards", Some(dashboard,),).await
    }

    async fn update_dashboard(
        &self,
        id: &str,
        dashboard: &RemoteDashboard,
    ) -> Result<RemoteDashboard, AppError,>
    {
        self.send_once(Method::PUT, &format!("/api/v0/dashboards/{id}"), Some(dashboard,),).await
    }

    async fn delete_dashboard(&self, id: &str,) -> Result<RemoteDashboard, AppError,>
    {
        self.send_once::<(), _,>(Method::DELETE, &format!("/api/v0/dashboards/{id}"), None,).await
    }
}
