// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use reqwest::{
    Client, Url,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde_json::Value;

use crate::{
    prelude::*,
    webapi::{API_ARG_HEADER, WebApi, receive_response_json, to_ascii_json},
};

pub const DEFAULT_API_URL: &str = "https://maphub.net/api/1/";

/// Immutable environment for accessing the web API.
pub struct Environment {
    api_url: Url,
    api_key: String,
    client: Client,
}

impl Environment {
    #[must_use]
    pub fn new(mut api_url: Url, api_key: String) -> Self {
        // Joining relative endpoints requires a trailing slash
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }
        Self {
            api_url,
            api_key,
            client: Client::new(),
        }
    }

    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn join_api_url(&self, endpoint: &str) -> Result<Url> {
        let api_url = self.api_url.join(endpoint)?;
        log::debug!("API URL: {api_url}");
        Ok(api_url)
    }

    fn authorization(&self) -> String {
        format!("Token {}", self.api_key)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}

impl WebApi for Environment {
    async fn post_with_arg(
        &self,
        endpoint: &str,
        arg: &Value,
        body: Option<Vec<u8>>,
    ) -> Result<Value> {
        let request_url = self.join_api_url(endpoint)?;
        let mut request = self
            .client
            .post(request_url)
            .header(AUTHORIZATION, self.authorization())
            .header(API_ARG_HEADER, to_ascii_json(arg));
        if let Some(body) = body {
            request = request.body(body);
        }
        let response = request.send().await?;
        receive_response_json(response).await
    }

    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let request_url = self.join_api_url(endpoint)?;
        let request_body = serde_json::to_vec(body)?;
        let request = self
            .client
            .post(request_url)
            .header(AUTHORIZATION, self.authorization())
            .header(CONTENT_TYPE, "application/json")
            .body(request_body);
        let response = request.send().await?;
        receive_response_json(response).await
    }
}
