// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use reqwest::Response;
use serde_json::Value;

use crate::prelude::*;

/// Custom header that carries the JSON arguments of upload requests.
pub const API_ARG_HEADER: &str = "MapHub-API-Arg";

/// The remote operations of the web API.
///
/// Both operations return the JSON response whatever the status code,
/// because the remote service reports failures in the response body.
#[allow(async_fn_in_trait)]
pub trait WebApi {
    /// POST with arguments in the [`API_ARG_HEADER`] and an optional raw body.
    async fn post_with_arg(&self, endpoint: &str, arg: &Value, body: Option<Vec<u8>>)
    -> Result<Value>;

    /// POST with arguments in the JSON body.
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value>;
}

pub async fn receive_response_json(response: Response) -> Result<Value> {
    let response_status = response.status();
    let bytes = response.bytes().await?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(json) => {
            if !response_status.is_success() {
                log::debug!("Response with status {response_status}: {json}");
            }
            Ok(json)
        }
        Err(_) if !response_status.is_success() => Err(Error::Status(response_status)),
        Err(err) => Err(err.into()),
    }
}

/// Fails with the remote error message if `field` is missing.
pub fn expect_field(response: &Value, field: &str) -> Result<()> {
    if response.get(field).is_some() {
        return Ok(());
    }
    Err(maptable_core::Error::rejected(response).into())
}

/// Serialize JSON with all non-ASCII characters escaped.
///
/// Header values are restricted to visible ASCII characters.
#[must_use]
pub fn to_ascii_json(value: &Value) -> String {
    let json = value.to_string();
    if json.is_ascii() {
        return json;
    }
    let mut escaped = String::with_capacity(json.len() + json.len() / 2);
    for c in json.chars() {
        if c.is_ascii() {
            escaped.push(c);
            continue;
        }
        let mut utf16 = [0u16; 2];
        for unit in c.encode_utf16(&mut utf16) {
            escaped.push_str(&format!("\\u{unit:04x}"));
        }
    }
    escaped
}
