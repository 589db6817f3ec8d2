// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory stand-in for the remote web API.

use std::{cell::RefCell, collections::VecDeque};

use reqwest::StatusCode;
use serde_json::Value;

use crate::{prelude::*, webapi::WebApi};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Request {
    WithArg {
        endpoint: String,
        arg: Value,
        body: Option<Vec<u8>>,
    },
    Json {
        endpoint: String,
        body: Value,
    },
}

impl Request {
    pub(crate) fn endpoint(&self) -> &str {
        match self {
            Self::WithArg { endpoint, .. } | Self::Json { endpoint, .. } => endpoint,
        }
    }
}

/// Replays canned responses in order and records all requests.
///
/// A `None` response simulates a transport failure.
#[derive(Debug, Default)]
pub(crate) struct FakeWebApi {
    responses: RefCell<VecDeque<Option<Value>>>,
    requests: RefCell<Vec<Request>>,
}

impl FakeWebApi {
    pub(crate) fn new(responses: impl IntoIterator<Item = Option<Value>>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().collect()),
            requests: RefCell::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    fn respond(&self, request: Request) -> Result<Value> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .expect("unexpected request")
            .ok_or(Error::Status(StatusCode::BAD_GATEWAY))
    }
}

impl WebApi for FakeWebApi {
    async fn post_with_arg(
        &self,
        endpoint: &str,
        arg: &Value,
        body: Option<Vec<u8>>,
    ) -> Result<Value> {
        self.respond(Request::WithArg {
            endpoint: endpoint.to_owned(),
            arg: arg.clone(),
            body,
        })
    }

    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.respond(Request::Json {
            endpoint: endpoint.to_owned(),
            body: body.clone(),
        })
    }
}
