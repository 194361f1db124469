//! # Request Endpoint
//!
//! Translates query parameters into a [`Loader`] call and renders the result
//! as a JSON (or callback-wrapped JSONP) response. Transport-agnostic: the
//! caller maps [`Response`] onto HTTP, a CLI, or anything else.
use crate::loader::{LoadMode, LoadModeError, Loader};
use crate::sheet::SheetSelector;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

/// Query parameters of a request.
pub type Params = HashMap<String, String>;

static ID_FILTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9/_-]+$").expect("Hardcode regex pattern"));
static CACHE_FILTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i:true|false)$").expect("Hardcode regex pattern"));
static CALLBACK_FILTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Hardcode regex pattern"));

/// Errors caused by the caller rather than by data availability.
#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("{0}")]
    LoadModeError(#[from] LoadModeError),
}

// Named parameter handling

/// A request parameter: its name and how its value is read and filtered.
pub trait NamedParam<T> {
    /// Returns the parameter name as used in the query string
    fn name() -> &'static str;

    /// Extracts the parameter value, `None` if absent or rejected by the filter
    fn read(params: &Params) -> Result<Option<T>, EndpointError>;

    /// Raw value of the parameter if present
    fn value(params: &Params) -> Option<&str> {
        params.get(Self::name()).map(String::as_str)
    }

    /// Raw value if it matches `filter`
    fn filtered<'a>(params: &'a Params, filter: &Regex) -> Option<&'a str> {
        Self::value(params).filter(|value| filter.is_match(value))
    }
}

/// Feed id parameter handler
pub struct IdParam;

/// Load mode parameter handler
pub struct ModeParam;

/// Worksheet selector parameter handler
pub struct SheetParam;

/// Cache switch parameter handler
pub struct CacheParam;

/// JSONP callback parameter handler
pub struct CallbackParam;

impl NamedParam<String> for IdParam {
    fn name() -> &'static str {
        "id"
    }

    fn read(params: &Params) -> Result<Option<String>, EndpointError> {
        Ok(Self::filtered(params, &ID_FILTER).map(str::to_owned))
    }
}

impl NamedParam<LoadMode> for ModeParam {
    fn name() -> &'static str {
        "mode"
    }

    fn read(params: &Params) -> Result<Option<LoadMode>, EndpointError> {
        Ok(Self::value(params).map(str::parse::<LoadMode>).transpose()?)
    }
}

impl NamedParam<SheetSelector> for SheetParam {
    fn name() -> &'static str {
        "sheet"
    }

    fn read(params: &Params) -> Result<Option<SheetSelector>, EndpointError> {
        Ok(Self::value(params)
            .filter(|value| !value.is_empty())
            .map(SheetSelector::from))
    }
}

impl NamedParam<bool> for CacheParam {
    fn name() -> &'static str {
        "cache"
    }

    fn read(params: &Params) -> Result<Option<bool>, EndpointError> {
        Ok(Self::filtered(params, &CACHE_FILTER).map(|value| !value.eq_ignore_ascii_case("false")))
    }
}

impl NamedParam<String> for CallbackParam {
    fn name() -> &'static str {
        "callback"
    }

    fn read(params: &Params) -> Result<Option<String>, EndpointError> {
        Ok(Self::filtered(params, &CALLBACK_FILTER).map(str::to_owned))
    }
}

/// Parsed request parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Request {
    pub id: Option<String>,
    pub mode: LoadMode,
    pub sheet: SheetSelector,
    pub cache: Option<bool>,
    pub callback: Option<String>,
}

impl TryFrom<&Params> for Request {
    type Error = EndpointError;

    fn try_from(params: &Params) -> Result<Self, Self::Error> {
        Ok(Request {
            id: IdParam::read(params)?,
            mode: ModeParam::read(params)?.unwrap_or_default(),
            sheet: SheetParam::read(params)?.unwrap_or_default(),
            cache: CacheParam::read(params)?,
            callback: CallbackParam::read(params)?,
        })
    }
}

/// A rendered response.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Response {
    fn json(body: String) -> Self {
        Response {
            status: 200,
            reason: "OK",
            headers: vec![
                ("Content-Type", "application/json; charset=utf-8".to_owned()),
                ("X-Content-Type-Options", "nosniff".to_owned()),
            ],
            body,
        }
    }

    fn no_data() -> Self {
        Response {
            status: 500,
            reason: "Failed to load spreadsheet",
            headers: Vec::new(),
            body: String::new(),
        }
    }

    fn bad_request(error: &EndpointError) -> Self {
        Response {
            status: 400,
            reason: "Bad Request",
            headers: vec![("Content-Type", "application/json; charset=utf-8".to_owned())],
            body: serde_json::json!({ "message": error.to_string() }).to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Handles one request given as query parameters, filtering every value.
pub fn handle(loader: &Loader, params: &Params) -> Response {
    match Request::try_from(params) {
        Ok(request) => respond(loader, &request),
        Err(error) => {
            tracing::warn!(%error, "rejected request");
            Response::bad_request(&error)
        }
    }
}

/// Serves an already validated request. Unlike [`handle`], the id is used as
/// given, so it may be a full feed URL.
pub fn respond(loader: &Loader, request: &Request) -> Response {
    let Some(id) = request.id.as_deref() else {
        tracing::warn!("request without a valid id");
        return Response::no_data();
    };

    let use_cache = request.cache.unwrap_or(loader.config().cache);
    let Some(table) = loader.get_with_cache(id, &request.sheet, request.mode, use_cache) else {
        return Response::no_data();
    };
    let body = match serde_json::to_string(&table) {
        Ok(body) => body,
        Err(error) => {
            tracing::warn!(%error, "cannot serialize table");
            return Response::no_data();
        }
    };

    match request.callback.as_deref().filter(|_| loader.config().jsonp) {
        Some(callback) => Response::json(format!("{callback}({body})")),
        None => Response::json(body),
    }
}
