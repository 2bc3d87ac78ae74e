//! Response classification.
//!
//! Maps a raw response onto the error taxonomy:
//!
//! | Response | Outcome |
//! |---|---|
//! | 2xx | passed through |
//! | 5xx | [`Error::Server`] |
//! | 401 | [`Error::Auth`] |
//! | 304 | [`Error::NotModified`] |
//! | other, JSON body with `error` | [`Error::Application`] |
//! | other | [`Error::MalformedResponse`] |

use serde::de::DeserializeOwned;
use tracing::trace;

use cloudbox_core::{ApplicationError, Error, ErrorRecord, HttpResponse};

use crate::endpoints::ErrorBody;

/// Pass a successful response through, or classify the failure.
pub fn classify(response: HttpResponse) -> Result<HttpResponse, Error> {
    let status = response.status;
    trace!(status, "classifying response");

    if response.is_success() {
        return Ok(response);
    }

    if (500..600).contains(&status) {
        let message = format!("server error: {}", response.text());
        return Err(Error::Server(
            ErrorRecord::new(message).with_response(response),
        ));
    }

    if status == 401 {
        let mut record = ErrorRecord::new("user is not authenticated");
        if let Ok(body) = serde_json::from_slice::<ErrorBody>(&response.body) {
            if let Some(message) = body.error_message() {
                record.message = message;
            }
            record.user_message = body.user_error;
        }
        return Err(Error::Auth(record.with_response(response)));
    }

    if status == 304 {
        return Err(Error::NotModified(
            ErrorRecord::new("entry has not changed").with_response(response),
        ));
    }

    let body = match serde_json::from_slice::<ErrorBody>(&response.body) {
        Ok(body) => body,
        Err(_) => {
            let message = format!("unparseable error body: {}", response.text());
            return Err(Error::MalformedResponse(
                ErrorRecord::new(message).with_response(response),
            ));
        }
    };

    match body.error_message() {
        Some(message) => {
            let mut record = ErrorRecord::new(message);
            record.user_message = body.user_error;
            Err(Error::Application(ApplicationError {
                record: record.with_response(response),
                offset: body.offset,
                upload_id: body.upload_id,
            }))
        }
        None => {
            let message = format!("error body without an error field: {}", response.text());
            Err(Error::MalformedResponse(
                ErrorRecord::new(message).with_response(response),
            ))
        }
    }
}

/// Classify a response and decode a successful body as JSON.
pub fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, Error> {
    let response = classify(response)?;
    serde_json::from_slice(&response.body).map_err(|e| {
        let message = format!("unable to parse JSON response: {}", e);
        Error::MalformedResponse(ErrorRecord::new(message).with_response(response))
    })
}
