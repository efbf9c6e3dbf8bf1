//! Client-side model of the signup form: a `reqwest` based client for the
//! waitlist endpoint and the explicit state machine driving it
//! (Idle -> Submitting -> Submitted | Idle-with-error).

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Analytics label used when the drone-type field was left empty.
pub const DRONE_TYPE_NOT_SPECIFIED: &str = "not_specified";

/// Message shown when the endpoint produced no response at all.
const TRANSPORT_FAILURE_MSG: &str = "Something went wrong. Please try again.";
/// Fallback when an error response carries no `error` field.
const REJECTED_FALLBACK_MSG: &str = "Failed to join waitlist";

// ###################################
// ->   WAITLIST CLIENT
// ###################################
#[derive(Debug)]
pub struct WaitlistClient {
    pub http_client: Client,
    pub url: reqwest::Url,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    email: &'a str,
    drone_type: &'a str,
}

/// Whatever the endpoint answers: exactly one of the fields is set.
#[derive(Debug, Deserialize)]
struct SubmitResponseBody {
    message: Option<String>,
    error: Option<String>,
}

impl WaitlistClient {
    /// Resolves the endpoint URL once; `submit` never revalidates it.
    pub fn new<S: AsRef<str>>(url: S, timeout: std::time::Duration) -> Result<Self> {
        let url = reqwest::Url::parse(url.as_ref())
            .and_then(|base| base.join("api/waitlist"))
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(WaitlistClient { http_client, url })
    }

    /// POSTs one signup to the waitlist endpoint.
    /// Returns the confirmation message, or the failure to surface to the user.
    pub async fn submit(
        &self,
        email: &str,
        drone_type: &str,
    ) -> core::result::Result<String, SubmitError> {
        let body = SubmitBody { email, drone_type };

        let resp = self
            .http_client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let data: SubmitResponseBody = resp.json().await?;

        if !status.is_success() {
            return Err(SubmitError::Rejected(
                data.error.unwrap_or_else(|| REJECTED_FALLBACK_MSG.to_string()),
            ));
        }

        Ok(data.message.unwrap_or_default())
    }
}

/// Failure of a single submission attempt: a rejection carries the server's
/// message, a transport failure produced no response to take one from.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("waitlist signup rejected: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SubmitError {
    /// The message the form displays to the user.
    pub fn surface_message(&self) -> String {
        match self {
            SubmitError::Rejected(msg) => msg.clone(),
            SubmitError::Transport(_) => TRANSPORT_FAILURE_MSG.to_string(),
        }
    }
}

// ###################################
// ->   SIGNUP FORM
// ###################################
/// What the form currently renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Fields editable; carries the message of a failed attempt, if any.
    Idle { error: Option<String> },
    /// Exactly one request in flight.
    Submitting,
    /// Terminal; the form is replaced by a confirmation message.
    Submitted,
}

/// Conversion events reported to the optional analytics hook, labeled the way
/// the landing page tags them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Label is the drone-type value, or [`DRONE_TYPE_NOT_SPECIFIED`].
    SignupCompleted { label: String },
    /// Label is the message surfaced to the user.
    SignupFailed { label: String },
}

pub struct SignupForm {
    client: WaitlistClient,
    state: FormState,
    analytics: Option<Box<dyn FnMut(FormEvent) + Send>>,
}

impl SignupForm {
    pub fn new(client: WaitlistClient) -> Self {
        SignupForm {
            client,
            state: FormState::Idle { error: None },
            analytics: None,
        }
    }

    /// Registers an analytics hook; without one, events are dropped.
    pub fn with_analytics(mut self, hook: impl FnMut(FormEvent) + Send + 'static) -> Self {
        self.analytics = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, FormState::Submitting)
    }

    /// The `Idle -> Submitting` transition. Returns `false` without side
    /// effects when a request is already in flight or the form has already
    /// been submitted; the caller must not start a request in that case.
    pub fn begin_submit(&mut self) -> bool {
        match self.state {
            FormState::Idle { .. } => {
                self.state = FormState::Submitting;
                true
            }
            FormState::Submitting | FormState::Submitted => false,
        }
    }

    /// Drives one full submission with the current field values: gate, send,
    /// transition, report. No automatic retry, the user has to resubmit.
    pub async fn submit(&mut self, email: &str, drone_type: &str) -> &FormState {
        if !self.begin_submit() {
            return &self.state;
        }

        match self.client.submit(email, drone_type).await {
            Ok(_confirmation) => {
                let label = if drone_type.is_empty() {
                    DRONE_TYPE_NOT_SPECIFIED.to_string()
                } else {
                    drone_type.to_string()
                };
                self.track(FormEvent::SignupCompleted { label });
                self.state = FormState::Submitted;
            }
            Err(er) => {
                let message = er.surface_message();
                self.track(FormEvent::SignupFailed {
                    label: message.clone(),
                });
                self.state = FormState::Idle {
                    error: Some(message),
                };
            }
        }

        &self.state
    }

    fn track(&mut self, event: FormEvent) {
        if let Some(hook) = self.analytics.as_mut() {
            hook(event);
        }
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("url parsing error: {0}")]
    UrlParsing(String),
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
