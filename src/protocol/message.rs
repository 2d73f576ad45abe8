//! Request, response and event types for the recognizer resource.

use crate::defaults;
use std::fmt;

/// Identifier of a request within one channel's MRCP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recognizer resource methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    SetParams,
    GetParams,
    DefineGrammar,
    Recognize,
    GetResult,
    StartInputTimers,
    Stop,
}

impl Method {
    /// Protocol method name.
    pub fn name(&self) -> &'static str {
        match self {
            Method::SetParams => "SET-PARAMS",
            Method::GetParams => "GET-PARAMS",
            Method::DefineGrammar => "DEFINE-GRAMMAR",
            Method::Recognize => "RECOGNIZE",
            Method::GetResult => "GET-RESULT",
            Method::StartInputTimers => "START-INPUT-TIMERS",
            Method::Stop => "STOP",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// MRCP status codes used by the recognizer resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200: request was processed.
    Success,
    /// 402: method not valid in the current state.
    MethodNotValidInState,
    /// 406: a required parameter is missing.
    MissingParam,
    /// 407: the method failed in the engine.
    MethodFailed,
    /// 409: a parameter carries an unsupported value.
    UnsupportedParamValue,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Success => 200,
            StatusCode::MethodNotValidInState => 402,
            StatusCode::MissingParam => 406,
            StatusCode::MethodFailed => 407,
            StatusCode::UnsupportedParamValue => 409,
        }
    }
}

/// Request-state carried on responses and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    InProgress,
    Complete,
}

/// Reason a recognition utterance ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionCause {
    Success,
    NoMatch,
    NoInputTimeout,
    RecognitionTimeout,
}

impl CompletionCause {
    /// Numeric cause code per the recognizer resource definition.
    pub fn code(&self) -> u16 {
        match self {
            CompletionCause::Success => 0,
            CompletionCause::NoMatch => 1,
            CompletionCause::NoInputTimeout => 2,
            CompletionCause::RecognitionTimeout => 3,
        }
    }

    /// Protocol cause name.
    pub fn name(&self) -> &'static str {
        match self {
            CompletionCause::Success => "success",
            CompletionCause::NoMatch => "no-match",
            CompletionCause::NoInputTimeout => "no-input-timeout",
            CompletionCause::RecognitionTimeout => "recognition-timeout",
        }
    }
}

impl fmt::Display for CompletionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded request from the signaling stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: RequestId,
    pub method: Method,
    /// Content-Id header, required on DEFINE-GRAMMAR.
    pub content_id: Option<String>,
    /// Content-Type header describing the body.
    pub content_type: Option<String>,
    /// Message body (grammar text on DEFINE-GRAMMAR).
    pub body: Option<String>,
}

impl Request {
    /// Creates a bodyless request.
    pub fn new(id: u64, method: Method) -> Self {
        Self {
            id: RequestId(id),
            method,
            content_id: None,
            content_type: None,
            body: None,
        }
    }

    /// Creates a DEFINE-GRAMMAR request carrying a grammar body.
    pub fn define_grammar(id: u64, content_id: &str, content_type: &str, body: &str) -> Self {
        Self {
            id: RequestId(id),
            method: Method::DefineGrammar,
            content_id: Some(content_id.to_string()),
            content_type: Some(content_type.to_string()),
            body: Some(body.to_string()),
        }
    }

    pub fn with_content_id(mut self, content_id: &str) -> Self {
        self.content_id = Some(content_id.to_string());
        self
    }
}

/// The single response owed for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub request_id: RequestId,
    pub method: Method,
    pub status: StatusCode,
    pub request_state: RequestState,
}

impl Response {
    /// Creates the default success/complete response for a request.
    pub fn for_request(request: &Request) -> Self {
        Self {
            request_id: request.id,
            method: request.method,
            status: StatusCode::Success,
            request_state: RequestState::Complete,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn in_progress(mut self) -> Self {
        self.request_state = RequestState::InProgress;
        self
    }
}

/// Event kinds emitted by the recognizer resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    StartOfInput,
    RecognitionComplete,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::StartOfInput => "START-OF-INPUT",
            EventKind::RecognitionComplete => "RECOGNITION-COMPLETE",
        }
    }
}

/// An asynchronous event raised against an in-progress request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub request_id: RequestId,
    pub request_state: RequestState,
    pub completion_cause: Option<CompletionCause>,
    pub content_type: Option<String>,
    pub body: Option<String>,
}

impl Event {
    /// START-OF-INPUT: the utterance has audibly begun; the request stays
    /// in progress.
    pub fn start_of_input(request_id: RequestId) -> Self {
        Self {
            kind: EventKind::StartOfInput,
            request_id,
            request_state: RequestState::InProgress,
            completion_cause: None,
            content_type: None,
            body: None,
        }
    }

    /// RECOGNITION-COMPLETE: terminal event for a RECOGNIZE request.
    pub fn recognition_complete(request_id: RequestId, cause: CompletionCause) -> Self {
        Self {
            kind: EventKind::RecognitionComplete,
            request_id,
            request_state: RequestState::Complete,
            completion_cause: Some(cause),
            content_type: None,
            body: None,
        }
    }

    /// Attaches an NLSML result body to the event.
    pub fn with_result_body(mut self, body: String) -> Self {
        self.content_type = Some(defaults::NLSML_CONTENT_TYPE.to_string());
        self.body = Some(body);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Success.as_u16(), 200);
        assert_eq!(StatusCode::MethodNotValidInState.as_u16(), 402);
        assert_eq!(StatusCode::MissingParam.as_u16(), 406);
        assert_eq!(StatusCode::MethodFailed.as_u16(), 407);
        assert_eq!(StatusCode::UnsupportedParamValue.as_u16(), 409);
    }

    #[test]
    fn test_completion_cause_codes_and_names() {
        assert_eq!(CompletionCause::Success.code(), 0);
        assert_eq!(CompletionCause::NoMatch.code(), 1);
        assert_eq!(CompletionCause::NoInputTimeout.code(), 2);
        assert_eq!(CompletionCause::RecognitionTimeout.code(), 3);
        assert_eq!(CompletionCause::NoInputTimeout.name(), "no-input-timeout");
    }

    #[test]
    fn test_response_for_request_defaults() {
        let request = Request::new(7, Method::GetParams);
        let response = Response::for_request(&request);
        assert_eq!(response.request_id, RequestId(7));
        assert_eq!(response.method, Method::GetParams);
        assert_eq!(response.status, StatusCode::Success);
        assert_eq!(response.request_state, RequestState::Complete);
    }

    #[test]
    fn test_recognize_response_in_progress() {
        let request = Request::new(3, Method::Recognize);
        let response = Response::for_request(&request).in_progress();
        assert_eq!(response.request_state, RequestState::InProgress);
    }

    #[test]
    fn test_start_of_input_event_state() {
        let event = Event::start_of_input(RequestId(4));
        assert_eq!(event.request_state, RequestState::InProgress);
        assert_eq!(event.completion_cause, None);
        assert_eq!(event.body, None);
    }

    #[test]
    fn test_recognition_complete_event_with_body() {
        let event = Event::recognition_complete(RequestId(4), CompletionCause::Success)
            .with_result_body("<result/>".to_string());
        assert_eq!(event.request_state, RequestState::Complete);
        assert_eq!(event.completion_cause, Some(CompletionCause::Success));
        assert_eq!(event.content_type.as_deref(), Some("application/x-nlsml"));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::DefineGrammar.name(), "DEFINE-GRAMMAR");
        assert_eq!(Method::StartInputTimers.name(), "START-INPUT-TIMERS");
    }
}
