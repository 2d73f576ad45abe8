//! The recognition worker thread.
//!
//! Owns the channel's protocol state: the grammar registry, the active
//! grammar id, the in-progress RECOGNIZE request and the deferred STOP
//! response. Wakes on the mailbox, drains it, dispatches exactly one
//! response per request and processes audio-raised completions in order.

use super::ChannelInner;
use super::grammar::GrammarRegistry;
use crate::defaults;
use crate::error::{RecogError, Result};
use crate::protocol::nlsml;
use crate::protocol::{CompletionCause, Event, Method, Request, Response, StatusCode};
use crate::stt::decoder::DecoderFactory;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub(crate) struct Worker {
    inner: Arc<ChannelInner>,
    registry: GrammarRegistry,
    factory: Arc<dyn DecoderFactory>,
    /// Content-id of the grammar the decoder is currently loaded with.
    active_grammar: Option<String>,
    /// The single in-progress RECOGNIZE request, if any.
    in_progress: Option<Request>,
    /// Deferred STOP response, released when the recognition completes.
    stop_response: Option<Response>,
}

impl Worker {
    pub(crate) fn new(
        inner: Arc<ChannelInner>,
        registry: GrammarRegistry,
        factory: Arc<dyn DecoderFactory>,
    ) -> Self {
        Self {
            inner,
            registry,
            factory,
            active_grammar: None,
            in_progress: None,
            stop_response: None,
        }
    }

    /// The worker thread body: acknowledge open, run the wait loop until
    /// close, drain any in-progress recognition, release resources.
    pub(crate) fn run(mut self) {
        info!(channel = %self.inner.id, "run recognition thread");

        let ready = self.registry.prepare();
        if let Err(err) = &ready {
            warn!(channel = %self.inner.id, error = %err, "failed to prepare grammar directory");
        }
        self.inner.sink.channel_opened(ready.is_ok());
        if ready.is_err() {
            return;
        }

        loop {
            let wakeup = self.inner.mailbox.wait();
            if let Some(request) = wakeup.request {
                self.dispatch(request);
            }
            if let Some(cause) = wakeup.completion {
                self.complete(cause);
            }
            if wakeup.close_requested {
                break;
            }
        }

        if let Some(request) = &self.in_progress {
            // Recognition still active: synthesize a deferred STOP and wait
            // once more for the media thread to raise the final completion.
            debug!(channel = %self.inner.id, "close requested with recognition in progress");
            if self.stop_response.is_none() {
                self.stop_response = Some(Response::for_request(request));
            }
            self.inner.mailbox.set_stop_pending(true);
            let cause = self.inner.mailbox.wait_completion();
            self.complete(cause);
        }

        self.registry.clear();
        {
            let mut media = self.inner.media();
            if media.decoder.take().is_some() {
                info!(channel = %self.inner.id, "free decoder");
            }
        }
        info!(channel = %self.inner.id, "exit recognition thread");
    }

    fn dispatch(&mut self, request: Request) {
        info!(channel = %self.inner.id, method = %request.method, "dispatch request");
        let response = Response::for_request(&request);
        match request.method {
            Method::DefineGrammar => self.define_grammar(request, response),
            Method::Recognize => self.recognize(request, response),
            Method::Stop => self.stop(response),
            // Parameter and timer handling is delegated to the signaling
            // stack's header machinery; the channel just acknowledges.
            Method::SetParams
            | Method::GetParams
            | Method::GetResult
            | Method::StartInputTimers => self.send_response(response),
        }
    }

    fn define_grammar(&mut self, request: Request, response: Response) {
        let response = match self.try_define_grammar(&request) {
            Ok(()) => response,
            Err(err) => {
                warn!(channel = %self.inner.id, error = %err, "DEFINE-GRAMMAR failed");
                response.with_status(status_for(&err))
            }
        };
        self.send_response(response);
    }

    fn try_define_grammar(&mut self, request: &Request) -> Result<()> {
        let content_id = request
            .content_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(RecogError::MissingParameter { name: "content-id" })?;

        let Some(grammar) = request.body.as_deref() else {
            // No grammar body: unload.
            self.registry.remove(content_id);
            return Ok(());
        };

        let content_type = request
            .content_type
            .as_deref()
            .ok_or(RecogError::MissingParameter {
                name: "content-type",
            })?;
        if !nlsml::is_supported_grammar_type(content_type) {
            return Err(RecogError::UnsupportedContentType {
                content_type: content_type.to_string(),
            });
        }

        let path = self.registry.store(content_id, grammar)?;
        if let Err(err) = self.init_decoder(&path) {
            // Roll back the just-written artifact.
            self.registry.remove(content_id);
            return Err(err);
        }
        self.active_grammar = Some(content_id.to_string());
        Ok(())
    }

    fn init_decoder(&mut self, grammar: &Path) -> Result<()> {
        let mut media = self.inner.media();
        match media.decoder.as_mut() {
            Some(decoder) => {
                info!(channel = %self.inner.id, "reinit decoder");
                decoder.init_grammar(grammar)
            }
            None => {
                info!(channel = %self.inner.id, "init decoder");
                let decoder = self.factory.create_decoder(grammar)?;
                media.decoder = Some(decoder);
                Ok(())
            }
        }
    }

    fn recognize(&mut self, request: Request, response: Response) {
        if self.in_progress.is_some() {
            warn!(channel = %self.inner.id, "RECOGNIZE while another is in progress");
            self.send_response(response.with_status(StatusCode::MethodNotValidInState));
            return;
        }

        let started = {
            let mut media = self.inner.media();
            let started = match media.decoder.as_mut() {
                None => Err(RecogError::engine("no grammar defined")),
                Some(decoder) => decoder.start_utterance(),
            };
            if started.is_ok() {
                media.detector.reset();
                media.recognition_elapsed_ms = 0;
                media.partial_elapsed_ms = 0;
                media.last_result = None;
            }
            started
        };

        match started {
            Err(err) => {
                warn!(channel = %self.inner.id, error = %err, "failed to start utterance");
                self.send_response(response.with_status(StatusCode::MethodFailed));
            }
            Ok(()) => {
                // The terminal outcome is asynchronous; only the
                // in-progress response goes out now.
                self.send_response(response.in_progress());
                self.inner.mailbox.begin_recognition(request.id);
                self.in_progress = Some(request);
            }
        }
    }

    fn stop(&mut self, response: Response) {
        if self.in_progress.is_some() {
            // Not answered now: stored and released at completion, which
            // it then supersedes.
            debug!(channel = %self.inner.id, "defer STOP response until recognition completes");
            self.stop_response = Some(response);
            self.inner.mailbox.set_stop_pending(true);
            return;
        }
        self.send_response(response);
    }

    /// Completion handling: finalize the utterance and emit either the
    /// deferred STOP response or the RECOGNITION-COMPLETE event.
    fn complete(&mut self, cause: CompletionCause) {
        let Some(request) = self.in_progress.take() else {
            debug!(channel = %self.inner.id, "ignoring completion with no recognition in progress");
            return;
        };
        self.inner.mailbox.end_recognition();

        let hypothesis = {
            let mut media = self.inner.media();
            match media.decoder.as_mut() {
                Some(decoder) => {
                    if let Err(err) = decoder.end_utterance() {
                        warn!(channel = %self.inner.id, error = %err, "failed to end utterance");
                    }
                    decoder.hypothesis()
                }
                None => None,
            }
        };

        if let Some(response) = self.stop_response.take() {
            // Recognition has been stopped; the STOP response supersedes
            // the completion event.
            self.inner.mailbox.set_stop_pending(false);
            if self.inner.mailbox.close_requested() {
                debug!(channel = %self.inner.id, "dropping STOP response on closing channel");
            } else {
                self.send_response(response);
            }
            return;
        }

        let mut event = Event::recognition_complete(request.id, cause);
        if cause == CompletionCause::Success {
            match hypothesis.filter(|h| !h.text.is_empty()) {
                Some(hypothesis) => {
                    info!(
                        channel = %self.inner.id,
                        text = %hypothesis.text,
                        score = hypothesis.score,
                        "final recognition result"
                    );
                    let grammar = self.active_grammar.as_deref().unwrap_or("");
                    event = event.with_result_body(nlsml::result_document(
                        grammar,
                        defaults::RESULT_CONFIDENCE,
                        &hypothesis.text,
                    ));
                    let mut media = self.inner.media();
                    media.last_result = Some(hypothesis.text);
                }
                None => {
                    event.completion_cause = Some(CompletionCause::NoMatch);
                }
            }
        }
        self.inner.sink.deliver_event(event);
    }

    fn send_response(&self, response: Response) {
        debug!(
            channel = %self.inner.id,
            request = %response.request_id,
            status = response.status.as_u16(),
            "send response"
        );
        self.inner.sink.deliver_response(response);
    }
}

fn status_for(err: &RecogError) -> StatusCode {
    match err {
        RecogError::MissingParameter { .. } => StatusCode::MissingParam,
        RecogError::UnsupportedContentType { .. } => StatusCode::UnsupportedParamValue,
        _ => StatusCode::MethodFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&RecogError::MissingParameter { name: "content-id" }),
            StatusCode::MissingParam
        );
        assert_eq!(
            status_for(&RecogError::UnsupportedContentType {
                content_type: "text/plain".into()
            }),
            StatusCode::UnsupportedParamValue
        );
        assert_eq!(
            status_for(&RecogError::engine("boom")),
            StatusCode::MethodFailed
        );
    }
}
