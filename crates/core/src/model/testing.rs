//! Scripted model for tests.
//!
//! [`Script`] replays queued [`Step`]s in call order and records every
//! request it receives. Dispatcher turns are strictly sequential, so one
//! queue shared by all agents is enough to script multi-agent scenarios.

use crate::model::{Model, Request, Response, ToolCall};
use anyhow::Result;
use compact_str::CompactString;
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc};

/// One scripted model outcome.
#[derive(Debug, Clone)]
pub enum Step {
    /// Return this response.
    Respond(Response),
    /// Fail the call with a transport-style error.
    Fail(String),
    /// Never complete (exercises timeouts and cancellation).
    Hang,
}

#[derive(Default)]
struct State {
    queue: VecDeque<Step>,
    fallback: Option<Step>,
    requests: Vec<Request>,
}

/// A model that replays scripted steps.
#[derive(Clone, Default)]
pub struct Script {
    state: Arc<Mutex<State>>,
}

impl Script {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a final text reply.
    pub fn reply(self, content: impl Into<String>) -> Self {
        self.step(Step::Respond(Response::text(content)))
    }

    /// Queue a single tool call.
    pub fn call(self, name: &str, arguments: impl Into<String>) -> Self {
        let id = format!("call_{}", self.state.lock().queue.len());
        self.step(Step::Respond(Response::calls(vec![ToolCall::new(
            id, name, arguments,
        )])))
    }

    /// Queue an arbitrary step.
    pub fn step(self, step: Step) -> Self {
        self.state.lock().queue.push_back(step);
        self
    }

    /// Step replayed whenever the queue is empty.
    pub fn repeat(self, step: Step) -> Self {
        self.state.lock().fallback = Some(step);
        self
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().requests.clone()
    }

    /// Number of requests received so far.
    pub fn calls_made(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Number of queued steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.state.lock().queue.len()
    }

    fn next(&self, request: &Request) -> Option<Step> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());
        state.queue.pop_front().or_else(|| state.fallback.clone())
    }
}

impl Model for Script {
    async fn send(&self, request: &Request) -> Result<Response> {
        match self.next(request) {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Fail(reason)) => Err(anyhow::anyhow!(reason)),
            Some(Step::Hang) => std::future::pending().await,
            None => Err(anyhow::anyhow!("script exhausted")),
        }
    }

    fn active_model(&self) -> CompactString {
        CompactString::new("script")
    }
}
