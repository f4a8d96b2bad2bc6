//! The dispatcher: owns every agent, tracks which one holds control, and
//! runs turns.
//!
//! A turn starts on the active agent. Its model rounds may call tools,
//! including the two control-transfer pseudo-tools, each of which runs a
//! nested turn on another agent and feeds that agent's reply back as the
//! tool result. Every history commit and the resulting active-agent change
//! are staged in a per-turn [`Ledger`] and applied only when the outermost
//! turn finishes, so a failed or cancelled turn leaves the dispatcher
//! untouched.

use crate::{
    agent::{Agent, Turn},
    registry::{Entry, Invocation, ToolRegistry},
    transfer::{self, Domain, Escalate, MAX_TRANSFER_DEPTH, Switch},
};
use compact_str::CompactString;
use futures_util::future::BoxFuture;
use sbcore::{
    Error, Result, Tier,
    model::{Action, Message, Model, Request, Response, ToolCall},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::{collections::BTreeMap, time::Duration};
use tokio::time::timeout;

/// Reply sent to the user when a turn fails.
pub const APOLOGY: &str = "Sorry, I could not complete that request.";

/// Reply committed when an agent keeps producing unusable output.
pub const DEGRADED_REPLY: &str = "I could not complete that request.";

const FORMAT_CORRECTION: &str = "Your previous response was empty or malformed. \
     Reply to the user in plain text, or call one of the available tools.";

/// Dispatcher limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Model rounds an agent may spend on one turn.
    pub max_iterations: usize,
    /// Seconds to wait for one completion.
    pub completion_timeout_secs: u64,
    /// Seconds to wait for one tool call.
    pub tool_timeout_secs: u64,
    /// Sampling temperature sent with every request.
    pub temperature: Option<f32>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            completion_timeout_secs: 60,
            tool_timeout_secs: 30,
            temperature: Some(0.0),
        }
    }
}

impl DispatchConfig {
    fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

/// Builds a [`Dispatcher`] from a tool catalog and agent configs.
pub struct Builder<M: Model> {
    model: M,
    config: DispatchConfig,
    catalog: ToolRegistry,
    generalist: Option<sbcore::Agent>,
    specialists: Vec<sbcore::Agent>,
}

impl<M: Model> Builder<M> {
    /// Shared catalog agents pick their tools from.
    pub fn catalog(mut self, catalog: ToolRegistry) -> Self {
        self.catalog = catalog;
        self
    }

    /// Dispatcher limits.
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// The session's entry agent. Replaces any previous generalist.
    pub fn generalist(mut self, agent: sbcore::Agent) -> Self {
        self.generalist = Some(agent);
        self
    }

    /// Add a domain specialist. Its name is its domain.
    pub fn specialist(mut self, agent: sbcore::Agent) -> Self {
        self.specialists.push(agent);
        self
    }

    /// Resolve every agent's tools and hand out the transfer tools.
    pub fn build(self) -> Result<Dispatcher<M>> {
        let generalist = self.generalist.ok_or(Error::MissingGeneralist)?;
        if self.config.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_iterations must be at least 1".into(),
            ));
        }
        let domains: Vec<Domain> = self
            .specialists
            .iter()
            .map(|s| Domain {
                name: s.name.clone(),
                description: s.description.clone(),
            })
            .collect();

        let mut agents = BTreeMap::new();
        let mut tools = self.catalog.subset(generalist.tools.as_slice())?;
        if !domains.is_empty() {
            tools.register(transfer::switch_tool(&domains))?;
        }
        let name = generalist.name.clone();
        agents.insert(name.clone(), Agent::new(generalist, Tier::Generalist, tools));

        let mut specialists = Vec::with_capacity(self.specialists.len());
        for config in self.specialists {
            if agents.contains_key(&config.name) {
                return Err(Error::DuplicateAgent(config.name));
            }
            specialists.push(config.name.clone());
            let mut tools = self.catalog.subset(config.tools.as_slice())?;
            tools.register(transfer::escalate_tool())?;
            agents.insert(
                config.name.clone(),
                Agent::new(config, Tier::Specialist, tools),
            );
        }

        tracing::debug!(
            generalist = %name,
            specialists = agents.len() - 1,
            "dispatcher built"
        );
        Ok(Dispatcher {
            model: self.model,
            config: self.config,
            agents,
            specialists,
            active: name.clone(),
            generalist: name,
        })
    }
}

/// Routes each utterance to the agent holding control.
pub struct Dispatcher<M: Model> {
    model: M,
    config: DispatchConfig,
    agents: BTreeMap<CompactString, Agent>,
    generalist: CompactString,
    /// Specialist names in declaration order.
    specialists: Vec<CompactString>,
    active: CompactString,
}

impl<M: Model> Dispatcher<M> {
    /// Start building a dispatcher over the given model.
    pub fn builder(model: M) -> Builder<M> {
        Builder {
            model,
            config: DispatchConfig::default(),
            catalog: ToolRegistry::new(),
            generalist: None,
            specialists: Vec::new(),
        }
    }

    /// Name of the agent holding control.
    pub fn active(&self) -> &str {
        &self.active
    }

    /// The generalist.
    pub fn generalist(&self) -> &Agent {
        &self.agents[self.generalist.as_str()]
    }

    /// Look up an agent by name.
    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.get(name)
    }

    /// All agents, generalist first, then specialists in declaration order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        std::iter::once(self.generalist()).chain(
            self.specialists
                .iter()
                .filter_map(|name| self.agents.get(name.as_str())),
        )
    }

    /// Dispatcher limits in effect.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Handle one utterance and return the reply for the user.
    ///
    /// Turn-fatal errors are logged and answered with [`APOLOGY`].
    pub async fn handle(&mut self, utterance: &str) -> String {
        match self.turn(utterance).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(agent = %self.active, "turn failed: {e}");
                APOLOGY.to_owned()
            }
        }
    }

    /// Run one turn on the active agent.
    ///
    /// Histories and the active agent change only if this returns `Ok`.
    pub async fn turn(&mut self, utterance: &str) -> Result<String> {
        let mut ledger = Ledger::new(self.active.clone());
        let active = self.active.clone();
        let reply = self.advance(&active, utterance.to_owned(), &mut ledger).await?;
        self.commit(ledger);
        Ok(reply)
    }

    fn commit(&mut self, ledger: Ledger) {
        for (name, turn) in ledger.commits {
            if let Some(agent) = self.agents.get_mut(&name) {
                agent.commit(turn);
            }
        }
        if ledger.active != self.active {
            tracing::info!(from = %self.active, to = %ledger.active, "control transferred");
            self.active = ledger.active;
        }
    }

    fn advance<'a>(
        &'a self,
        name: &'a str,
        utterance: String,
        ledger: &'a mut Ledger,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let agent = self
                .agents
                .get(name)
                .ok_or_else(|| Error::UnknownAgent(name.into()))?;
            ledger.chain.push(agent.name().clone());
            let result = self.run(agent, utterance, ledger).await;
            ledger.chain.pop();
            result
        })
    }

    async fn run(&self, agent: &Agent, utterance: String, ledger: &mut Ledger) -> Result<String> {
        let name = agent.name();
        let mut request = agent.request(&self.model.active_model());
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        request.messages = agent.context(&utterance);

        // The single correction round is not charged to `max_iterations`.
        let mut corrected = false;
        let mut round = 0;
        while round < self.config.max_iterations {
            let response = self.complete(&request).await?;
            match response.action() {
                Action::Reply(reply) => {
                    tracing::debug!(agent = %name, round, "agent replied");
                    ledger.stage(
                        name,
                        Turn {
                            user: utterance,
                            reply: reply.clone(),
                        },
                    );
                    return Ok(reply);
                }
                Action::Malformed(reason) => {
                    let error = Error::MalformedAgentOutput(reason);
                    if corrected {
                        tracing::warn!(agent = %name, "{error}, giving up");
                        ledger.stage(
                            name,
                            Turn {
                                user: utterance,
                                reply: DEGRADED_REPLY.into(),
                            },
                        );
                        return Ok(DEGRADED_REPLY.into());
                    }
                    tracing::warn!(agent = %name, "{error}, asking for a correction");
                    corrected = true;
                    request.messages.push(Message::user(FORMAT_CORRECTION));
                    continue;
                }
                Action::Invoke(calls) => {
                    tracing::debug!(agent = %name, round, calls = calls.len(), "tool round");
                    request.messages.extend(response.message());
                    for call in &calls {
                        let output = self.call(agent, call, ledger).await?;
                        request.messages.push(Message::tool(output, call.id.clone()));
                    }
                }
            }
            round += 1;
        }

        Err(Error::ToolLoopExceeded {
            agent: name.clone(),
            limit: self.config.max_iterations,
        })
    }

    async fn complete(&self, request: &Request) -> Result<Response> {
        let limit = self.config.completion_timeout();
        match timeout(limit, self.model.send(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(Error::CompletionUnavailable(format!("{e:#}"))),
            Err(_) => Err(Error::CompletionUnavailable(format!(
                "no response within {}s",
                limit.as_secs()
            ))),
        }
    }

    /// Run one tool call, turning recoverable failures into observations.
    async fn call(&self, agent: &Agent, call: &ToolCall, ledger: &mut Ledger) -> Result<String> {
        let tool = call.function.name.as_str();
        let outcome = match agent.tools().resolve(tool) {
            Ok(entry) => match entry.parse(&call.function.arguments) {
                Ok(input) => self.invoke(agent, entry, input, ledger).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(output) => Ok(output),
            Err(e) if e.is_turn_fatal() => Err(e),
            Err(e) => {
                tracing::warn!(agent = %agent.name(), tool, "{e}");
                Ok(format!("error: {e}"))
            }
        }
    }

    async fn invoke(
        &self,
        agent: &Agent,
        entry: &Entry,
        input: Value,
        ledger: &mut Ledger,
    ) -> Result<String> {
        match &entry.invocation {
            Invocation::Handler(_) => {
                tracing::info!(agent = %agent.name(), tool = %entry.name(), %input, "calling tool");
                let limit = self.config.tool_timeout();
                match timeout(limit, entry.call(input)).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Tool {
                        tool: entry.tool.name.clone(),
                        message: format!("timed out after {}s", limit.as_secs()),
                    }),
                }
            }
            Invocation::Switch => {
                if agent.tier() != Tier::Generalist {
                    return Err(Error::TransferRefused(
                        "only the generalist can switch domains".into(),
                    ));
                }
                let Switch { domain, summary } = Switch::from_input(input)?;
                match self.agents.get(domain.as_str()) {
                    Some(target) if target.tier() == Tier::Specialist => {
                        self.transfer(agent, target.name(), summary, ledger).await
                    }
                    _ => Err(Error::UnknownDomain(domain)),
                }
            }
            Invocation::Escalate => {
                if agent.tier() != Tier::Specialist {
                    return Err(Error::TransferRefused(
                        "only specialists can escalate".into(),
                    ));
                }
                let Escalate { summary } = Escalate::from_input(input)?;
                self.transfer(agent, &self.generalist, summary, ledger).await
            }
        }
    }

    async fn transfer(
        &self,
        from: &Agent,
        to: &CompactString,
        summary: String,
        ledger: &mut Ledger,
    ) -> Result<String> {
        if ledger.depth() >= MAX_TRANSFER_DEPTH {
            return Err(Error::TransferRefused(format!(
                "transfer depth limit of {MAX_TRANSFER_DEPTH} reached"
            )));
        }

        tracing::info!(from = %from.name(), to = %to, %summary, "transferring");
        let previous = std::mem::replace(&mut ledger.active, to.clone());
        let result = self.advance(to, summary, ledger).await;
        if result.is_err() {
            ledger.active = previous;
        }
        result
    }
}

/// Changes staged by one turn, applied on success.
#[derive(Debug)]
struct Ledger {
    /// Agent that will hold control after the turn.
    active: CompactString,
    /// Agents currently running, outermost first.
    chain: SmallVec<[CompactString; 4]>,
    /// Turns to append, in completion order.
    commits: Vec<(CompactString, Turn)>,
}

impl Ledger {
    fn new(active: CompactString) -> Self {
        Self {
            active,
            chain: SmallVec::new(),
            commits: Vec::new(),
        }
    }

    /// Transfers taken to reach the innermost running agent.
    fn depth(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    fn stage(&mut self, agent: &CompactString, turn: Turn) {
        self.commits.push((agent.clone(), turn));
    }
}
