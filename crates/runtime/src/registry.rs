//! Tool registry: named tools with descriptors, input validation, and
//! handlers.
//!
//! Every entry pairs the [`Tool`] descriptor advertised to the model with
//! an [`Input`] shape and an [`Invocation`]. Arguments are validated
//! against the shape before any handler runs, so handlers only ever see
//! well-formed input.

use compact_str::CompactString;
use futures_util::future::BoxFuture;
use sbcore::{Error, Result, model::Tool};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::{collections::BTreeMap, future::Future, sync::Arc};

/// A type-erased async tool handler.
///
/// Receives validated input: a JSON string for [`Input::Text`] tools, a
/// JSON object for [`Input::Fields`] tools.
pub type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync>;

/// What happens when a tool is called.
#[derive(Clone)]
pub enum Invocation {
    /// Run a handler and report its output.
    Handler(Handler),
    /// Hand the turn to the named specialist (generalist only).
    Switch,
    /// Hand the turn back to the generalist (specialists only).
    Escalate,
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Invocation::Handler(_) => f.write_str("Handler(..)"),
            Invocation::Switch => f.write_str("Switch"),
            Invocation::Escalate => f.write_str("Escalate"),
        }
    }
}

/// Primitive type of a structured input field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Kind::String => value.is_string(),
            Kind::Integer => value.is_i64() || value.is_u64(),
            Kind::Number => value.is_number(),
            Kind::Boolean => value.is_boolean(),
        }
    }
}

/// One named field of a structured input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: CompactString,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub kind: Kind,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl Field {
    /// A required field of the given kind.
    pub fn new(name: impl Into<CompactString>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            required: true,
        }
    }

    /// A required string field.
    pub fn string(name: impl Into<CompactString>) -> Self {
        Self::new(name, Kind::String)
    }

    /// Describe the field for the model.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the field optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Input shape a tool accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A single free-form text input.
    Text,
    /// A fixed set of typed fields.
    Fields(Vec<Field>),
}

/// Free-form text input schema.
#[derive(schemars::JsonSchema, Deserialize)]
#[allow(dead_code)]
struct TextInput {
    /// The free-form input for this tool.
    input: String,
}

impl Input {
    /// JSON schema advertised to the model.
    pub fn schema(&self) -> schemars::Schema {
        match self {
            Input::Text => schemars::schema_for!(TextInput),
            Input::Fields(fields) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in fields {
                    let mut property = Map::new();
                    property.insert("type".into(), json!(field.kind.as_str()));
                    if !field.description.is_empty() {
                        property.insert("description".into(), json!(field.description));
                    }
                    properties.insert(field.name.to_string(), Value::Object(property));
                    if field.required {
                        required.push(json!(field.name));
                    }
                }

                let mut schema = Map::new();
                schema.insert("type".into(), json!("object"));
                schema.insert("properties".into(), Value::Object(properties));
                schema.insert("required".into(), Value::Array(required));
                schema.insert("additionalProperties".into(), json!(false));
                schemars::Schema::from(schema)
            }
        }
    }

    /// Validate raw call arguments, returning the input handed to the
    /// handler.
    ///
    /// Text tools accept `{"input": "..."}`, a bare JSON string, or raw
    /// text. Field tools require a JSON object (empty arguments count as
    /// `{}`), reject unknown fields, and check required fields and types.
    pub fn parse(&self, arguments: &str) -> std::result::Result<Value, String> {
        match self {
            Input::Text => parse_text(arguments),
            Input::Fields(fields) => parse_fields(fields, arguments),
        }
    }
}

fn parse_text(arguments: &str) -> std::result::Result<Value, String> {
    match serde_json::from_str::<Value>(arguments) {
        Ok(Value::String(text)) => Ok(Value::String(text)),
        Ok(Value::Object(object)) => match object.get("input") {
            Some(Value::String(text)) => Ok(Value::String(text.clone())),
            Some(_) => Err("field `input` must be a string".into()),
            None => Err("missing field `input`".into()),
        },
        _ if arguments.trim().is_empty() => Err("missing input".into()),
        _ => Ok(Value::String(arguments.to_owned())),
    }
}

fn parse_fields(fields: &[Field], arguments: &str) -> std::result::Result<Value, String> {
    let arguments = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    let object = match serde_json::from_str::<Value>(arguments) {
        Ok(Value::Object(object)) => object,
        Ok(_) => return Err("arguments must be a JSON object".into()),
        Err(e) => return Err(format!("arguments are not valid JSON: {e}")),
    };

    if let Some(unknown) = object
        .keys()
        .find(|key| !fields.iter().any(|f| f.name == key.as_str()))
    {
        return Err(format!("unknown field `{unknown}`"));
    }

    for field in fields {
        match object.get(field.name.as_str()) {
            None | Some(Value::Null) if field.required => {
                return Err(format!("missing field `{}`", field.name));
            }
            Some(value) if !value.is_null() && !field.kind.accepts(value) => {
                return Err(format!(
                    "field `{}` must be of type {}",
                    field.name,
                    field.kind.as_str()
                ));
            }
            _ => {}
        }
    }

    Ok(Value::Object(object))
}

/// A registered tool.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Descriptor advertised to the model.
    pub tool: Tool,
    /// Accepted input shape.
    pub input: Input,
    /// What a call does.
    pub invocation: Invocation,
}

impl Entry {
    /// A tool taking free-form text.
    pub fn text<F, Fut>(
        name: impl Into<CompactString>,
        description: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |input: Value| -> BoxFuture<'static, _> {
            let text = match input {
                Value::String(text) => text,
                other => other.to_string(),
            };
            Box::pin(handler(text))
        });
        Self::new(name, description, Input::Text, Invocation::Handler(handler))
    }

    /// A tool taking typed fields. The handler receives the validated
    /// JSON object.
    pub fn fields<F, Fut>(
        name: impl Into<CompactString>,
        description: impl Into<String>,
        fields: Vec<Field>,
        handler: F,
    ) -> Self
    where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |input: Value| -> BoxFuture<'static, _> {
            let object = match input {
                Value::Object(object) => object,
                _ => Map::new(),
            };
            Box::pin(handler(object))
        });
        Self::new(
            name,
            description,
            Input::Fields(fields),
            Invocation::Handler(handler),
        )
    }

    /// Build an entry from its parts.
    pub fn new(
        name: impl Into<CompactString>,
        description: impl Into<String>,
        input: Input,
        invocation: Invocation,
    ) -> Self {
        Self {
            tool: Tool {
                name: name.into(),
                description: description.into(),
                parameters: input.schema(),
                strict: false,
            },
            input,
            invocation,
        }
    }

    /// The tool name.
    pub fn name(&self) -> &str {
        &self.tool.name
    }

    /// Validate raw call arguments against this tool's input shape.
    pub fn parse(&self, arguments: &str) -> Result<Value> {
        self.input
            .parse(arguments)
            .map_err(|reason| Error::InvalidInput {
                tool: self.tool.name.clone(),
                reason,
            })
    }

    /// Run this tool's handler on already validated input.
    ///
    /// Control-transfer tools are owned by the dispatcher and refused
    /// here.
    pub async fn call(&self, input: Value) -> Result<String> {
        match &self.invocation {
            Invocation::Handler(handler) => handler(input).await.map_err(|e| Error::Tool {
                tool: self.tool.name.clone(),
                message: format!("{e:#}"),
            }),
            Invocation::Switch | Invocation::Escalate => Err(Error::TransferRefused(format!(
                "`{}` can only be called by an agent",
                self.tool.name
            ))),
        }
    }
}

/// A name-indexed set of tools, advertised in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: BTreeMap<CompactString, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names are unique within a registry.
    pub fn register(&mut self, entry: Entry) -> Result<()> {
        let name = entry.tool.name.clone();
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateToolName(name));
        }
        self.index.insert(name, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn resolve(&self, name: &str) -> Result<&Entry> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| Error::UnknownTool(name.into()))
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors of all tools, in registration order.
    pub fn descriptors(&self) -> Vec<Tool> {
        self.entries.iter().map(|e| e.tool.clone()).collect()
    }

    /// Tool names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A new registry holding only the named tools, in the given order.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut subset = Self::new();
        for name in names {
            subset.register(self.resolve(name.as_ref())?.clone())?;
        }
        Ok(subset)
    }

    /// Validate arguments and run the named tool, as [`Entry::call`].
    pub async fn invoke(&self, name: &str, arguments: &str) -> Result<String> {
        let entry = self.resolve(name)?;
        entry.call(entry.parse(arguments)?).await
    }
}
