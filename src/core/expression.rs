//! Earth Engine expression graphs
//!
//! Remote computations are described declaratively. A [`Node`] tree is built
//! locally with the helpers in this module and lowered to the REST wire form
//! ([`Expression`]) right before it is sent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// In-memory expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(Value),
    Array(Vec<Node>),
    Dictionary(BTreeMap<String, Node>),
    Invocation {
        function: String,
        arguments: BTreeMap<String, Node>,
    },
    /// Anonymous function, used as the body of `Collection.map`
    Function {
        parameters: Vec<String>,
        body: Box<Node>,
    },
    /// Reference to a parameter of the enclosing [`Node::Function`]
    Argument(String),
}

impl Node {
    pub fn constant(value: impl Into<Value>) -> Self {
        Node::Constant(value.into())
    }

    pub fn string(value: &str) -> Self {
        Node::Constant(Value::String(value.to_string()))
    }

    pub fn strings<S: AsRef<str>>(values: &[S]) -> Self {
        Node::Array(values.iter().map(|s| Node::string(s.as_ref())).collect())
    }

    pub fn invoke<I, K>(function: &str, arguments: I) -> Self
    where
        I: IntoIterator<Item = (K, Node)>,
        K: Into<String>,
    {
        Node::Invocation {
            function: function.to_string(),
            arguments: arguments.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn function(parameter: &str, body: Node) -> Self {
        Node::Function {
            parameters: vec![parameter.to_string()],
            body: Box::new(body),
        }
    }

    pub fn argument(name: &str) -> Self {
        Node::Argument(name.to_string())
    }

    /// Name of the invoked function, if this node is an invocation
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Node::Invocation { function, .. } => Some(function),
            _ => None,
        }
    }

    /// Argument of an invocation node
    pub fn arg(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Invocation { arguments, .. } => arguments.get(name),
            _ => None,
        }
    }
}

/// Wire form of a single value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueNode {
    ConstantValue(Value),
    ArrayValue(ArrayValue),
    DictionaryValue(DictionaryValue),
    FunctionInvocationValue(FunctionInvocationValue),
    FunctionDefinitionValue(FunctionDefinitionValue),
    ArgumentReference(String),
    ValueReference(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Vec<ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryValue {
    pub values: BTreeMap<String, ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocationValue {
    pub function_name: String,
    pub arguments: BTreeMap<String, ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinitionValue {
    pub argument_names: Vec<String>,
    /// Key of the body in [`Expression::values`]
    pub body: String,
}

/// Complete expression as accepted by `value:compute` and `maps.create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub result: String,
    pub values: BTreeMap<String, ValueNode>,
}

impl Expression {
    /// Lower a tree into the wire form. Function bodies are hoisted into the
    /// value table; the root is stored last.
    pub fn from_node(root: &Node) -> Self {
        let mut lowering = Lowering::default();
        let value = lowering.lower(root);
        let result = lowering.insert(value);
        Expression {
            result,
            values: lowering.values,
        }
    }
}

impl From<&Node> for Expression {
    fn from(node: &Node) -> Self {
        Expression::from_node(node)
    }
}

#[derive(Default)]
struct Lowering {
    values: BTreeMap<String, ValueNode>,
    next_id: usize,
}

impl Lowering {
    fn insert(&mut self, value: ValueNode) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        self.values.insert(id.clone(), value);
        id
    }

    fn lower(&mut self, node: &Node) -> ValueNode {
        match node {
            Node::Constant(value) => ValueNode::ConstantValue(value.clone()),
            Node::Array(items) => ValueNode::ArrayValue(ArrayValue {
                values: items.iter().map(|item| self.lower(item)).collect(),
            }),
            Node::Dictionary(entries) => ValueNode::DictionaryValue(DictionaryValue {
                values: entries
                    .iter()
                    .map(|(k, v)| (k.clone(), self.lower(v)))
                    .collect(),
            }),
            Node::Invocation { function, arguments } => {
                ValueNode::FunctionInvocationValue(FunctionInvocationValue {
                    function_name: function.clone(),
                    arguments: arguments
                        .iter()
                        .map(|(k, v)| (k.clone(), self.lower(v)))
                        .collect(),
                })
            }
            Node::Function { parameters, body } => {
                let body = self.lower(body);
                let body_id = self.insert(body);
                ValueNode::FunctionDefinitionValue(FunctionDefinitionValue {
                    argument_names: parameters.clone(),
                    body: body_id,
                })
            }
            Node::Argument(name) => ValueNode::ArgumentReference(name.clone()),
        }
    }
}
