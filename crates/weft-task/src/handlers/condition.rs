use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::handler::NodeHandler;
use crate::types::{TaskContext, value_text};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConditionConfig {
  #[serde(default)]
  condition_type: Option<String>,
  /// Threshold or needle. Numbers are accepted and read as their JSON text.
  #[serde(default)]
  condition: Value,
  #[serde(default)]
  operator: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
  Gt,
  Ge,
  Lt,
  Le,
  Eq,
  Ne,
}

/// Longer symbols first so `>=` is not read as `>`.
const OPERATORS: [(&str, Comparison); 6] = [
  (">=", Comparison::Ge),
  ("<=", Comparison::Le),
  ("==", Comparison::Eq),
  ("!=", Comparison::Ne),
  (">", Comparison::Gt),
  ("<", Comparison::Lt),
];

/// Operators recognized after "length" in free-form condition text.
static LENGTH_OPERATOR: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(concat!(
    r"(?i)>=|<=|==|!=|>|<",
    r"|at least|at most|greater than|more than|less than|fewer than|equal to|equals",
  ))
  .expect("operator pattern is valid")
});

static NUMBER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number pattern is valid"));

impl Comparison {
  fn parse(symbol: &str) -> Option<Self> {
    OPERATORS
      .iter()
      .find(|(s, _)| *s == symbol.trim())
      .map(|(_, op)| *op)
  }

  fn from_words(text: &str) -> Option<Self> {
    match text.to_lowercase().as_str() {
      "at least" => Some(Comparison::Ge),
      "at most" => Some(Comparison::Le),
      "greater than" | "more than" => Some(Comparison::Gt),
      "less than" | "fewer than" => Some(Comparison::Lt),
      "equal to" | "equals" => Some(Comparison::Eq),
      symbol => Comparison::parse(symbol),
    }
  }

  fn holds(self, left: f64, right: f64) -> bool {
    match self {
      Comparison::Gt => left > right,
      Comparison::Ge => left >= right,
      Comparison::Lt => left < right,
      Comparison::Le => left <= right,
      Comparison::Eq => left == right,
      Comparison::Ne => left != right,
    }
  }
}

/// Split a leading comparison operator off the condition text.
fn split_operator(text: &str) -> (Option<Comparison>, &str) {
  let text = text.trim();
  for (symbol, op) in OPERATORS {
    if let Some(rest) = text.strip_prefix(symbol) {
      return (Some(op), rest.trim());
    }
  }
  (None, text)
}

/// Operator and threshold from text such as `"> 3"` or `"greater than 3"`.
/// The first operator and the first number win; `None` when there is no
/// number at all.
fn length_check(text: &str) -> Option<(Option<Comparison>, f64)> {
  let number = NUMBER.find(text)?.as_str().parse().ok()?;
  let op = LENGTH_OPERATOR
    .find(text)
    .and_then(|m| Comparison::from_words(m.as_str()));
  Some((op, number))
}

fn condition_text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    other => value_text(other),
  }
}

fn length_of(value: &Value) -> f64 {
  match value {
    Value::Null => 0.0,
    Value::String(s) => s.chars().count() as f64,
    Value::Array(items) => items.len() as f64,
    other => other.to_string().chars().count() as f64,
  }
}

fn number_of(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

fn threshold(text: &str) -> Result<f64, TaskError> {
  text
    .trim()
    .parse()
    .map_err(|_| TaskError::invalid_config("condition", format!("'{text}' is not a number")))
}

/// Evaluates a predicate over the input and either forwards the input or
/// emits null.
#[derive(Debug, Default)]
pub struct ConditionHandler;

impl ConditionHandler {
  fn evaluate(config: &ConditionConfig, input: &Value) -> Result<bool, TaskError> {
    let fallback_op = match config.operator.as_deref() {
      Some(symbol) => Comparison::parse(symbol).ok_or_else(|| {
        TaskError::invalid_config("operator", format!("unsupported operator '{symbol}'"))
      })?,
      None => Comparison::Gt,
    };
    let condition = condition_text(&config.condition);
    let (leading_op, operand) = split_operator(&condition);
    let op = leading_op.unwrap_or(fallback_op);

    match config.condition_type.as_deref() {
      Some("text_length") => Ok(op.holds(length_of(input), threshold(operand)?)),
      Some("number_comparison") => {
        let right = threshold(operand)?;
        Ok(number_of(input).is_some_and(|left| op.holds(left, right)))
      }
      Some("contains") => Ok(value_text(input).contains(condition.as_str())),
      _ => {
        let check = condition
          .find("length")
          .and_then(|at| length_check(&condition[at + "length".len()..]));
        match check {
          Some((op, right)) => Ok(op.unwrap_or(fallback_op).holds(length_of(input), right)),
          None => Ok(truthy(input)),
        }
      }
    }
  }
}

#[async_trait]
impl NodeHandler for ConditionHandler {
  async fn execute(
    &self,
    ctx: &TaskContext,
    _cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    let config: ConditionConfig = ctx.parse_config()?;
    let input = ctx.require_input("input")?;

    if Self::evaluate(&config, input)? {
      Ok(input.clone())
    } else {
      Ok(Value::Null)
    }
  }
}
