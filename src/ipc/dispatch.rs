//! IPC message dispatch: parse s-expressions and route to handlers.
//!
//! One message per line.  Every message is a plist with a `:type`
//! keyword and an optional `:id` echoed back in the response.

use anyhow::{anyhow, bail};
use lexpr::Value;
use tracing::{debug, warn};

use crate::device::{commands_sexp, DeviceSink};
use crate::hand::landmarks::Landmark;
use crate::pipeline::Pipeline;

/// Parse an s-expression message and dispatch to the appropriate handler.
/// Returns an optional response string (s-expression).
pub fn handle_message(pipeline: &mut Pipeline, sink: &mut dyn DeviceSink, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let value = match lexpr::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("malformed s-expression: {}", e);
            return Some(error_response(0, &format!("malformed s-expression: {e}")));
        }
    };

    let msg_type = get_keyword(&value, "type");
    let msg_id = get_int(&value, "id").unwrap_or(0);

    match msg_type.as_deref() {
        Some("frame") => handle_frame(pipeline, sink, msg_id, &value),
        Some("set-param") => handle_set_param(pipeline, msg_id, &value),
        Some("config") => handle_config(pipeline, msg_id),
        Some("status") => handle_status(pipeline, msg_id),
        Some("reset") => handle_reset(pipeline, sink, msg_id),
        Some("ping") => handle_ping(pipeline, msg_id),
        Some(other) => Some(error_response(
            msg_id,
            &format!("unknown message type: {other}"),
        )),
        None => Some(error_response(msg_id, "missing :type field")),
    }
}

// ── Handlers ────────────────────────────────────────────────

fn handle_frame(
    pipeline: &mut Pipeline,
    sink: &mut dyn DeviceSink,
    msg_id: i64,
    value: &Value,
) -> Option<String> {
    let points = match get_value(value, "landmarks").map(parse_landmarks).transpose() {
        Ok(points) => points.flatten(),
        Err(e) => {
            debug!("frame {}: {:#}", msg_id, e);
            return Some(error_response(msg_id, &format!("bad landmarks: {e}")));
        }
    };

    let result = pipeline.process_frame(points.as_deref(), sink);
    let fingers = result
        .fingers
        .map(|f| format!("\"{}\"", f.as_bits()))
        .unwrap_or_else(|| "nil".to_string());

    Some(format!(
        "(:type :response :id {} :status :ok :gesture :{} :fingers {} :commands {} :failed {})",
        msg_id,
        result.classification.gesture.as_str(),
        fingers,
        commands_sexp(&result.commands),
        result.report.failed.len(),
    ))
}

fn handle_set_param(pipeline: &mut Pipeline, msg_id: i64, value: &Value) -> Option<String> {
    let key = match get_string(value, "key") {
        Some(k) => k,
        None => return Some(error_response(msg_id, "missing :key")),
    };
    let val = match get_float(value, "value") {
        Some(v) => v,
        None => return Some(error_response(msg_id, "missing or non-numeric :value")),
    };

    let config = pipeline.config();
    let applied = config.update(&key, val as f32);
    let current = config
        .snapshot()
        .get(&key)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "nil".to_string());

    Some(format!(
        "(:type :response :id {} :status :ok :key \"{}\" :applied {} :value {})",
        msg_id,
        escape_string(&key),
        if applied { "t" } else { "nil" },
        current,
    ))
}

fn handle_config(pipeline: &mut Pipeline, msg_id: i64) -> Option<String> {
    Some(format!(
        "(:type :response :id {} :status :ok :config {})",
        msg_id,
        pipeline.config().snapshot().config_sexp()
    ))
}

fn handle_status(pipeline: &mut Pipeline, msg_id: i64) -> Option<String> {
    Some(format!(
        "(:type :response :id {} :status :ok :telemetry {})",
        msg_id,
        pipeline.status.status_sexp()
    ))
}

fn handle_reset(pipeline: &mut Pipeline, sink: &mut dyn DeviceSink, msg_id: i64) -> Option<String> {
    let (commands, report) = pipeline.reset(sink);
    Some(format!(
        "(:type :response :id {} :status :ok :commands {} :failed {})",
        msg_id,
        commands_sexp(&commands),
        report.failed.len(),
    ))
}

fn handle_ping(pipeline: &mut Pipeline, msg_id: i64) -> Option<String> {
    Some(format!(
        "(:type :response :id {} :status :ok :frames {})",
        msg_id, pipeline.status.frames
    ))
}

// ── Landmark payload ────────────────────────────────────────

/// Parse `((x y z) ...)` into points.  `nil` / `()` means no hand.
///
/// The point count is not checked here; the recognizer treats any count
/// other than 21 as no hand.
fn parse_landmarks(value: &Value) -> anyhow::Result<Option<Vec<Landmark>>> {
    if is_nil(value) {
        return Ok(None);
    }

    let mut points = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                points.push(parse_point(pair.car(), points.len())?);
                current = pair.cdr();
            }
            Value::Null | Value::Nil => break,
            other => bail!("expected a list of points, got {}", other),
        }
    }
    Ok(Some(points))
}

fn parse_point(value: &Value, index: usize) -> anyhow::Result<Landmark> {
    let coords = flatten_list(value)
        .into_iter()
        .map(|v| v.as_f64().map(|n| n as f32))
        .collect::<Option<Vec<f32>>>()
        .ok_or_else(|| anyhow!("point {} has a non-numeric coordinate", index))?;

    match coords.as_slice() {
        [x, y] => Ok(Landmark::new(*x, *y, 0.0)),
        [x, y, z] => Ok(Landmark::new(*x, *y, *z)),
        other => bail!("point {} has {} coordinates", index, other.len()),
    }
}

fn is_nil(value: &Value) -> bool {
    match value {
        Value::Null | Value::Nil => true,
        Value::Bool(b) => !b,
        Value::Symbol(s) => s.as_ref() == "nil",
        _ => false,
    }
}

// ── Helpers ────────────────────────────────────────────────

fn error_response(id: i64, reason: &str) -> String {
    format!(
        "(:type :response :id {} :status :error :reason \"{}\")",
        id,
        escape_string(reason)
    )
}

/// Escape a string for s-expression output.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Find the value following `:key` in an s-expression plist.
/// Handles both `Value::Keyword("key")` (elisp parser) and
/// `Value::Symbol(":key")` (default parser) forms.
fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Extract a keyword value from an s-expression plist as a string.
fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let val = get_value(value, key)?;
    Some(match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s = v.to_string();
            s.strip_prefix(':').unwrap_or(&s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => (if *b { "t" } else { "nil" }).to_string(),
        Value::Null | Value::Nil => "nil".to_string(),
        _ => val.to_string(),
    })
}

/// Extract an integer value from an s-expression plist.
fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Extract a string value from an s-expression plist.
fn get_string(value: &Value, key: &str) -> Option<String> {
    get_keyword(value, key)
}

/// Extract a floating-point value from an s-expression plist.
fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_value(value, key).and_then(Value::as_f64)
}

/// Flatten a possibly nested list/cons structure into a Vec of leaf values.
fn flatten_list(value: &Value) -> Vec<&Value> {
    let mut result = Vec::new();
    fn walk<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
        match v {
            Value::Cons(pair) => {
                walk(pair.car(), out);
                walk(pair.cdr(), out);
            }
            Value::Null => {} // end of list
            other => out.push(other),
        }
    }
    walk(value, &mut result);
    result
}
