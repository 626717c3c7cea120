//! Conversion runtimes: whatever actually executes Pydantic code.

use crate::error::{BridgeError, BridgeResult};
use std::future::Future;
use std::io::ErrorKind;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::debug;

/// Executes Pydantic source and reports the resulting JSON Schema
pub trait ConversionRuntime: Send + Sync {
    /// Prepare the runtime, publishing human-readable progress
    fn start(&self, progress: &watch::Sender<String>) -> impl Future<Output = BridgeResult<()>> + Send;

    /// JSON Schema text of the last model declared in `code`
    fn convert(&self, code: &str) -> impl Future<Output = BridgeResult<String>> + Send;
}

const VERIFY_SCRIPT: &str = r#"
from pydantic import BaseModel

class VerificationModel(BaseModel):
    id: int

assert VerificationModel(id=1).id == 1
"#;

const CONVERT_SCRIPT: &str = r#"
import ast
import json
import sys
from datetime import date, datetime
from typing import Any, Dict, List, Optional, Union

import pydantic
from pydantic import BaseModel, Field


def is_model_base(base):
    if isinstance(base, ast.Name):
        return base.id == "BaseModel"
    if isinstance(base, ast.Attribute) and isinstance(base.value, ast.Name):
        return base.value.id == "pydantic" and base.attr == "BaseModel"
    return False


def last_model_name(tree):
    name = None
    for node in tree.body:
        if isinstance(node, ast.ClassDef) and any(is_model_base(b) for b in node.bases):
            name = node.name
    return name


source = sys.stdin.read()
name = last_model_name(ast.parse(source))
if name is None:
    raise SystemExit("No class inheriting from pydantic.BaseModel found.")

namespace = {
    "pydantic": pydantic,
    "BaseModel": BaseModel,
    "Field": Field,
    "Any": Any,
    "Dict": Dict,
    "List": List,
    "Optional": Optional,
    "Union": Union,
    "date": date,
    "datetime": datetime,
}
exec(source, namespace)

model = namespace.get(name)
if not (isinstance(model, type) and issubclass(model, BaseModel)):
    raise SystemExit(f"Class '{name}' does not inherit from pydantic.BaseModel.")

schema = model.model_json_schema()
schema.pop("title", None)
print(json.dumps(schema))
"#;

/// Runtime backed by a local Python interpreter with `pydantic` installed
#[derive(Debug, Clone)]
pub struct PythonRuntime {
    interpreter: String,
    timeout: Duration,
}

impl PythonRuntime {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    async fn run(&self, script: &str, input: Option<&str>) -> BridgeResult<Output> {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg("-c").arg(script);
        cmd.stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn()?;
        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin.write_all(input.as_bytes()).await?;
            // dropping the pipe closes it so the script sees EOF
        }

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(std::io::Error::new(
                ErrorKind::TimedOut,
                format!("{} did not finish within {:?}", self.interpreter, self.timeout),
            )
            .into()),
        }
    }
}

impl Default for PythonRuntime {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl ConversionRuntime for PythonRuntime {
    async fn start(&self, progress: &watch::Sender<String>) -> BridgeResult<()> {
        progress.send_replace(format!("Starting {}...", self.interpreter));
        let output = self.run(VERIFY_SCRIPT, None).await.map_err(|e| match e {
            BridgeError::Io(io) => BridgeError::Startup(format!("could not run '{}': {}", self.interpreter, io)),
            other => other,
        })?;

        progress.send_replace("Verifying Pydantic...".to_string());
        if !output.status.success() {
            return Err(BridgeError::Startup(format!(
                "pydantic could not be loaded or verified: {}",
                last_line(&output.stderr)
            )));
        }
        debug!(interpreter = %self.interpreter, "pydantic verified");
        Ok(())
    }

    async fn convert(&self, code: &str) -> BridgeResult<String> {
        let output = self.run(CONVERT_SCRIPT, Some(code)).await?;
        if !output.status.success() {
            return Err(BridgeError::Conversion(last_line(&output.stderr)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Last non-empty line of process output (Python puts the message there)
fn last_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no error output")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_line_skips_blank_trailer() {
        let stderr = b"Traceback (most recent call last):\n  ...\nValueError: bad model\n\n";
        assert_eq!(last_line(stderr), "ValueError: bad model");
        assert_eq!(last_line(b""), "no error output");
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_a_startup_error() {
        let runtime = PythonRuntime::new("schemaforge-no-such-python");
        let (progress, _rx) = watch::channel(String::new());

        let err = runtime.start(&progress).await.unwrap_err();
        assert!(matches!(err, BridgeError::Startup(_)));
    }
}
