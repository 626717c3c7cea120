//! # Pydantic Code Generation
//!
//! Turns a rendered JSON Schema into Python source declaring equivalent
//! Pydantic models.
//!
//! ## Design
//!
//! - One `BaseModel` class per `$defs` entry, in declaration order, then the
//!   root class named after the document title
//! - Nested inline objects become their own classes, emitted ahead of the
//!   class that uses them
//! - Imports are collected while walking and emitted sorted
//! - Function-calling documents are unwrapped to their `parameters` object

use serde_json::{Map, Value};
use std::collections::BTreeSet;

const DEFS_PREFIX: &str = "#/$defs/";
const FALLBACK_CLASS: &str = "MySchema";

/// Generate Pydantic model source for a JSON Schema document
pub fn document_to_code(document: &Value) -> String {
    let unwrapped;
    let schema = match function_parameters(document) {
        Some(parameters) => {
            unwrapped = parameters;
            &unwrapped
        }
        None => document,
    };

    let empty = Map::new();
    let schema = schema.as_object().unwrap_or(&empty);
    Generator::new(schema).generate()
}

/// `function.parameters` carrying the function's name and description
fn function_parameters(document: &Value) -> Option<Value> {
    if document.get("type").and_then(Value::as_str) != Some("function") {
        return None;
    }
    let function = document.get("function")?.as_object()?;

    let mut parameters = function
        .get("parameters")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(name) = function.get("name") {
        parameters.insert("title".into(), name.clone());
    }
    if let Some(description) = function.get("description") {
        parameters.insert("description".into(), description.clone());
    }
    Some(Value::Object(parameters))
}

struct Generator<'a> {
    root: &'a Map<String, Value>,
    typing: BTreeSet<&'static str>,
    datetime: BTreeSet<&'static str>,
    pydantic: BTreeSet<&'static str>,
    models: Vec<String>,
}

impl<'a> Generator<'a> {
    fn new(root: &'a Map<String, Value>) -> Self {
        Self {
            root,
            typing: BTreeSet::new(),
            datetime: BTreeSet::new(),
            pydantic: BTreeSet::from(["BaseModel"]),
            models: Vec::new(),
        }
    }

    fn generate(mut self) -> String {
        let root = self.root;
        let mut seen = BTreeSet::new();
        if let Some(defs) = root.get("$defs").and_then(Value::as_object) {
            for (name, def) in defs {
                let class_name = sanitize_class_name(name);
                if seen.insert(class_name.clone()) {
                    let model = self.build_model(&class_name, def);
                    self.models.push(model);
                }
            }
        }

        let title = root.get("title").and_then(Value::as_str).unwrap_or("");
        let root_class = sanitize_class_name(title);
        let model = self.build_model(&root_class, &Value::Object(root.clone()));
        self.models.push(model);

        let mut imports = String::new();
        let blocks = [
            ("typing", &self.typing),
            ("datetime", &self.datetime),
            ("pydantic", &self.pydantic),
        ];
        for (module, names) in blocks {
            if !names.is_empty() {
                let names: Vec<&str> = names.iter().copied().collect();
                imports.push_str(&format!("from {} import {}\n", module, names.join(", ")));
            }
        }

        format!("{}\n\n{}", imports, self.models.join("\n\n"))
    }

    fn build_model(&mut self, class_name: &str, schema: &Value) -> String {
        let mut model = format!("class {}(BaseModel):\n", class_name);
        let properties = schema.get("properties").and_then(Value::as_object);
        let required: BTreeSet<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        if properties.is_none() {
            if let Some(description) = schema.get("description").and_then(Value::as_str).filter(|d| !d.is_empty()) {
                model.push_str(&format!("    \"\"\"{}\"\"\"\n\n", description));
            }
        }

        let mut fields = Vec::new();
        for (name, prop) in properties.into_iter().flatten() {
            let is_required = required.contains(name.as_str());
            let hint_name = prop.get("title").and_then(Value::as_str).unwrap_or(name);
            let mut hint = self.type_hint(prop, hint_name);

            if !is_required {
                self.typing.insert("Optional");
                hint = format!("Optional[{}]", hint);
            }

            match self.field_args(prop, is_required) {
                Some(args) => fields.push(format!("    {}: {} = Field({})", name, hint, args)),
                None if is_required => fields.push(format!("    {}: {}", name, hint)),
                None => fields.push(format!("    {}: {} = None", name, hint)),
            }
        }

        if fields.is_empty() {
            model.push_str("    pass");
        } else {
            model.push_str(&fields.join("\n"));
        }
        model
    }

    fn type_hint(&mut self, schema: &Value, name: &str) -> String {
        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            if let Some(def) = reference.strip_prefix(DEFS_PREFIX) {
                return sanitize_class_name(def);
            }
        }

        if let Some(options) = schema.get("oneOf").and_then(Value::as_array) {
            self.typing.insert("Union");
            let hints: Vec<String> = options.iter().map(|option| self.type_hint(option, name)).collect();
            return format!("Union[{}]", hints.join(", "));
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("string") => match schema.get("format").and_then(Value::as_str) {
                Some("date-time") => {
                    self.datetime.insert("datetime");
                    "datetime".to_string()
                }
                Some("date") => {
                    self.datetime.insert("date");
                    "date".to_string()
                }
                _ => "str".to_string(),
            },
            Some("number") => "float".to_string(),
            Some("integer") => "int".to_string(),
            Some("boolean") => "bool".to_string(),
            Some("array") => {
                self.typing.insert("List");
                let empty = Value::Object(Map::new());
                let items = schema.get("items").unwrap_or(&empty);
                let item_hint = self.type_hint(items, &format!("{}Item", name));
                format!("List[{}]", item_hint)
            }
            Some("object") => {
                let class_name = sanitize_class_name(name);
                let model = self.build_model(&class_name, schema);
                // defined ahead of every class that may use it
                self.models.insert(0, model);
                class_name
            }
            _ => {
                self.typing.insert("Any");
                "Any".to_string()
            }
        }
    }

    fn field_args(&mut self, schema: &Value, is_required: bool) -> Option<String> {
        let mut args = Vec::new();

        match schema.get("default") {
            Some(default) => args.push(format!("default={}", python_literal(default))),
            None if !is_required => args.push("default=None".to_string()),
            None => {}
        }

        for key in ["description", "title"] {
            if let Some(text) = schema.get(key).and_then(Value::as_str).filter(|t| !t.is_empty()) {
                args.push(format!("{}={}", key, Value::from(text)));
            }
        }

        let constraints = [
            ("minLength", "min_length"),
            ("maxLength", "max_length"),
        ];
        for (keyword, arg) in constraints {
            if let Some(n) = schema.get(keyword).filter(|v| v.is_number()) {
                args.push(format!("{}={}", arg, n));
            }
        }
        if let Some(pattern) = schema.get("pattern").and_then(Value::as_str).filter(|p| !p.is_empty()) {
            args.push(format!("pattern=r'{}'", pattern));
        }

        let bounds = [
            ("minimum", "ge"),
            ("maximum", "le"),
            ("exclusiveMinimum", "gt"),
            ("exclusiveMaximum", "lt"),
        ];
        for (keyword, arg) in bounds {
            if let Some(n) = schema.get(keyword).filter(|v| v.is_number()) {
                args.push(format!("{}={}", arg, n));
            }
        }

        if args.is_empty() {
            return None;
        }
        self.pydantic.insert("Field");
        Some(args.join(", "))
    }
}

/// Python class name for a schema or definition title
pub fn sanitize_class_name(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let mut class_name: String = joined.split('_').map(capitalize).collect();
    if class_name.is_empty() {
        return FALLBACK_CLASS.to_string();
    }
    if !class_name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        class_name.insert_str(0, "Model");
    }
    class_name
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// JSON value written as a Python literal
fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", Value::from(k.as_str()), python_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        other => other.to_string(),
    }
}
