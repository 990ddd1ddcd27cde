use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "scan": {
                "type": "object",
                "properties": {
                    "nmap_path": { "type": "string", "minLength": 1 },
                    "phase_timeout_secs": { "type": "integer", "minimum": 1 },
                    "on_failure": { "type": "string", "enum": ["abort", "continue"] },
                    "empty_ports": { "type": "string", "enum": ["skip", "all-ports", "empty"] }
                },
                "additionalProperties": false
            },
            "elevation": {
                "type": "object",
                "properties": {
                    "enabled": { "type": "boolean" },
                    "program": { "type": "string", "minLength": 1 },
                    "password": { "type": "string" }
                },
                "additionalProperties": false
            },
            "output": {
                "type": "object",
                "properties": {
                    "directory": { "type": "string", "minLength": 1 },
                    "color": { "type": "boolean" },
                    "report": { "type": "boolean" }
                },
                "additionalProperties": false
            },
            "knowledge": {
                "type": "object",
                "properties": {
                    "directory": { "type": "string", "minLength": 1 }
                },
                "additionalProperties": false
            }
        },
        "additionalProperties": false
    })
});
