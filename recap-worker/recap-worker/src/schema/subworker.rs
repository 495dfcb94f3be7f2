/// Subworker APIのJSON Schema定義。
///
/// クラスタリング結果のスキーマを定義します。
use std::sync::LazyLock;

use serde_json::{Value, json};

/// Subworker clustering responseのJSON Schema。
pub(crate) static CLUSTERING_RESPONSE_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://alt.dev/schemas/subworker/cluster-job-response.json",
        "title": "Subworker Run Response",
        "description": "Response schema for recap-subworker run endpoints",
        "type": "object",
        "properties": {
            "run_id": {
                "type": "integer",
                "minimum": 0,
                "description": "Unique identifier for the subworker run"
            },
            "job_id": {
                "type": "string",
                "format": "uuid",
                "description": "Job ID for tracking"
            },
            "genre": {
                "type": "string",
                "description": "Genre of the processed corpus"
            },
            "status": {
                "type": "string",
                "enum": ["running", "succeeded", "partial", "failed"],
                "description": "Run status"
            },
            "cluster_count": {
                "type": "integer",
                "minimum": 0,
                "description": "Total cluster count"
            },
            "clusters": {
                "type": "array",
                "description": "Array of identified clusters",
                "items": { "$ref": "#/$defs/cluster" },
                "minItems": 0
            },
            "diagnostics": {
                "type": "object",
                "description": "Diagnostic metadata captured during processing"
            }
        },
        "required": ["run_id", "job_id", "genre", "status", "cluster_count", "clusters", "diagnostics"],
        "$defs": {
            "cluster": {
                "type": "object",
                "description": "A single cluster of related sentences",
                "properties": {
                    "cluster_id": {
                        "type": "integer",
                        "minimum": -1,
                        "description": "Unique cluster identifier within this job (-1 may be used for noise clusters)"
                    },
                    "size": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Number of supporting sentences"
                    },
                    "label": {
                        "type": ["null", "string"],
                        "description": "Optional short label for the cluster"
                    },
                    "top_terms": {
                        "type": "array",
                        "description": "Most representative terms for this cluster",
                        "items": { "type": "string" }
                    },
                    "stats": {
                        "type": "object",
                        "description": "Additional cluster statistics"
                    },
                    "representatives": {
                        "type": "array",
                        "description": "Representative sentences for this cluster",
                        "items": { "$ref": "#/$defs/representative" },
                        "minItems": 0
                    }
                },
                "required": ["cluster_id", "size", "label", "top_terms", "stats", "representatives"]
            },
            "representative": {
                "type": "object",
                "description": "Representative sentence payload",
                "properties": {
                    "article_id": {
                        "type": "string",
                        "description": "ID of the source article"
                    },
                    "paragraph_idx": {
                        "type": ["null", "integer"],
                        "minimum": 0,
                        "description": "Paragraph index within the article"
                    },
                    "sentence_text": {
                        "type": "string",
                        "minLength": 20,
                        "description": "Representative sentence text"
                    },
                    "lang": {
                        "type": ["null", "string"],
                        "description": "Language hint for the sentence"
                    },
                    "score": {
                        "type": ["null", "number"],
                        "description": "Heuristic confidence score"
                    }
                },
                "required": ["article_id", "sentence_text"]
            }
        }
    })
});
