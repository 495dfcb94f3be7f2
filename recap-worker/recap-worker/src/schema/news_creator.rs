/// News-Creator APIのJSON Schema定義。
///
/// 日本語要約生成のレスポンススキーマを定義します。
use once_cell::sync::Lazy;
use serde_json::{Value, json};

/// News-Creator summary responseのJSON Schema。
pub(crate) static SUMMARY_RESPONSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://alt.dev/schemas/news-creator/summary-response.json",
        "title": "News-Creator Summary Response",
        "description": "Response schema for news-creator summary generation API",
        "type": "object",
        "properties": {
            "job_id": {
                "type": "string",
                "format": "uuid",
                "description": "Job ID for tracking"
            },
            "genre": {
                "type": "string",
                "description": "Genre of the summary"
            },
            "summary": {
                "type": "object",
                "description": "Generated summary content",
                "properties": {
                    "title": {
                        "type": "string",
                        "minLength": 1,
                        "maxLength": 200,
                        "description": "Summary title in Japanese"
                    },
                    "bullets": {
                        "type": "array",
                        "description": "Bullet-point summary in Japanese",
                        "items": {
                            "type": "string",
                            "minLength": 1,
                            "maxLength": 500
                        },
                        "minItems": 1,
                        "maxItems": 10
                    },
                    "language": {
                        "type": "string",
                        "pattern": "^ja$",
                        "description": "Language code (must be 'ja' for Japanese)"
                    }
                },
                "required": ["title", "bullets", "language"]
            },
            "metadata": {
                "type": "object",
                "description": "Generation metadata",
                "properties": {
                    "model": {
                        "type": "string",
                        "description": "LLM model used for generation"
                    },
                    "temperature": {
                        "type": "number",
                        "minimum": 0,
                        "maximum": 2,
                        "description": "Temperature parameter"
                    },
                    "prompt_tokens": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Number of tokens in the prompt"
                    },
                    "completion_tokens": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Number of tokens in the completion"
                    },
                    "processing_time_ms": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Processing time in milliseconds"
                    }
                },
                "required": ["model"]
            }
        },
        "required": ["job_id", "genre", "summary", "metadata"]
    })
});

/// News-Creator summary requestのJSON Schema。
#[allow(dead_code)]
pub(crate) static SUMMARY_REQUEST_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://alt.dev/schemas/news-creator/summary-request.json",
        "title": "News-Creator Summary Request",
        "description": "Request schema for news-creator summary generation API",
        "type": "object",
        "properties": {
            "job_id": {
                "type": "string",
                "format": "uuid",
                "description": "Job ID for tracking"
            },
            "genre": {
                "type": "string",
                "description": "Genre of the content to summarize"
            },
            "clusters": {
                "type": "array",
                "description": "Clusters to summarize",
                "items": {
                    "$ref": "#/$defs/cluster_input"
                },
                "minItems": 1,
                "maxItems": 20
            },
            "options": {
                "type": "object",
                "description": "Generation options",
                "properties": {
                    "max_bullets": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 10,
                        "default": 5
                    },
                    "temperature": {
                        "type": "number",
                        "minimum": 0,
                        "maximum": 2,
                        "default": 0.7
                    }
                }
            }
        },
        "required": ["job_id", "genre", "clusters"],
        "$defs": {
            "cluster_input": {
                "type": "object",
                "description": "A cluster to be summarized",
                "properties": {
                    "cluster_id": {
                        "type": "integer",
                        "minimum": 0
                    },
                    "representative_sentences": {
                        "type": "array",
                        "description": "Most important sentences from the cluster",
                        "items": {
                            "type": "string",
                            "minLength": 1
                        },
                        "minItems": 1,
                        "maxItems": 10
                    },
                    "top_terms": {
                        "type": "array",
                        "description": "Key terms for this cluster",
                        "items": {
                            "type": "string"
                        }
                    }
                },
                "required": ["cluster_id", "representative_sentences"]
            }
        }
    })
});
