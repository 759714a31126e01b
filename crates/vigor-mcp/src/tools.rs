//! MCP tool definitions and request handling
//!
//! This module defines all available tools and handles MCP protocol messages.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use vigor_core::{
    checkin_insight_for, correlate, correlation_results, exposure_symptom_correlations,
    habit_impacts, pattern_insights, pillar_matrix, pillar_series, CorrelationMethod,
    InsightPolicy, Pillar, WeeklyDigestBuilder,
};

use crate::error::{McpError, Result};
use crate::payload;

// =============================================================================
// MCP Protocol Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// One kept pair of the pillar matrix.
#[derive(Debug, Serialize)]
struct PillarPair {
    pillar_a: Pillar,
    pillar_b: Pillar,
    r: f64,
}

// =============================================================================
// Tool schemas
// =============================================================================

fn checkins_schema() -> Value {
    json!({
        "type": "array",
        "description": "Daily check-ins: {date, mood, energy, nutrition_rating, activity_rating, sleep_rating, stress_rating, connection_rating, substance_rating}. Ratings are 1-10 and optional.",
        "items": { "type": "object" }
    })
}

fn habits_schema() -> Value {
    json!({
        "type": "array",
        "description": "Active habits: {id, name, pillar_id (1-6), completed: [YYYY-MM-DD]}",
        "items": { "type": "object" }
    })
}

fn today_schema() -> Value {
    json!({
        "type": "string",
        "description": "Reference date YYYY-MM-DD (default: today)"
    })
}

// =============================================================================
// Vigor Tools
// =============================================================================

/// Tool handler for the correlation and insight engine
pub struct VigorTools {
    policy: InsightPolicy,
}

impl VigorTools {
    pub fn new(policy: InsightPolicy) -> Self {
        Self { policy }
    }

    /// Get all available tools
    pub fn get_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: "vigor_correlate".to_string(),
                description: "Pearson and Spearman correlation of two equal-length value arrays, with two-tailed p-values. Results are null below 10 pairs.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "x": { "type": "array", "items": { "type": "number" } },
                        "y": { "type": "array", "items": { "type": "number" } },
                        "label_a": { "type": "string", "description": "Label for x (default: x)" },
                        "label_b": { "type": "string", "description": "Label for y (default: y)" }
                    },
                    "required": ["x", "y"]
                }),
            },
            Tool {
                name: "vigor_habit_impacts".to_string(),
                description: "Mood and energy on days each habit was completed vs days it was not, strongest mood lift first.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "checkins": checkins_schema(),
                        "habits": habits_schema(),
                        "today": today_schema()
                    },
                    "required": ["checkins", "habits"]
                }),
            },
            Tool {
                name: "vigor_pillar_matrix".to_string(),
                description: "Pairwise correlations between the six pillar ratings, plus p-values for pairs with enough shared days.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "checkins": checkins_schema()
                    },
                    "required": ["checkins"]
                }),
            },
            Tool {
                name: "vigor_insights".to_string(),
                description: "Ranked natural-language pattern insights from recent check-ins and habit completions.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "checkins": checkins_schema(),
                        "habits": habits_schema(),
                        "today": today_schema()
                    },
                    "required": ["checkins"]
                }),
            },
            Tool {
                name: "vigor_weekly_digest".to_string(),
                description: "Week-over-week averages, trends, strongest and weakest pillar, top habit, headline and recommendation.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "checkins": checkins_schema(),
                        "habits": habits_schema(),
                        "today": today_schema()
                    },
                    "required": ["checkins"]
                }),
            },
            Tool {
                name: "vigor_exposure_correlations".to_string(),
                description: "Spearman correlation of FODMAP group exposure with each symptom. Pairs with fewer than 10 shared days are omitted.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "food_logs": {
                            "type": "array",
                            "description": "Food entries: {date, fodmap_groups: [fructans|gos|lactose|fructose|sorbitol|mannitol], servings}",
                            "items": { "type": "object" }
                        },
                        "symptoms": {
                            "type": "object",
                            "description": "Symptom key to {YYYY-MM-DD: score}"
                        }
                    },
                    "required": ["food_logs", "symptoms"]
                }),
            },
            Tool {
                name: "vigor_checkin_insight".to_string(),
                description: "One-sentence insight for the check-in on a date, using the two weeks before it.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "checkins": checkins_schema(),
                        "date": {
                            "type": "string",
                            "description": "Check-in date YYYY-MM-DD (default: today)"
                        }
                    },
                    "required": ["checkins"]
                }),
            },
        ]
    }

    /// Execute a tool by name
    pub fn execute(&self, name: &str, args: &Value) -> Result<Value> {
        tracing::debug!(tool = name, "executing tool");

        match name {
            "vigor_correlate" => {
                let x = payload::values(args, "x")?;
                let y = payload::values(args, "y")?;
                let label_a = args["label_a"].as_str().unwrap_or("x");
                let label_b = args["label_b"].as_str().unwrap_or("y");
                let pearson = correlate(label_a, label_b, &x, &y, CorrelationMethod::Pearson)?;
                let spearman = correlate(label_a, label_b, &x, &y, CorrelationMethod::Spearman)?;
                Ok(json!({
                    "pearson": pearson,
                    "spearman": spearman
                }))
            }

            "vigor_habit_impacts" => {
                let today = payload::date_or_today(args, "today")?;
                let start = today - Duration::days(self.policy.habit_window_days);
                let checkins = payload::checkin_log(args)?.between(start, today);
                let habits = payload::habit_log(args)?.between(start, today);
                Ok(serde_json::to_value(habit_impacts(&checkins, &habits))?)
            }

            "vigor_pillar_matrix" => {
                let checkins = payload::checkin_log(args)?;
                let options = self.policy.matrix_options();
                let pairs: Vec<PillarPair> = pillar_matrix(&checkins, &options)
                    .into_iter()
                    .map(|((pillar_a, pillar_b), r)| PillarPair {
                        pillar_a,
                        pillar_b,
                        r,
                    })
                    .collect();
                let results = correlation_results(&pillar_series(&checkins), &options);
                Ok(json!({
                    "pairs": pairs,
                    "results": results
                }))
            }

            "vigor_insights" => {
                let today = payload::date_or_today(args, "today")?;
                let checkins = payload::checkin_log(args)?;
                let habits = payload::habit_log(args)?;
                let insights = pattern_insights(&checkins, &habits, today, &self.policy);
                Ok(serde_json::to_value(insights)?)
            }

            "vigor_weekly_digest" => {
                let today = payload::date_or_today(args, "today")?;
                let checkins = payload::checkin_log(args)?;
                let habits = payload::habit_log(args)?;
                let digest =
                    WeeklyDigestBuilder::from_policy(&self.policy).build(&checkins, &habits, today);
                Ok(serde_json::to_value(digest)?)
            }

            "vigor_exposure_correlations" => {
                let exposure = payload::exposure_table(args)?;
                let symptoms = payload::symptom_series(args)?;
                let results = exposure_symptom_correlations(&exposure, &symptoms);
                Ok(serde_json::to_value(results)?)
            }

            "vigor_checkin_insight" => {
                let date = payload::date_or_today(args, "date")?;
                let checkins = payload::checkin_log(args)?;
                Ok(json!({
                    "date": date,
                    "insight": checkin_insight_for(&checkins, date)
                }))
            }

            _ => Err(McpError::UnknownTool(name.to_string())),
        }
    }
}

// =============================================================================
// MCP Protocol Handlers
// =============================================================================

fn handle_initialize(_params: &Value) -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": "vigor-mcp",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn handle_list_tools(tools: &VigorTools) -> Value {
    json!({
        "tools": tools.get_tools()
    })
}

fn handle_call_tool(tools: &VigorTools, params: &Value) -> Value {
    let name = params["name"].as_str().unwrap_or("");
    let args = &params["arguments"];

    match tools.execute(name, args) {
        Ok(result) => {
            json!({
                "content": [{
                    "type": "text",
                    "text": serde_json::to_string_pretty(&result).unwrap_or_default()
                }]
            })
        }
        Err(e) => {
            tracing::warn!(tool = name, error = %e, "tool call failed");
            json!({
                "content": [{
                    "type": "text",
                    "text": format!("Error: {}", e)
                }],
                "isError": true
            })
        }
    }
}

/// Handle an incoming MCP request
pub fn handle_request(tools: &VigorTools, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    let result = match request.method.as_str() {
        "initialize" => Some(handle_initialize(&request.params)),
        "initialized" | "notifications/initialized" => None,
        "tools/list" => Some(handle_list_tools(tools)),
        "tools/call" => Some(handle_call_tool(tools, &request.params)),
        "notifications/cancelled" => None,
        _ => {
            return Some(JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id,
                result: None,
                error: Some(JsonRpcError {
                    code: -32601,
                    message: format!("Method not found: {}", request.method),
                }),
            });
        }
    };

    result.map(|r| JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id: request.id,
        result: Some(r),
        error: None,
    })
}
