//! Tests for the shared Responses-API Request type.

use moray_llm::{FunctionSchema, General, Item, Request, ToolChoice};

fn search_tool() -> FunctionSchema {
    FunctionSchema {
        name: "search".into(),
        description: "find docs".into(),
        strict: true,
        parameters: serde_json::from_value(serde_json::json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"],
            "additionalProperties": false
        }))
        .unwrap(),
    }
}

#[test]
fn request_from_general_sets_model() {
    let general = General::new("gpt-4.1");
    let req = Request::from(&general);
    assert_eq!(req.model, "gpt-4.1");
    assert!(req.tools.is_none());
    assert!(req.stream.is_none());
}

#[test]
fn request_from_general_with_tools() {
    let general = General::new("gpt-4.1").with_tools(vec![search_tool()]);
    let req = Request::from(&general);
    let tools = req.tools.expect("tools");
    assert_eq!(tools[0]["type"], "function");
    assert_eq!(tools[0]["name"], "search");
    assert_eq!(tools[0]["strict"], true);
    assert_eq!(tools[0]["parameters"]["type"], "object");
}

#[test]
fn request_with_empty_tools_omits_field() {
    let general = General::new("gpt-4.1").with_tools(Vec::new());
    let req = Request::from(&general);
    assert!(req.tools.is_none());
}

#[test]
fn request_with_tool_choice_auto() {
    let general = General::new("gpt-4.1").with_tool_choice(Some(ToolChoice::Auto));
    let req = Request::from(&general);
    assert_eq!(req.tool_choice.expect("tool_choice"), serde_json::json!("auto"));
}

#[test]
fn request_with_tool_choice_function() {
    let general = General::new("gpt-4.1").with_tool_choice(Some(ToolChoice::from("search")));
    let req = Request::from(&general);
    let choice = req.tool_choice.expect("tool_choice");
    assert_eq!(choice["type"], "function");
    assert_eq!(choice["name"], "search");
}

#[test]
fn request_without_tool_choice_omits_field() {
    let req = Request::from(&General::default());
    assert!(req.tool_choice.is_none());
}

#[test]
fn request_carries_parallel_tool_calls() {
    let general = General::new("gpt-4.1").with_parallel_tool_calls(Some(false));
    let req = Request::from(&general);
    assert_eq!(req.parallel_tool_calls, Some(false));
}

#[test]
fn request_stream_sets_flag() {
    let req = Request::from(&General::default()).stream();
    assert_eq!(req.stream, Some(true));
}

#[test]
fn request_serializes_input_items() {
    let input = vec![Item::user("what's the weather in Paris?")];
    let req = Request::from(&General::default()).input(&input);
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["input"][0]["type"], "message");
    assert_eq!(value["input"][0]["role"], "user");
    assert!(value.get("tools").is_none());
}
