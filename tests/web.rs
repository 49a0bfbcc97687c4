//! Browser tests for the JS facade. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use mentioncore::MentionEditor;
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

/// Plain JS object (not a `Map`) from a JSON literal
fn js_object(value: serde_json::Value) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap()
}

fn number(value: &serde_json::Value) -> Option<f64> {
    value.as_f64()
}

fn hydrated_editor() -> MentionEditor {
    let mut editor = MentionEditor::new();
    let candidates = js_object(serde_json::json!({
        "tags": ["world", "work"],
        "persons": ["Ada Lovelace"],
        "ideas": ["depends on"],
    }));
    editor.hydrate_candidates(candidates).unwrap();
    editor.insert_block("b1", "").unwrap();
    editor
}

#[wasm_bindgen_test]
fn test_on_change_returns_active_match() {
    let mut editor = hydrated_editor();
    let view = editor.on_change("b1", "hello #wo", 9).unwrap();
    assert!(!view.is_null());

    let view: serde_json::Value = serde_wasm_bindgen::from_value(view).unwrap();
    assert_eq!(view["partial"], "wo");
    assert_eq!(view["trigger"], "hashtag");
    assert_eq!(number(&view["selectedIndex"]), Some(0.0));
    assert_eq!(view["candidates"], serde_json::json!(["work", "world"]));
    assert_eq!(number(&view["screenLeft"]), Some(20.0));
}

#[wasm_bindgen_test]
fn test_key_commands_by_name() {
    let mut editor = hydrated_editor();
    editor.on_change("b1", "hello #wo", 9).unwrap();

    assert_eq!(editor.key_binding_for(13).as_deref(), Some("autocomplete"));
    assert_eq!(editor.key_binding_for(40).as_deref(), Some("selectDown"));
    assert_eq!(editor.handle_key_command("selectDown").unwrap(), "handled");
    assert_eq!(editor.handle_key_command("autocomplete").unwrap(), "handled");
    assert_eq!(editor.get_text("b1").unwrap(), "hello #world ");

    assert_eq!(editor.handle_key_command("autocomplete").unwrap(), "not-handled");
    assert_eq!(editor.handle_key_command("bold").unwrap(), "not-handled");
    assert_eq!(editor.key_binding_for(13), None);
}

#[wasm_bindgen_test]
fn test_offsets_are_utf16() {
    let mut editor = hydrated_editor();
    // "🎉 #wo" is 6 UTF-16 code units but 5 characters; the emoji counts twice everywhere
    let view = editor.on_change("b1", "🎉 #wo", 6).unwrap();
    assert!(!view.is_null());
    editor.handle_key_command("autocomplete").unwrap();

    let caret: serde_json::Value = serde_wasm_bindgen::from_value(editor.get_caret()).unwrap();
    assert_eq!(caret["blockKey"], "b1");
    assert_eq!(number(&caret["offset"]), Some(9.0));

    let decorations: serde_json::Value =
        serde_wasm_bindgen::from_value(editor.get_decorations("b1").unwrap()).unwrap();
    assert_eq!(number(&decorations[0]["start"]), Some(3.0));
    assert_eq!(number(&decorations[0]["end"]), Some(8.0));
    assert_eq!(decorations[0]["mode"], "submitted");
}

#[wasm_bindgen_test]
fn test_geometry_provider_callback() {
    let mut editor = hydrated_editor();
    let callback = js_sys::Function::new_with_args("key, offset", "return { left: offset * 10, top: 42 };");
    editor.set_geometry_provider(callback);

    let view: serde_json::Value =
        serde_wasm_bindgen::from_value(editor.on_change("b1", "ab #w", 5).unwrap()).unwrap();
    assert_eq!(number(&view["screenLeft"]), Some(30.0));
    assert_eq!(number(&view["screenTop"]), Some(42.0));
}

#[wasm_bindgen_test]
fn test_errors_become_js_values() {
    let mut editor = hydrated_editor();
    let err = editor.on_change("missing", "#w", 2).unwrap_err();
    assert_eq!(err.as_string().as_deref(), Some("Unknown block: missing"));

    assert!(editor.on_change("b1", "#w", 9).is_err());
    assert!(editor.hydrate_candidates(JsValue::from_str("nope")).is_err());
}

#[wasm_bindgen_test]
fn test_with_config() {
    let config = js_object(serde_json::json!({ "separator": ", " }));
    let mut editor = MentionEditor::with_config(config).unwrap();
    editor.insert_block("b1", "").unwrap();
    editor.on_change("b1", "#x", 2).unwrap();
    editor.handle_key_command("autocomplete").unwrap();
    assert_eq!(editor.get_text("b1").unwrap(), "#x, ");

    let stats: serde_json::Value = serde_wasm_bindgen::from_value(editor.get_stats()).unwrap();
    assert_eq!(number(&stats["commits"]), Some(1.0));
}
