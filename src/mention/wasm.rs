//! MentionEditor - JS facade over [`MentionEngine`]
//!
//! Offsets crossing this boundary are UTF-16 code units, as reported by the
//! browser's Selection API; the engine works in characters.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::candidates::CandidateSource;
use super::config::EditorConfig;
use super::controller::{GeometryProvider, ScreenPoint};
use super::document::{char_to_utf16_offset, utf16_to_char_offset, Block};
use super::engine::{Decoration, MentionEngine};
use super::error::MentionError;
use super::keys::{CommandOutcome, Key, KeyCommand};

// ==================== GEOMETRY ====================

/// Geometry provider backed by a JS callback `(blockKey, offsetUtf16) => { left, top } | null`
struct JsGeometry {
    callback: js_sys::Function,
}

impl GeometryProvider for JsGeometry {
    fn screen_rect_for_offset(&self, block: &Block, offset: usize) -> Option<ScreenPoint> {
        let offset = char_to_utf16_offset(block.text(), offset);
        let result = self.callback.call2(
            &JsValue::NULL,
            &JsValue::from_str(block.key()),
            &JsValue::from_f64(offset as f64),
        );

        match result {
            Ok(value) if value.is_null() || value.is_undefined() => None,
            Ok(value) => serde_wasm_bindgen::from_value(value).ok(),
            Err(e) => {
                console_error!("[MentionEditor] Geometry provider threw: {:?}", e);
                None
            }
        }
    }
}

// ==================== VIEW TYPES ====================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsCaret<'a> {
    block_key: &'a str,
    offset: usize,
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    match serde_wasm_bindgen::to_value(value) {
        Ok(v) => v,
        Err(e) => {
            console_error!("[MentionEditor] Serialization failed: {:?}", e);
            JsValue::NULL
        }
    }
}

// ==================== EDITOR ====================

/// Mention autocomplete editor core for the browser
#[wasm_bindgen]
pub struct MentionEditor {
    inner: MentionEngine,
}

impl Default for MentionEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl MentionEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: MentionEngine::new(),
        }
    }

    /// Create an editor from a config object, e.g. `{ separator: " ", fallbackLeft: 20 }`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<MentionEditor, JsValue> {
        let config: EditorConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| MentionError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(Self {
            inner: MentionEngine::with_config(config),
        })
    }

    /// Replace the vocabularies: `{ tags: string[], persons: string[], ideas: string[] }`
    #[wasm_bindgen(js_name = hydrateCandidates)]
    pub fn hydrate_candidates(&mut self, candidates: JsValue) -> Result<(), JsValue> {
        let candidates: CandidateSource = serde_wasm_bindgen::from_value(candidates)
            .map_err(|e| MentionError::InvalidCandidates(e.to_string()))?;
        self.inner.set_candidates(candidates);
        Ok(())
    }

    #[wasm_bindgen(js_name = insertBlock)]
    pub fn insert_block(&mut self, key: &str, text: &str) -> Result<(), JsValue> {
        Ok(self.inner.insert_block(key, text)?)
    }

    #[wasm_bindgen(js_name = removeBlock)]
    pub fn remove_block(&mut self, key: &str) -> Result<(), JsValue> {
        Ok(self.inner.remove_block(key)?)
    }

    /// Report the block's current text and caret. Returns the active match or `null`.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, block_key: &str, text: &str, caret_utf16: usize) -> Result<JsValue, JsValue> {
        let utf16_len = text.encode_utf16().count();
        if caret_utf16 > utf16_len {
            self.inner.dismiss();
            return Err(MentionError::OffsetOutOfBounds {
                block: block_key.to_string(),
                offset: caret_utf16,
                len: utf16_len,
            }
            .into());
        }

        let offset = utf16_to_char_offset(text, caret_utf16);
        let view = self.inner.on_change(block_key, text, offset)?;
        Ok(view.as_ref().map_or(JsValue::NULL, to_js))
    }

    /// `{ screenLeft, screenTop, candidates, selectedIndex, trigger, partial }` or `null`
    #[wasm_bindgen(js_name = getActiveMatch)]
    pub fn get_active_match(&self) -> JsValue {
        self.inner
            .active_match()
            .as_ref()
            .map_or(JsValue::NULL, to_js)
    }

    /// Run `"selectUp"`, `"selectDown"` or `"autocomplete"`; returns `"handled"` or `"not-handled"`
    #[wasm_bindgen(js_name = handleKeyCommand)]
    pub fn handle_key_command(&mut self, name: &str) -> Result<String, JsValue> {
        let outcome = match KeyCommand::from_name(name) {
            Some(command) => self.inner.handle_key_command(command)?,
            None => CommandOutcome::NotHandled,
        };
        Ok(outcome.as_str().to_string())
    }

    /// Command name bound to a DOM `keyCode` right now, or `undefined`
    #[wasm_bindgen(js_name = keyBindingFor)]
    pub fn key_binding_for(&self, key_code: u32) -> Option<String> {
        self.inner
            .key_binding_for(Key::from_key_code(key_code))
            .map(|command| command.as_str().to_string())
    }

    /// Drop the active match (editor blurred)
    #[wasm_bindgen(js_name = dismiss)]
    pub fn js_dismiss(&mut self) {
        self.inner.dismiss();
    }

    /// `[{ start, end, mode: "filling" | "submitted" }]` in UTF-16 offsets
    #[wasm_bindgen(js_name = getDecorations)]
    pub fn get_decorations(&self, block_key: &str) -> Result<JsValue, JsValue> {
        let text = self.inner.text(block_key)?;
        let decorations: Vec<Decoration> = self
            .inner
            .decorations(block_key)?
            .into_iter()
            .map(|d| Decoration {
                start: char_to_utf16_offset(text, d.start),
                end: char_to_utf16_offset(text, d.end),
                mode: d.mode,
            })
            .collect();
        Ok(to_js(&decorations))
    }

    #[wasm_bindgen(js_name = getText)]
    pub fn get_text(&self, block_key: &str) -> Result<String, JsValue> {
        Ok(self.inner.text(block_key)?.to_string())
    }

    /// `{ blockKey, offset }` with a UTF-16 offset, or `null` before the first change
    #[wasm_bindgen(js_name = getCaret)]
    pub fn get_caret(&self) -> JsValue {
        let Some(caret) = self.inner.caret() else {
            return JsValue::NULL;
        };
        let Ok(text) = self.inner.text(&caret.block_key) else {
            return JsValue::NULL;
        };
        to_js(&JsCaret {
            block_key: &caret.block_key,
            offset: char_to_utf16_offset(text, caret.offset),
        })
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> JsValue {
        to_js(self.inner.stats())
    }

    /// Install `(blockKey, offsetUtf16) => { left, top } | null` for panel placement
    #[wasm_bindgen(js_name = setGeometryProvider)]
    pub fn set_geometry_provider(&mut self, callback: js_sys::Function) {
        self.inner.set_geometry(Box::new(JsGeometry { callback }));
    }
}
