//! MentionCore: Trigger-token autocomplete core for rich-text editors
//!
//! A Rust/WASM implementation of the KittClouds mention editor logic.
//!
//! # Architecture
//!
//! ## Mention Components
//! - `trigger.rs` - TriggerRegistry: ordered `#tag`, `@person`, `<>relation` patterns
//! - `scanner.rs` - MatchScanner: active-token detection around the caret
//! - `candidates.rs` - CandidateSource: prefix filtering + alphabetical ranking
//! - `annotation.rs` - AnnotationTable: filling/submitted ranges per block
//! - `document.rs` - Document model: blocks, caret, spans, text edits
//! - `controller.rs` - CompletionController: active match, selection, commit, key policy
//! - `engine.rs` - MentionEngine: native facade tying everything together
//! - `wasm.rs` - MentionEditor: JS facade for the browser editor host
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { MentionEditor } from 'mentioncore';
//!
//! await init();
//!
//! const editor = new MentionEditor();
//! editor.hydrateCandidates({
//!   tags: ['work', 'world'],
//!   persons: ['Ada Lovelace'],
//!   ideas: ['depends on'],
//! });
//! editor.insertBlock('b1', '');
//!
//! // On every editor change
//! editor.onChange('b1', 'hello #wo', 9);
//! console.log(editor.getActiveMatch()); // { candidates: ['work', 'world'], selectedIndex: 0, ... }
//!
//! // Enter / Tab / Space (hashtags only)
//! editor.handleKeyCommand('autocomplete');
//! console.log(editor.getText('b1')); // "hello #work "
//! ```

// Mention modules
pub mod mention;

// Public exports
pub use mention::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("mentioncore v{}", env!("CARGO_PKG_VERSION"))
}
