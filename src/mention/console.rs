//! Browser console logging
//!
//! Only emits on `wasm32`; native builds (and unit tests) compile the calls away
//! because wasm-bindgen imports cannot be invoked off the browser.

macro_rules! console_debug {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::debug_1(&wasm_bindgen::JsValue::from_str(&format!($($arg)*)));
        #[cfg(not(target_arch = "wasm32"))]
        let _ = || format!($($arg)*);
    }};
}

macro_rules! console_error {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::error_1(&wasm_bindgen::JsValue::from_str(&format!($($arg)*)));
        #[cfg(not(target_arch = "wasm32"))]
        let _ = || format!($($arg)*);
    }};
}
