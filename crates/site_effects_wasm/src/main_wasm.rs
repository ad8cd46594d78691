#![allow(
    clippy::allow_attributes,
    reason = "allow attributes are needed for wasm"
)]
// This crate is meant to run a single site effect

use core::str::FromStr;

use wasm_bindgen::prelude::*;
use web_sys::console;

use crate::Effect;

/// The effects mount into a dedicated canvas; pages without one simply do
/// not get them.
fn effect_surface_present() -> bool {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| {
            document
                .query_selector(effect_helpers::EFFECT_CANVAS_SELECTOR)
                .ok()
        })
        .flatten()
        .is_some()
}

pub(crate) fn main_wasm() -> Result<(), JsValue> {
    if !effect_surface_present() {
        console::warn_1(
            &format!(
                "{} not found, skipping site effects",
                effect_helpers::EFFECT_CANVAS_SELECTOR
            )
            .into(),
        );
        return Ok(());
    }

    let Some(name) = effect_helpers::host_param("effect") else {
        return Err(JsValue::from_str("Missing `effect` query parameter"));
    };
    let Ok(effect) = Effect::from_str(&name) else {
        return Err(JsValue::from_str(&format!("Invalid effect: {name}")));
    };
    console::log_1(&format!("Starting {effect}").into());
    effect.run();
    Ok(())
}
