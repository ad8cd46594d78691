#[cfg(not(target_arch = "wasm32"))]
use core::str::FromStr;

use strum::{Display, EnumString};

#[cfg(target_arch = "wasm32")]
mod main_wasm;

/// The effects a page can mount, keyed by the name the host passes in.
#[derive(Clone, Copy, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum Effect {
    PixelTrail,
    BentoGlow,
}

impl Effect {
    fn run(self) {
        match self {
            Self::PixelTrail => pixel_trail::run(),
            Self::BentoGlow => bento_glow::run(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() -> Result<(), wasm_bindgen::prelude::JsValue> {
    main_wasm::main_wasm()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    // Native dev runs pick the effect with the EFFECT environment variable.
    let effect = effect_helpers::host_param("effect")
        .and_then(|name| Effect::from_str(&name).ok())
        .unwrap_or(Effect::PixelTrail);
    effect.run();
}
