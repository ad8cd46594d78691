use std::sync::{Arc, LazyLock};

use bevy::prelude::*;
use parking_lot::Mutex;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::MessageEvent;

use crate::messages::{EffectMessage, HostMessage};
use crate::theme::{self, CurrentTheme, Theme};

pub static HOST_MESSAGE_QUEUE: LazyLock<Arc<Mutex<Vec<HostMessage>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

#[cfg(not(target_arch = "wasm32"))]
pub static EFFECT_MESSAGE_QUEUE: LazyLock<Arc<Mutex<Vec<EffectMessage>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

#[cfg(target_arch = "wasm32")]
pub fn listen_host_messages() {
    let window = web_sys::window().expect("no global `window` exists");
    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        let message: Result<HostMessage, serde_wasm_bindgen::Error> =
            serde_wasm_bindgen::from_value(event.data());

        let Ok(message) = message else {
            // The page also posts messages that are not for us (analytics,
            // extensions); ignore anything that does not parse.
            return;
        };

        HOST_MESSAGE_QUEUE.lock().push(message);
    }) as Box<dyn FnMut(MessageEvent)>);

    window
        .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        .expect("failed to add message event listener");

    closure.forget(); // Leaks memory, but ensures the closure lives for the lifetime of the program
}

#[cfg(not(target_arch = "wasm32"))]
pub fn send_effect_message(message: EffectMessage) {
    EFFECT_MESSAGE_QUEUE.lock().push(message);
}

#[cfg(target_arch = "wasm32")]
pub fn send_effect_message(message: EffectMessage) {
    let window = web_sys::window().expect("no global `window` exists");
    let Ok(message_str) = serde_wasm_bindgen::to_value(&message) else {
        error!("Could not serialize {message:?}");
        return;
    };

    let Ok(Some(parent_window)) = window.parent() else {
        error!("{message:?} not sent, parent_window not found.");
        return;
    };

    if let Err(err) = parent_window.post_message(&message_str, "*") {
        error!("Could not post message {message_str:?}. {err:?}");
    };
}

/// Host-driven lifecycle hooks an effect implements.
///
/// The functions are not meant to be called directly from the effect itself;
/// the communication plugin invokes them while draining the message queue.
pub trait HostMessageHandler: Send + Sync + Default + 'static {
    fn set_theme(world: &mut World, theme: Theme);
    fn restart(world: &mut World);

    /// Host-reported interaction state; effects without an idle animation
    /// can ignore it.
    fn set_interacting(_world: &mut World, _interacting: bool) {}
}

fn apply_theme<T: HostMessageHandler>(world: &mut World, theme: Theme) {
    if let Err(err) = theme::save_theme(theme) {
        warn!("could not persist theme preference: {err}");
    }
    T::set_theme(world, theme);
    send_effect_message(EffectMessage::ThemeStored(theme));
}

pub(crate) fn process_host_messages<T: HostMessageHandler>(world: &mut World) {
    let messages = HOST_MESSAGE_QUEUE.lock().drain(..).collect::<Vec<_>>();

    for message in messages {
        match message {
            HostMessage::SetTheme(theme) => apply_theme::<T>(world, theme),
            HostMessage::ToggleTheme => {
                let current = world
                    .get_resource::<CurrentTheme>()
                    .map_or_else(theme::initial_theme, |current| current.0);
                apply_theme::<T>(world, current.toggled());
            }
            HostMessage::SetInteracting(interacting) => T::set_interacting(world, interacting),
            HostMessage::Restart => T::restart(world),
        }
    }
}

fn ready() {
    send_effect_message(EffectMessage::Ready);
}

#[derive(Default)]
pub struct HostCommunicationPlugin<T: HostMessageHandler>(core::marker::PhantomData<T>);

impl<T: HostMessageHandler> Plugin for HostCommunicationPlugin<T> {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, process_host_messages::<T>);
        #[cfg(target_arch = "wasm32")]
        {
            app.add_systems(Startup, listen_host_messages);
        }
        app.add_systems(PostStartup, ready);
    }
}
