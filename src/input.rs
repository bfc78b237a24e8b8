//! Keyboard and slider input.
//!
//! Keys rotate the mesh (`w`/`s` vertically, `a`/`d` horizontally). The four
//! lighting sliders are `<input type="range">` elements on the web; natively
//! they are stepped with the number keys `1`..`8`.

use crate::{config::SliderConfig, scene::Scene};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SliderId {
    Ambient,
    C1,
    C2,
    LightOuter,
}

impl SliderId {
    pub const ALL: [SliderId; 4] = [
        SliderId::Ambient,
        SliderId::C1,
        SliderId::C2,
        SliderId::LightOuter,
    ];

    /// Element id of the matching range input in the host page.
    pub fn dom_id(self) -> &'static str {
        match self {
            SliderId::Ambient => "myRange",
            SliderId::C1 => "c1-range",
            SliderId::C2 => "c2-range",
            SliderId::LightOuter => "light-outer-range",
        }
    }

    fn index(self) -> usize {
        match self {
            SliderId::Ambient => 0,
            SliderId::C1 => 1,
            SliderId::C2 => 2,
            SliderId::LightOuter => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub initial: f32,
}

impl SliderRange {
    /// Number of key presses needed to sweep the whole range.
    pub const STEPS: f32 = 20.0;

    pub const fn new(min: f32, max: f32, initial: f32) -> Self {
        Self { min, max, initial }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn step(&self) -> f32 {
        (self.max - self.min) / Self::STEPS
    }
}

/// Current positions of the four sliders.
#[derive(Clone, Debug)]
pub struct Sliders {
    ranges: [SliderRange; 4],
    values: [f32; 4],
}

impl Sliders {
    pub fn new(config: &SliderConfig) -> Self {
        let ranges = [config.ambient, config.c1, config.c2, config.light_outer];
        let values = ranges.map(|range| range.initial);
        Self { ranges, values }
    }

    pub fn value(&self, id: SliderId) -> f32 {
        self.values[id.index()]
    }

    pub fn range(&self, id: SliderId) -> SliderRange {
        self.ranges[id.index()]
    }

    /// Store the position a slider control reports, as reported.
    pub fn set(&mut self, id: SliderId, value: f32) -> f32 {
        self.values[id.index()] = value;
        value
    }

    /// Move a slider by `steps` increments, clamped to its range. Returns the
    /// new position.
    pub fn nudge(&mut self, id: SliderId, steps: i32) -> f32 {
        let range = self.ranges[id.index()];
        self.set(id, range.clamp(self.value(id) + range.step() * steps as f32))
    }
}

/// What a key press does to the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Rotate { horizontal: f32, vertical: f32 },
    Slide { slider: SliderId, steps: i32 },
}

/// Maps logical key names to actions.
#[derive(Clone, Copy, Debug)]
pub struct KeyBindings {
    pub rotation_step: f32,
}

impl KeyBindings {
    pub fn new(rotation_step: f32) -> Self {
        Self { rotation_step }
    }

    pub fn action_for(&self, key: &str) -> Option<Action> {
        let step = self.rotation_step;
        let rotate = |horizontal, vertical| Some(Action::Rotate { horizontal, vertical });
        let slide = |slider, steps| Some(Action::Slide { slider, steps });
        match key {
            "w" => rotate(0.0, -step),
            "s" => rotate(0.0, step),
            "a" => rotate(-step, 0.0),
            "d" => rotate(step, 0.0),
            "1" => slide(SliderId::Ambient, -1),
            "2" => slide(SliderId::Ambient, 1),
            "3" => slide(SliderId::C1, -1),
            "4" => slide(SliderId::C1, 1),
            "5" => slide(SliderId::C2, -1),
            "6" => slide(SliderId::C2, 1),
            "7" => slide(SliderId::LightOuter, -1),
            "8" => slide(SliderId::LightOuter, 1),
            _ => None,
        }
    }
}

/// The single writer of [`Scene`] state outside of setup.
#[derive(Clone, Debug)]
pub struct InputState {
    bindings: KeyBindings,
    sliders: Sliders,
}

impl InputState {
    pub fn new(rotation_step: f32, sliders: &SliderConfig) -> Self {
        Self {
            bindings: KeyBindings::new(rotation_step),
            sliders: Sliders::new(sliders),
        }
    }

    pub fn sliders(&self) -> &Sliders {
        &self.sliders
    }

    /// Apply a key-down. Returns `false` for unbound keys.
    pub fn on_key(&mut self, key: &str, scene: &mut Scene) -> bool {
        match self.bindings.action_for(key) {
            Some(Action::Rotate {
                horizontal,
                vertical,
            }) => {
                scene.rotation.rotate(horizontal, vertical);
                true
            }
            Some(Action::Slide { slider, steps }) => {
                let value = self.sliders.nudge(slider, steps);
                scene.params.apply(slider, value);
                log::info!("{:?} slider at {}", slider, value);
                true
            }
            None => false,
        }
    }

    /// Apply a value reported by a slider control.
    pub fn on_slider(&mut self, slider: SliderId, value: f32, scene: &mut Scene) {
        let value = self.sliders.set(slider, value);
        scene.params.apply(slider, value);
    }
}

/// Hook the range inputs of the host page up to `on_input`.
///
/// Missing elements are skipped with a warning; the coefficient keeps its
/// initial value. The light-outer input is reset to its initial value.
#[cfg(target_arch = "wasm32")]
pub fn bind_dom_sliders(
    sliders: &SliderConfig,
    on_input: impl Fn(SliderId, f32) + Clone + 'static,
) -> anyhow::Result<()> {
    use anyhow::{Context, anyhow};
    use wasm_bindgen::{JsCast, closure::Closure};

    let document = web_sys::window()
        .and_then(|window| window.document())
        .context("no document to bind sliders to")?;

    for id in SliderId::ALL {
        let Some(element) = document.get_element_by_id(id.dom_id()) else {
            log::warn!("no #{} element, {:?} keeps its initial value", id.dom_id(), id);
            continue;
        };
        let input: web_sys::HtmlInputElement = element
            .dyn_into()
            .map_err(|_| anyhow!("#{} is not an input element", id.dom_id()))?;
        if id == SliderId::LightOuter {
            input.set_value(&sliders.light_outer.initial.to_string());
        }

        let source = input.clone();
        let on_input = on_input.clone();
        let closure = Closure::<dyn FnMut()>::new(move || match source.value().parse::<f32>() {
            Ok(value) => on_input(id, value),
            Err(e) => log::warn!("#{} reported a non-numeric value: {}", id.dom_id(), e),
        });
        input.set_oninput(Some(closure.as_ref().unchecked_ref()));
        // The page outlives the demo; the listener is never removed.
        closure.forget();
    }
    Ok(())
}
