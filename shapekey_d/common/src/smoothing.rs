/// Single-pole low-pass ("lerp") for one output axis.
///
/// The stored value follows the input even while smoothing is disabled, so
/// switching it on mid-session starts from the current output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lerp {
    value: f32,
}

impl Lerp {
    pub fn new(value: f32) -> Self {
        Self { value }
    }

    pub fn filter(&mut self, target: f32, enabled: bool, factor: f32) -> f32 {
        if enabled {
            self.value += (target - self.value) * factor;
        } else {
            self.value = target;
        }
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}
