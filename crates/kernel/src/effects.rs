//! Per-frame animated state: the water's wave factor and flickering lights.

/// Scroll offset for the water's distortion lookups, wrapped to `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveFactor {
    value: f32,
    speed: f32,
}

impl WaveFactor {
    pub fn new(speed: f32) -> Self {
        Self { value: 0.0, speed }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance one frame and return the new value.
    pub fn advance(&mut self) -> f32 {
        self.value = (self.value + self.speed).rem_euclid(1.0);
        self.value
    }
}

/// A named light channel whose intensity wobbles between 1.0 and 1.5.
///
/// Channels group lights for lookup; every channel follows the same
/// flicker, so two rooms never drift out of step.
#[derive(Debug, Clone, PartialEq)]
pub struct FlickerChannel {
    pub name: String,
    phase: f32,
    intensity: f32,
}

impl FlickerChannel {
    pub fn intensity(&self) -> f32 {
        self.intensity
    }
}

/// Seeded flicker generator for every channel in the scene.
///
/// One random draw per frame moves the shared flicker phase. Given the same
/// seed, the intensity sequence is identical across runs and platforms.
#[derive(Debug, Clone)]
pub struct LightRig {
    channels: Vec<FlickerChannel>,
    state: u64,
    step: f32,
}

impl LightRig {
    pub fn new(seed: u64, step: f32) -> Self {
        Self {
            channels: Vec::new(),
            state: seed,
            step,
        }
    }

    /// Register a channel, returning its index. Names are unique; adding an
    /// existing name returns the existing index.
    pub fn add_channel(&mut self, name: &str) -> usize {
        if let Some(index) = self.channel_index(name) {
            return index;
        }
        self.channels.push(FlickerChannel {
            name: name.to_string(),
            phase: 0.0,
            intensity: flicker_intensity(0.0),
        });
        self.channels.len() - 1
    }

    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.name == name)
    }

    pub fn channels(&self) -> &[FlickerChannel] {
        &self.channels
    }

    /// Current intensity of a channel. Unknown indices are dark.
    pub fn intensity(&self, channel: usize) -> f32 {
        self.channels.get(channel).map_or(0.0, |c| c.intensity)
    }

    /// Advance every channel by the same random fraction of the step.
    pub fn advance(&mut self) {
        self.state = splitmix64(self.state);
        let delta = unit_f32(self.state) * self.step;
        for channel in &mut self.channels {
            channel.phase += delta;
            channel.intensity = flicker_intensity(channel.phase);
        }
    }
}

/// `(sin²(phase) + 2) / 2`, always within `[1.0, 1.5]`.
pub fn flicker_intensity(phase: f32) -> f32 {
    let s = phase.sin();
    (s * s + 2.0) / 2.0
}

/// Top 24 bits as a float in `[0, 1)`.
fn unit_f32(bits: u64) -> f32 {
    (bits >> 40) as f32 / (1u64 << 24) as f32
}

/// Deterministic hash: mix the state using splitmix64 for reproducibility
/// across platforms.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_flicker_in_lockstep() {
        let mut rig = LightRig::new(42, 0.1);
        let boat = rig.add_channel("boat");
        let cabin = rig.add_channel("cabin");
        let mut solo = LightRig::new(42, 0.1);
        solo.add_channel("boat");
        let mut moved = false;
        for _ in 0..100 {
            rig.advance();
            solo.advance();
            assert_eq!(rig.intensity(boat).to_bits(), rig.intensity(cabin).to_bits());
            // Channel count does not change the draw sequence.
            assert_eq!(rig.intensity(boat).to_bits(), solo.intensity(0).to_bits());
            moved |= rig.intensity(boat) != 1.0;
        }
        assert!(moved);
    }

    #[test]
    fn wave_factor_wraps_below_one() {
        let mut wave = WaveFactor::new(0.3);
        let values: Vec<f32> = (0..4).map(|_| wave.advance()).collect();
        assert!((values[2] - 0.9).abs() < 1e-6);
        assert!((values[3] - 0.2).abs() < 1e-5);
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn wave_factor_small_step_accumulates() {
        let mut wave = WaveFactor::new(0.0003);
        for _ in 0..1000 {
            wave.advance();
        }
        assert!((wave.value() - 0.3).abs() < 1e-4);
    }

    #[test]
    fn flicker_stays_in_range() {
        let mut rig = LightRig::new(42, 0.1);
        let a = rig.add_channel("boat");
        let b = rig.add_channel("cabin");
        for _ in 0..500 {
            rig.advance();
            for i in [a, b] {
                let v = rig.intensity(i);
                assert!((1.0..=1.5).contains(&v), "intensity {v}");
            }
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut r1 = LightRig::new(7, 0.1);
        let mut r2 = LightRig::new(7, 0.1);
        r1.add_channel("boat");
        r2.add_channel("boat");
        for _ in 0..100 {
            r1.advance();
            r2.advance();
            assert_eq!(r1.intensity(0), r2.intensity(0));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut r1 = LightRig::new(1, 0.1);
        let mut r2 = LightRig::new(2, 0.1);
        r1.add_channel("boat");
        r2.add_channel("boat");
        for _ in 0..10 {
            r1.advance();
            r2.advance();
        }
        assert_ne!(r1.intensity(0), r2.intensity(0));
    }

    #[test]
    fn duplicate_channel_names_share_an_index() {
        let mut rig = LightRig::new(0, 0.1);
        assert_eq!(rig.add_channel("boat"), 0);
        assert_eq!(rig.add_channel("cabin"), 1);
        assert_eq!(rig.add_channel("boat"), 0);
        assert_eq!(rig.channels().len(), 2);
        assert_eq!(rig.intensity(9), 0.0);
    }

    #[test]
    fn unit_f32_is_half_open() {
        assert_eq!(unit_f32(0), 0.0);
        assert!(unit_f32(u64::MAX) < 1.0);
    }
}
