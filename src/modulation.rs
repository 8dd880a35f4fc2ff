// src/modulation.rs
//
// LFO modulation routing.
//
// Every modulatable parameter is identified by a `ModTarget`. Each target maps
// to a fixed (scale, min, max) route. The LFO is sampled once per block and the
// same value and depth feed every selected target.

/// Parameters the LFO can be routed to.
///
/// Discriminants are the bit positions of the host-side target mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModTarget {
    GrainSize = 0,
    Density = 1,
    Spread = 2,
    Position = 3,
    Pitch = 4,
    FmFreq = 5,
    FmAmount = 6,
    FilterFreq = 7,
    FilterRes = 8,
    Attack = 9,
    Release = 10,
    DistAmount = 11,
    DelayMix = 12,
    DelayTime = 13,
    DelayFeedback = 14,
    Pan = 15,
    PanSpread = 16,
}

impl ModTarget {
    pub const COUNT: usize = 17;

    pub const ALL: [ModTarget; Self::COUNT] = [
        ModTarget::GrainSize,
        ModTarget::Density,
        ModTarget::Spread,
        ModTarget::Position,
        ModTarget::Pitch,
        ModTarget::FmFreq,
        ModTarget::FmAmount,
        ModTarget::FilterFreq,
        ModTarget::FilterRes,
        ModTarget::Attack,
        ModTarget::Release,
        ModTarget::DistAmount,
        ModTarget::DelayMix,
        ModTarget::DelayTime,
        ModTarget::DelayFeedback,
        ModTarget::Pan,
        ModTarget::PanSpread,
    ];

    #[inline]
    pub fn bit(self) -> u32 {
        1 << self as u32
    }

    /// Scale and clamp range for this target.
    #[inline]
    pub fn route(self) -> ModRoute {
        ROUTES[self as usize]
    }
}

/// How an LFO offset is applied to one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModRoute {
    /// LFO offset at full depth and full swing
    pub scale: f32,
    pub min: f32,
    pub max: f32,
}

impl ModRoute {
    const fn new(scale: f32, min: f32, max: f32) -> Self {
        Self { scale, min, max }
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

// Indexed by `ModTarget as usize`.
const ROUTES: [ModRoute; ModTarget::COUNT] = [
    ModRoute::new(0.2, 0.01, 0.5),       // grain size (s)
    ModRoute::new(0.1, 0.005, 10.0),     // density (s between grains)
    ModRoute::new(1.0, 0.0, 2.0),        // spread
    ModRoute::new(0.5, 0.0, 1.0),        // position
    ModRoute::new(24.0, -24.0, 24.0),    // pitch (st)
    ModRoute::new(200.0, 0.0, 1000.0),   // fm freq (Hz)
    ModRoute::new(50.0, 0.0, 100.0),     // fm amount
    ModRoute::new(5000.0, 20.0, 20000.0), // filter freq (Hz)
    ModRoute::new(10.0, 0.0, 30.0),      // filter resonance
    ModRoute::new(0.5, 0.01, 0.9),       // attack ratio
    ModRoute::new(0.5, 0.01, 0.9),       // release ratio
    ModRoute::new(0.5, 0.0, 1.0),        // distortion
    ModRoute::new(0.5, 0.0, 1.0),        // delay mix
    ModRoute::new(0.5, 0.01, 2.0),       // delay time (s)
    ModRoute::new(0.5, 0.0, 0.95),       // delay feedback
    ModRoute::new(1.0, -1.0, 1.0),       // pan
    ModRoute::new(1.0, 0.0, 1.0),        // pan spread
];

/// Set of targets the LFO is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModTargets(u32);

impl ModTargets {
    const VALID_BITS: u32 = (1 << ModTarget::COUNT) - 1;

    pub const NONE: ModTargets = ModTargets(0);

    /// Decode a host bit mask. Bits beyond the known targets are ignored.
    #[inline]
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & Self::VALID_BITS)
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn contains(self, target: ModTarget) -> bool {
        self.0 & target.bit() != 0
    }

    #[inline]
    pub fn with(self, target: ModTarget) -> Self {
        Self(self.0 | target.bit())
    }

    pub fn iter(self) -> impl Iterator<Item = ModTarget> {
        ModTarget::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<ModTarget> for ModTargets {
    fn from_iter<I: IntoIterator<Item = ModTarget>>(iter: I) -> Self {
        iter.into_iter().fold(ModTargets::NONE, ModTargets::with)
    }
}

/// Apply an LFO offset to a base value.
///
/// Returns `base` unchanged when the target is not selected; otherwise the
/// offset value clamped into `[min, max]`.
#[inline]
pub fn modulate(
    base: f32,
    selected: bool,
    lfo_value: f32,
    lfo_depth: f32,
    scale: f32,
    min: f32,
    max: f32,
) -> f32 {
    if !selected {
        return base;
    }
    (base + lfo_value * lfo_depth * scale).clamp(min, max)
}

/// Per-block modulation state: the active targets plus the cached LFO sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModContext {
    pub targets: ModTargets,
    pub lfo_value: f32,
    pub depth: f32,
}

impl ModContext {
    /// Route `base` through `target`, without range enforcement on
    /// unselected targets.
    #[inline]
    pub fn modulate(&self, target: ModTarget, base: f32) -> f32 {
        let route = target.route();
        modulate(
            base,
            self.targets.contains(target),
            self.lfo_value,
            self.depth,
            route.scale,
            route.min,
            route.max,
        )
    }

    /// Route `base` through `target` and clamp into the target's range even
    /// when it is not selected. Used wherever a value feeds grain math.
    #[inline]
    pub fn resolve(&self, target: ModTarget, base: f32) -> f32 {
        target.route().clamp(self.modulate(target, base))
    }
}
