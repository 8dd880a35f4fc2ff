// src/state/param_info.rs
//
// Parameter metadata for host display and validation.

use std::fmt;

use super::params::param_ids;

/// Unique identifier for an engine parameter.
pub type ParamId = u32;

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamUnit {
    #[default]
    None,
    /// Hertz (frequency)
    Hz,
    /// Seconds
    Seconds,
    /// Semitones
    Semitones,
    /// Cents
    Cents,
    /// Fraction of grain length
    Ratio,
    /// Pan (-1 to +1)
    Pan,
}

impl fmt::Display for ParamUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamUnit::None => Ok(()),
            ParamUnit::Hz => write!(f, "Hz"),
            ParamUnit::Seconds => write!(f, "s"),
            ParamUnit::Semitones => write!(f, "st"),
            ParamUnit::Cents => write!(f, "ct"),
            ParamUnit::Ratio => write!(f, "x"),
            ParamUnit::Pan => Ok(()),
        }
    }
}

/// Metadata describing a parameter.
///
/// Used by hosts to:
/// - Build controls with the right range
/// - Validate input ranges
/// - Format values for display
#[derive(Debug, Clone, Copy)]
pub struct ParamInfo {
    pub id: ParamId,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: ParamUnit,
    /// Step size for discrete parameters (0 = continuous)
    pub step: f32,
}

impl ParamInfo {
    pub const fn new(id: ParamId, name: &'static str) -> Self {
        Self {
            id,
            name,
            min: 0.0,
            max: 1.0,
            default: 0.0,
            unit: ParamUnit::None,
            step: 0.0,
        }
    }

    pub const fn range(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub const fn default(mut self, value: f32) -> Self {
        self.default = value;
        self
    }

    pub const fn unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    pub const fn discrete(mut self) -> Self {
        self.step = 1.0;
        self
    }

    /// Clamp a value to the valid range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Normalize a value to 0..1 range.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        (value - self.min) / (self.max - self.min)
    }

    /// Denormalize a 0..1 value to the parameter range.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized * (self.max - self.min)
    }

    /// Format a value for display.
    pub fn format(&self, value: f32) -> String {
        let precision = if self.step > 0.0 { 0 } else { 2 };
        match self.unit {
            ParamUnit::None | ParamUnit::Pan => format!("{:.prec$}", value, prec = precision),
            unit => format!("{:.prec$} {}", value, unit, prec = precision),
        }
    }
}

// Indexed by parameter id.
static PARAM_INFOS: [ParamInfo; param_ids::COUNT] = [
    ParamInfo::new(param_ids::GRAIN_SIZE, "Grain Size")
        .range(0.01, 0.5)
        .default(0.3)
        .unit(ParamUnit::Seconds),
    ParamInfo::new(param_ids::DENSITY, "Density")
        .range(0.005, 10.0)
        .default(0.15)
        .unit(ParamUnit::Seconds),
    ParamInfo::new(param_ids::SPREAD, "Spread").range(0.0, 2.0),
    ParamInfo::new(param_ids::POSITION, "Position"),
    ParamInfo::new(param_ids::REVERSAL_CHANCE, "Reversal Chance"),
    ParamInfo::new(param_ids::PAN, "Pan")
        .range(-1.0, 1.0)
        .unit(ParamUnit::Pan),
    ParamInfo::new(param_ids::PAN_SPREAD, "Pan Spread"),
    ParamInfo::new(param_ids::PITCH, "Pitch")
        .range(-24.0, 24.0)
        .unit(ParamUnit::Semitones),
    ParamInfo::new(param_ids::DETUNE, "Detune")
        .range(0.0, 100.0)
        .unit(ParamUnit::Cents),
    ParamInfo::new(param_ids::FM_FREQ, "FM Frequency")
        .range(0.0, 1000.0)
        .unit(ParamUnit::Hz),
    ParamInfo::new(param_ids::FM_AMOUNT, "FM Amount").range(0.0, 100.0),
    ParamInfo::new(param_ids::ATTACK, "Attack")
        .range(0.01, 0.9)
        .default(0.5)
        .unit(ParamUnit::Ratio),
    ParamInfo::new(param_ids::RELEASE, "Release")
        .range(0.01, 0.9)
        .default(0.5)
        .unit(ParamUnit::Ratio),
    ParamInfo::new(param_ids::ENVELOPE_CURVE, "Envelope Curve").discrete(),
    ParamInfo::new(param_ids::LFO_RATE, "LFO Rate")
        .range(0.1, 20.0)
        .default(1.0)
        .unit(ParamUnit::Hz),
    ParamInfo::new(param_ids::LFO_AMOUNT, "LFO Amount"),
    ParamInfo::new(param_ids::LFO_SHAPE, "LFO Shape")
        .range(0.0, 3.0)
        .discrete(),
    ParamInfo::new(param_ids::VOLUME, "Volume").default(0.8),
    ParamInfo::new(param_ids::FILTER_FREQ, "Filter Frequency")
        .range(20.0, 20000.0)
        .default(20000.0)
        .unit(ParamUnit::Hz),
    ParamInfo::new(param_ids::FILTER_RES, "Filter Resonance").range(0.0, 30.0),
    ParamInfo::new(param_ids::DIST_AMOUNT, "Distortion"),
    ParamInfo::new(param_ids::DELAY_TIME, "Delay Time")
        .range(0.01, 2.0)
        .default(0.3)
        .unit(ParamUnit::Seconds),
    ParamInfo::new(param_ids::DELAY_FEEDBACK, "Delay Feedback")
        .range(0.0, 0.95)
        .default(0.3),
    ParamInfo::new(param_ids::DELAY_MIX, "Delay Mix"),
    ParamInfo::new(param_ids::REVERB_MIX, "Reverb Mix"),
    ParamInfo::new(param_ids::REVERB_DECAY, "Reverb Decay")
        .range(0.1, 10.0)
        .default(2.0)
        .unit(ParamUnit::Seconds),
];

/// Metadata for every engine parameter, ordered by id.
pub fn engine_param_infos() -> &'static [ParamInfo] {
    &PARAM_INFOS
}

/// Metadata for a single parameter.
pub fn param_info(id: ParamId) -> Option<&'static ParamInfo> {
    PARAM_INFOS.get(id as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulation::ModTarget;

    #[test]
    fn test_ids_match_table_order() {
        for (i, info) in engine_param_infos().iter().enumerate() {
            assert_eq!(info.id as usize, i, "{} is out of order", info.name);
            assert!(info.min < info.max);
            assert!(info.default >= info.min && info.default <= info.max);
        }
    }

    #[test]
    fn test_ranges_agree_with_modulation_routes() {
        let pairs = [
            (param_ids::GRAIN_SIZE, ModTarget::GrainSize),
            (param_ids::DENSITY, ModTarget::Density),
            (param_ids::SPREAD, ModTarget::Spread),
            (param_ids::POSITION, ModTarget::Position),
            (param_ids::PITCH, ModTarget::Pitch),
            (param_ids::FM_FREQ, ModTarget::FmFreq),
            (param_ids::FM_AMOUNT, ModTarget::FmAmount),
            (param_ids::FILTER_FREQ, ModTarget::FilterFreq),
            (param_ids::FILTER_RES, ModTarget::FilterRes),
            (param_ids::ATTACK, ModTarget::Attack),
            (param_ids::RELEASE, ModTarget::Release),
            (param_ids::DIST_AMOUNT, ModTarget::DistAmount),
            (param_ids::DELAY_MIX, ModTarget::DelayMix),
            (param_ids::DELAY_TIME, ModTarget::DelayTime),
            (param_ids::DELAY_FEEDBACK, ModTarget::DelayFeedback),
            (param_ids::PAN, ModTarget::Pan),
            (param_ids::PAN_SPREAD, ModTarget::PanSpread),
        ];
        for (id, target) in pairs {
            let info = param_info(id).unwrap();
            let route = target.route();
            assert_eq!((info.min, info.max), (route.min, route.max), "{:?}", target);
        }
    }

    #[test]
    fn test_normalize_roundtrip_endpoints() {
        let info = param_info(param_ids::PITCH).unwrap();
        assert_eq!(info.normalize(-24.0), 0.0);
        assert_eq!(info.normalize(24.0), 1.0);
        assert_eq!(info.denormalize(0.5), 0.0);
    }

    #[test]
    fn test_format() {
        let info = param_info(param_ids::GRAIN_SIZE).unwrap();
        assert_eq!(info.format(0.25), "0.25 s");
        let info = param_info(param_ids::LFO_SHAPE).unwrap();
        assert_eq!(info.format(2.0), "2");
    }
}
