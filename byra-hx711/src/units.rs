//! Metric & imperial weight values. Each family stores a single base value (grams or pounds)
//! and every other unit is derived from it on access.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::ConversionError;

/// Grams in one avoirdupois pound.
pub const GRAMS_PER_POUND: f64 = 453.59237;

const PICO: f64 = 1e12;
const NANO: f64 = 1e9;
const MICRO: f64 = 1e6;
const MILLI: f64 = 1e3;
const KILO: f64 = 1e3;
const MEGA: f64 = 1e6;

const OUNCES_PER_POUND: f64 = 16.0;
const GRAINS_PER_POUND: f64 = 7000.0;
const POUNDS_PER_STONE: f64 = 14.0;
const POUNDS_PER_TON: f64 = 2240.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum WeightSystem {
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum MetricUnit {
    #[default]
    Grams,
    Milligrams,
    Micrograms,
    Nanograms,
    Picograms,
    Kilograms,
    Megagrams,
    /// Same as [MetricUnit::Megagrams].
    Tonnes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum ImperialUnit {
    #[default]
    Pounds,
    Ounces,
    Grains,
    Stones,
    Tons,
}

impl MetricUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            MetricUnit::Grams => "g",
            MetricUnit::Milligrams => "mg",
            MetricUnit::Micrograms => "µg",
            MetricUnit::Nanograms => "ng",
            MetricUnit::Picograms => "pg",
            MetricUnit::Kilograms => "kg",
            MetricUnit::Megagrams => "Mg",
            MetricUnit::Tonnes => "t",
        }
    }
}

impl ImperialUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            ImperialUnit::Pounds => "lb",
            ImperialUnit::Ounces => "oz",
            ImperialUnit::Grains => "gr",
            ImperialUnit::Stones => "st",
            ImperialUnit::Tons => "ton",
        }
    }
}

impl FromStr for WeightSystem {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(WeightSystem::Metric),
            "imperial" => Ok(WeightSystem::Imperial),
            _ => Err(ConversionError::UnknownSystem(s.to_string())),
        }
    }
}

impl FromStr for MetricUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "g" | "gram" | "grams" => Ok(MetricUnit::Grams),
            "mg" | "milligram" | "milligrams" => Ok(MetricUnit::Milligrams),
            "µg" | "ug" | "microgram" | "micrograms" => Ok(MetricUnit::Micrograms),
            "ng" | "nanogram" | "nanograms" => Ok(MetricUnit::Nanograms),
            "pg" | "picogram" | "picograms" => Ok(MetricUnit::Picograms),
            "kg" | "kilogram" | "kilograms" => Ok(MetricUnit::Kilograms),
            "megagram" | "megagrams" => Ok(MetricUnit::Megagrams),
            "t" | "tonne" | "tonnes" => Ok(MetricUnit::Tonnes),
            _ => Err(ConversionError::UnknownUnit(s.to_string())),
        }
    }
}

impl FromStr for ImperialUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lb" | "lbs" | "pound" | "pounds" => Ok(ImperialUnit::Pounds),
            "oz" | "ounce" | "ounces" => Ok(ImperialUnit::Ounces),
            "gr" | "grain" | "grains" => Ok(ImperialUnit::Grains),
            "st" | "stone" | "stones" => Ok(ImperialUnit::Stones),
            "ton" | "tons" => Ok(ImperialUnit::Tons),
            _ => Err(ConversionError::UnknownUnit(s.to_string())),
        }
    }
}

macro_rules! try_from_string {
    ($($t:ty),*) => {
        $(impl TryFrom<String> for $t {
            type Error = ConversionError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        })*
    };
}

try_from_string!(WeightSystem, MetricUnit, ImperialUnit);

/// A metric weight, kept as grams.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct MetricWeight {
    grams: f64,
}

impl MetricWeight {
    pub fn from_grams(grams: f64) -> Self {
        Self { grams }
    }

    pub fn new(value: f64, unit: MetricUnit) -> Self {
        let grams = match unit {
            MetricUnit::Grams => value,
            MetricUnit::Milligrams => value / MILLI,
            MetricUnit::Micrograms => value / MICRO,
            MetricUnit::Nanograms => value / NANO,
            MetricUnit::Picograms => value / PICO,
            MetricUnit::Kilograms => value * KILO,
            MetricUnit::Megagrams | MetricUnit::Tonnes => value * MEGA,
        };

        Self { grams }
    }

    /// Returns the weight expressed in `unit`.
    pub fn value_in(&self, unit: MetricUnit) -> f64 {
        match unit {
            MetricUnit::Grams => self.grams,
            MetricUnit::Milligrams => self.grams * MILLI,
            MetricUnit::Micrograms => self.grams * MICRO,
            MetricUnit::Nanograms => self.grams * NANO,
            MetricUnit::Picograms => self.grams * PICO,
            MetricUnit::Kilograms => self.grams / KILO,
            MetricUnit::Megagrams | MetricUnit::Tonnes => self.grams / MEGA,
        }
    }

    /// Replaces the weight with `value` given in `unit`.
    pub fn set(&mut self, value: f64, unit: MetricUnit) {
        *self = Self::new(value, unit);
    }

    pub fn grams(&self) -> f64 {
        self.grams
    }

    pub fn picograms(&self) -> f64 {
        self.value_in(MetricUnit::Picograms)
    }

    pub fn nanograms(&self) -> f64 {
        self.value_in(MetricUnit::Nanograms)
    }

    pub fn micrograms(&self) -> f64 {
        self.value_in(MetricUnit::Micrograms)
    }

    pub fn milligrams(&self) -> f64 {
        self.value_in(MetricUnit::Milligrams)
    }

    pub fn kilograms(&self) -> f64 {
        self.value_in(MetricUnit::Kilograms)
    }

    pub fn megagrams(&self) -> f64 {
        self.value_in(MetricUnit::Megagrams)
    }

    pub fn tonnes(&self) -> f64 {
        self.value_in(MetricUnit::Tonnes)
    }

    pub fn set_grams(&mut self, grams: f64) {
        self.set(grams, MetricUnit::Grams);
    }

    pub fn set_picograms(&mut self, picograms: f64) {
        self.set(picograms, MetricUnit::Picograms);
    }

    pub fn set_nanograms(&mut self, nanograms: f64) {
        self.set(nanograms, MetricUnit::Nanograms);
    }

    pub fn set_micrograms(&mut self, micrograms: f64) {
        self.set(micrograms, MetricUnit::Micrograms);
    }

    pub fn set_milligrams(&mut self, milligrams: f64) {
        self.set(milligrams, MetricUnit::Milligrams);
    }

    pub fn set_kilograms(&mut self, kilograms: f64) {
        self.set(kilograms, MetricUnit::Kilograms);
    }

    pub fn set_megagrams(&mut self, megagrams: f64) {
        self.set(megagrams, MetricUnit::Megagrams);
    }

    pub fn set_tonnes(&mut self, tonnes: f64) {
        self.set(tonnes, MetricUnit::Tonnes);
    }
}

impl From<ImperialWeight> for MetricWeight {
    fn from(w: ImperialWeight) -> Self {
        Self::from_grams(w.pounds() * GRAMS_PER_POUND)
    }
}

impl Display for MetricWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*}g", p, self.grams),
            None => write!(f, "{}g", self.grams),
        }
    }
}

/// An imperial (avoirdupois) weight, kept as pounds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ImperialWeight {
    pounds: f64,
}

impl ImperialWeight {
    pub fn from_pounds(pounds: f64) -> Self {
        Self { pounds }
    }

    pub fn new(value: f64, unit: ImperialUnit) -> Self {
        let pounds = match unit {
            ImperialUnit::Pounds => value,
            ImperialUnit::Ounces => value / OUNCES_PER_POUND,
            ImperialUnit::Grains => value / GRAINS_PER_POUND,
            ImperialUnit::Stones => value * POUNDS_PER_STONE,
            ImperialUnit::Tons => value * POUNDS_PER_TON,
        };

        Self { pounds }
    }

    pub fn value_in(&self, unit: ImperialUnit) -> f64 {
        match unit {
            ImperialUnit::Pounds => self.pounds,
            ImperialUnit::Ounces => self.pounds * OUNCES_PER_POUND,
            ImperialUnit::Grains => self.pounds * GRAINS_PER_POUND,
            ImperialUnit::Stones => self.pounds / POUNDS_PER_STONE,
            ImperialUnit::Tons => self.pounds / POUNDS_PER_TON,
        }
    }

    pub fn set(&mut self, value: f64, unit: ImperialUnit) {
        *self = Self::new(value, unit);
    }

    pub fn pounds(&self) -> f64 {
        self.pounds
    }

    pub fn ounces(&self) -> f64 {
        self.value_in(ImperialUnit::Ounces)
    }

    pub fn grains(&self) -> f64 {
        self.value_in(ImperialUnit::Grains)
    }

    pub fn stones(&self) -> f64 {
        self.value_in(ImperialUnit::Stones)
    }

    pub fn tons(&self) -> f64 {
        self.value_in(ImperialUnit::Tons)
    }

    pub fn set_pounds(&mut self, pounds: f64) {
        self.set(pounds, ImperialUnit::Pounds);
    }

    pub fn set_ounces(&mut self, ounces: f64) {
        self.set(ounces, ImperialUnit::Ounces);
    }

    pub fn set_grains(&mut self, grains: f64) {
        self.set(grains, ImperialUnit::Grains);
    }

    pub fn set_stones(&mut self, stones: f64) {
        self.set(stones, ImperialUnit::Stones);
    }

    pub fn set_tons(&mut self, tons: f64) {
        self.set(tons, ImperialUnit::Tons);
    }
}

impl From<MetricWeight> for ImperialWeight {
    fn from(w: MetricWeight) -> Self {
        Self::from_pounds(w.grams() / GRAMS_PER_POUND)
    }
}

impl Display for ImperialWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*}lb", p, self.pounds),
            None => write!(f, "{}lb", self.pounds),
        }
    }
}

/// A weight in either system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitWeight {
    Metric(MetricWeight),
    Imperial(ImperialWeight),
}

impl UnitWeight {
    pub fn system(&self) -> WeightSystem {
        match self {
            UnitWeight::Metric(_) => WeightSystem::Metric,
            UnitWeight::Imperial(_) => WeightSystem::Imperial,
        }
    }

    pub fn to_metric(&self) -> MetricWeight {
        match *self {
            UnitWeight::Metric(m) => m,
            UnitWeight::Imperial(i) => i.into(),
        }
    }

    pub fn to_imperial(&self) -> ImperialWeight {
        match *self {
            UnitWeight::Metric(m) => m.into(),
            UnitWeight::Imperial(i) => i,
        }
    }
}

impl From<MetricWeight> for UnitWeight {
    fn from(w: MetricWeight) -> Self {
        UnitWeight::Metric(w)
    }
}

impl From<ImperialWeight> for UnitWeight {
    fn from(w: ImperialWeight) -> Self {
        UnitWeight::Imperial(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        let tolerance = 1e-9 * a.abs().max(b.abs()).max(f64::MIN_POSITIVE);
        assert!((a - b).abs() <= tolerance, "{a} != {b}");
    }

    #[test]
    fn metric_units_derive_from_grams() {
        let w = MetricWeight::from_grams(2500.0);

        assert_close(w.picograms(), 2.5e15);
        assert_close(w.nanograms(), 2.5e12);
        assert_close(w.micrograms(), 2.5e9);
        assert_close(w.milligrams(), 2.5e6);
        assert_close(w.kilograms(), 2.5);
        assert_close(w.megagrams(), 0.0025);
        assert_eq!(w.megagrams(), w.tonnes());
    }

    #[test]
    fn every_metric_setter_keeps_siblings_consistent() {
        let setters: [(fn(&mut MetricWeight, f64), f64); 8] = [
            (MetricWeight::set_grams, 12.5),
            (MetricWeight::set_picograms, 3.0e14),
            (MetricWeight::set_nanograms, 7.0e9),
            (MetricWeight::set_micrograms, 42.0),
            (MetricWeight::set_milligrams, 900.0),
            (MetricWeight::set_kilograms, 81.3),
            (MetricWeight::set_megagrams, 1.2),
            (MetricWeight::set_tonnes, 0.04),
        ];

        for (set, value) in setters {
            let mut w = MetricWeight::default();
            set(&mut w, value);

            assert_close(w.kilograms() * 1000.0, w.grams());
            assert_close(w.grams() / 1000.0, w.kilograms());
            assert_close(w.milligrams() / 1e3, w.grams());
            assert_close(w.micrograms() / 1e6, w.grams());
            assert_close(w.nanograms() / 1e9, w.grams());
            assert_close(w.picograms() / 1e12, w.grams());
            assert_close(w.megagrams() * 1e6, w.grams());
        }
    }

    #[test]
    fn imperial_units_derive_from_pounds() {
        let w = ImperialWeight::from_pounds(28.0);

        assert_eq!(w.ounces(), 448.0);
        assert_eq!(w.grains(), 196_000.0);
        assert_eq!(w.stones(), 2.0);
        assert_close(w.tons(), 0.0125);
    }

    #[test]
    fn every_imperial_setter_keeps_siblings_consistent() {
        let setters: [(fn(&mut ImperialWeight, f64), f64); 5] = [
            (ImperialWeight::set_pounds, 3.25),
            (ImperialWeight::set_ounces, 52.0),
            (ImperialWeight::set_grains, 12_345.0),
            (ImperialWeight::set_stones, 11.5),
            (ImperialWeight::set_tons, 0.75),
        ];

        for (set, value) in setters {
            let mut w = ImperialWeight::default();
            set(&mut w, value);

            assert_close(w.ounces() / 16.0, w.pounds());
            assert_close(w.grains() / 7000.0, w.pounds());
            assert_close(w.stones() * 14.0, w.pounds());
            assert_close(w.tons() * 2240.0, w.pounds());
        }
    }

    #[test]
    fn imperial_named_units_rewrite_base() {
        assert_eq!(ImperialWeight::new(32.0, ImperialUnit::Ounces).pounds(), 2.0);
        assert_eq!(ImperialWeight::new(7000.0, ImperialUnit::Grains).pounds(), 1.0);
        assert_eq!(ImperialWeight::new(1.5, ImperialUnit::Stones).pounds(), 21.0);
        assert_eq!(ImperialWeight::new(1.0, ImperialUnit::Tons).pounds(), 2240.0);

        let mut w = ImperialWeight::from_pounds(1.0);
        w.set_stones(1.0);
        assert_eq!(w.pounds(), 14.0);
        assert_eq!(w.ounces(), 224.0);
    }

    #[test]
    fn one_pound_in_grams() {
        let metric: MetricWeight = ImperialWeight::from_pounds(1.0).into();
        assert_eq!(metric.grams(), GRAMS_PER_POUND);

        let imperial: ImperialWeight = MetricWeight::from_grams(GRAMS_PER_POUND).into();
        assert_close(imperial.pounds(), 1.0);
    }

    #[test]
    fn grams_survive_round_trip_through_imperial() {
        for grams in [0.0, 1.0, -3.75, 100.0, 453.59237, 1.0e-7, 98_765.4321, 5.0e12] {
            let there: ImperialWeight = MetricWeight::from_grams(grams).into();
            let back: MetricWeight = there.into();

            if grams == 0.0 {
                assert_eq!(back.grams(), 0.0);
            } else {
                assert_close(back.grams(), grams);
            }
        }
    }

    #[test]
    fn unit_weight_conversion_is_exhaustive() {
        let metric = UnitWeight::from(MetricWeight::new(1.0, MetricUnit::Kilograms));
        assert_eq!(metric.system(), WeightSystem::Metric);
        assert_close(metric.to_imperial().pounds(), 1000.0 / GRAMS_PER_POUND);
        assert_eq!(metric.to_metric().grams(), 1000.0);

        let imperial = UnitWeight::from(ImperialWeight::new(16.0, ImperialUnit::Ounces));
        assert_eq!(imperial.system(), WeightSystem::Imperial);
        assert_eq!(imperial.to_metric().grams(), GRAMS_PER_POUND);
    }

    #[test]
    fn parses_unit_names() {
        assert_eq!("kg".parse::<MetricUnit>(), Ok(MetricUnit::Kilograms));
        assert_eq!(" Tonnes ".parse::<MetricUnit>(), Ok(MetricUnit::Tonnes));
        assert_eq!("oz".parse::<ImperialUnit>(), Ok(ImperialUnit::Ounces));
        assert_eq!("Imperial".parse::<WeightSystem>(), Ok(WeightSystem::Imperial));

        assert_eq!(
            "furlong".parse::<ImperialUnit>(),
            Err(ConversionError::UnknownUnit("furlong".into()))
        );
        assert_eq!(
            "cubits".parse::<WeightSystem>(),
            Err(ConversionError::UnknownSystem("cubits".into()))
        );
    }

    #[test]
    fn display_uses_base_unit() {
        assert_eq!(format!("{:.2}", MetricWeight::from_grams(12.345)), "12.35g");
        assert_eq!(format!("{}", ImperialWeight::from_pounds(2.5)), "2.5lb");
    }
}
