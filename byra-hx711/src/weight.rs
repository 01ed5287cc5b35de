use crate::units::{ImperialWeight, MetricWeight, UnitWeight, WeightSystem};

/// Holds both the metric & imperial view of one weight. Every way of changing a [Weight] sets
/// both views at once, so they always describe the same quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weight {
    metric: MetricWeight,
    imperial: ImperialWeight,
}

impl Weight {
    pub fn metric(&self) -> MetricWeight {
        self.metric
    }

    pub fn imperial(&self) -> ImperialWeight {
        self.imperial
    }

    pub fn set_metric(&mut self, metric: MetricWeight) {
        self.metric = metric;
        self.imperial = metric.into();
    }

    pub fn set_imperial(&mut self, imperial: ImperialWeight) {
        self.imperial = imperial;
        self.metric = imperial.into();
    }

    pub fn in_system(&self, system: WeightSystem) -> UnitWeight {
        match system {
            WeightSystem::Metric => UnitWeight::Metric(self.metric),
            WeightSystem::Imperial => UnitWeight::Imperial(self.imperial),
        }
    }
}

impl From<UnitWeight> for Weight {
    fn from(w: UnitWeight) -> Self {
        match w {
            UnitWeight::Metric(m) => m.into(),
            UnitWeight::Imperial(i) => i.into(),
        }
    }
}

impl From<MetricWeight> for Weight {
    fn from(metric: MetricWeight) -> Self {
        Self {
            metric,
            imperial: metric.into(),
        }
    }
}

impl From<ImperialWeight> for Weight {
    fn from(imperial: ImperialWeight) -> Self {
        Self {
            metric: imperial.into(),
            imperial,
        }
    }
}
