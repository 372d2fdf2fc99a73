// LNA selection - which bias stages are plotted for every active channel
use crate::application::series_registry::SeriesRegistry;
use crate::domain::lna::LnaStage;
use crate::domain::palette::ColorPicker;
use crate::domain::series::{Plot, SeriesKey};
use crate::domain::selection::Toggle;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct LnaSelection {
    active: BTreeSet<LnaStage>,
}

impl LnaSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch `stage` on or off and add/remove its four bias series for each
    /// of `channels`. Returns whether the selection changed.
    pub fn toggle<'a>(
        &mut self,
        stage: LnaStage,
        toggle: Toggle,
        channels: impl IntoIterator<Item = &'a str>,
        registry: &mut SeriesRegistry,
        colors: &mut ColorPicker,
    ) -> bool {
        match toggle {
            Toggle::On => {
                if !self.active.insert(stage) {
                    return false;
                }
                for pol in channels {
                    let color = colors.next_color();
                    registry.add_series(&SeriesKey::bias(pol, stage), &Plot::BIAS, color);
                }
            }
            Toggle::Off => {
                if !self.active.remove(&stage) {
                    return false;
                }
                for pol in channels {
                    registry.remove_series(&SeriesKey::bias(pol, stage), &Plot::BIAS);
                }
            }
        }
        tracing::info!(stage = %stage, ?toggle, "LNA selection changed");
        true
    }

    #[cfg(test)]
    pub fn is_active(&self, stage: LnaStage) -> bool {
        self.active.contains(&stage)
    }

    /// Active stages in board order.
    pub fn active(&self) -> impl Iterator<Item = LnaStage> + '_ {
        LnaStage::ALL.into_iter().filter(|s| self.active.contains(s))
    }
}
