use crate::config::DetailConfig;
use crate::detail;
use crate::surface::SvgSurface;
use crate::types::{CountryFeature, StoreRecord};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

/// Alternates country clicks between the two detail slots, starting with A.
#[derive(Debug, Clone)]
pub struct CountrySelector {
    next: Slot,
}

impl Default for CountrySelector {
    fn default() -> Self {
        Self { next: Slot::A }
    }
}

impl CountrySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the slot the next country goes to and flip to the other one.
    pub fn select_next_slot(&mut self) -> Slot {
        let slot = self.next;
        self.next = slot.other();
        slot
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub slot: Slot,
    pub panel: String,
    pub code: String,
    pub name: String,
    pub points: usize,
}

/// The two detail panels and the selector deciding which one a click redraws.
#[derive(Debug, Clone)]
pub struct DetailPanels {
    selector: CountrySelector,
    slots: [SvgSurface; 2],
    config: DetailConfig,
}

impl DetailPanels {
    pub fn new(config: &DetailConfig) -> Self {
        let [a, b] = &config.panels;
        Self {
            selector: CountrySelector::new(),
            slots: [
                SvgSurface::new(a.clone(), config.width, config.height),
                SvgSurface::new(b.clone(), config.width, config.height),
            ],
            config: config.clone(),
        }
    }

    /// Handle a click on `country`: clear the targeted slot, then draw the
    /// country and its stores into it.
    pub fn show(&mut self, country: &CountryFeature, stores: &[StoreRecord]) -> Selection {
        let slot = self.selector.select_next_slot();
        let surface = &mut self.slots[slot.index()];
        surface.clear();
        let points = detail::draw_country(surface, &self.config, country, stores);

        info!(
            "Showing {} ({}) in {} with {} stores",
            country.name,
            country.code,
            surface.name(),
            points
        );

        Selection {
            slot,
            panel: surface.name().to_string(),
            code: country.code.clone(),
            name: country.name.clone(),
            points,
        }
    }

    pub fn panel(&self, slot: Slot) -> &SvgSurface {
        &self.slots[slot.index()]
    }

    pub fn panel_by_name(&self, name: &str) -> Option<&SvgSurface> {
        self.slots.iter().find(|s| s.name() == name)
    }

    pub fn panels(&self) -> impl Iterator<Item = &SvgSurface> {
        self.slots.iter()
    }
}
