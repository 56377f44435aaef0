use crate::map::model::{CityRecord, GeoCollection};
use crate::scene::Target;
use glam::DVec2;

pub const NO_DATA_MESSAGE: &str = "No data available";

/// Pointer input, already resolved to the element under the pointer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved over `target`; `page` is in container coordinates
    Move { target: Target, page: DVec2 },
    /// Pointer left `target`
    Leave { target: Target },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TooltipState {
    Hidden,
    ShowingCountry(usize),
    ShowingCity(usize),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TooltipContent {
    pub title: String,
    pub lines: Vec<String>,
}

impl TooltipContent {
    /// Title and lines joined by newlines
    pub fn text(&self) -> String {
        std::iter::once(self.title.as_str())
            .chain(self.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The single shared tooltip
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    /// Pointer position plus padding, container coordinates
    pub position: DVec2,
    pub content: TooltipContent,
}

/// Hover state machine driving the tooltip. The controller is the only
/// writer of the tooltip; everything else reads it through [`tooltip`].
///
/// [`tooltip`]: InteractionController::tooltip
#[derive(Clone, Debug)]
pub struct InteractionController {
    padding: f64,
    hide_on_country_leave: bool,
    state: TooltipState,
    tooltip: Tooltip,
}

impl InteractionController {
    pub fn new(padding: f64, hide_on_country_leave: bool) -> Self {
        Self {
            padding,
            hide_on_country_leave,
            state: TooltipState::Hidden,
            tooltip: Tooltip::default(),
        }
    }

    pub fn state(&self) -> TooltipState {
        self.state
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// Apply one event. Targets that no longer exist in the data are ignored.
    pub fn handle(&mut self, event: PointerEvent, countries: &GeoCollection, cities: &[CityRecord]) {
        match event {
            PointerEvent::Move {
                target: Target::Country(i),
                page,
            } => {
                let Some(feature) = countries.get(i) else {
                    return;
                };
                let line = match feature.density() {
                    Some(d) => format!("{d} pop. density per km²"),
                    None => NO_DATA_MESSAGE.to_string(),
                };
                self.show(
                    TooltipState::ShowingCountry(i),
                    page,
                    TooltipContent {
                        title: feature.name.clone(),
                        lines: vec![line],
                    },
                );
            }
            PointerEvent::Move {
                target: Target::City(i),
                page,
            } => {
                let Some(city) = cities.get(i) else {
                    return;
                };
                self.show(
                    TooltipState::ShowingCity(i),
                    page,
                    TooltipContent {
                        title: format!("City: {}", city.city),
                        lines: vec![
                            format!("Population: {}", city.population),
                            format!("Country: {}", city.country),
                            format!("Capital: {}", city.capital),
                        ],
                    },
                );
            }
            PointerEvent::Leave {
                target: Target::City(i),
            } => {
                if i < cities.len() {
                    self.hide();
                }
            }
            PointerEvent::Leave {
                target: Target::Country(i),
            } => {
                if self.hide_on_country_leave && i < countries.len() {
                    self.hide();
                }
            }
        }
    }

    fn show(&mut self, state: TooltipState, page: DVec2, content: TooltipContent) {
        self.state = state;
        self.tooltip = Tooltip {
            visible: true,
            position: page + DVec2::splat(self.padding),
            content,
        };
    }

    /// Hide but keep the last content and position, like a display toggle
    fn hide(&mut self) {
        self.state = TooltipState::Hidden;
        self.tooltip.visible = false;
    }

    /// Drop a tooltip whose datum disappeared after a data change
    pub fn revalidate(&mut self, countries: &GeoCollection, cities: &[CityRecord]) {
        let stale = match self.state {
            TooltipState::Hidden => false,
            TooltipState::ShowingCountry(i) => i >= countries.len(),
            TooltipState::ShowingCity(i) => i >= cities.len(),
        };
        if stale {
            self.hide();
        }
    }
}
