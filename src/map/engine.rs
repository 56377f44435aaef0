use crate::config::MapConfig;
use crate::error::ConfigError;
use crate::map::interaction::{InteractionController, PointerEvent, Tooltip};
use crate::map::legend::render_legend;
use crate::map::merge::{flag_labels, merge};
use crate::map::model::{CityRecord, Datasets, GeoCollection, RegionDensityRecord};
use crate::map::projection::Projection;
use crate::map::renderer::{render_layers, LayerStats};
use crate::map::scale::Scales;
use crate::scene::{Scene, Target};
use glam::DVec2;
use tracing::{debug, info};

/// One map instance: configuration, data model and everything derived
/// from it for the current render cycle.
pub struct ChoroplethMap {
    /// Options as configured; `config` is this scaled to the current size
    base: MapConfig,
    config: MapConfig,
    countries: GeoCollection,
    regions: Vec<RegionDensityRecord>,
    cities: Vec<CityRecord>,
    scales: Scales,
    projection: Projection,
    scene: Scene,
    interaction: InteractionController,
}

impl ChoroplethMap {
    /// Merge the datasets and draw the first frame
    pub fn new(config: MapConfig, datasets: Datasets) -> Result<Self, ConfigError> {
        config.validate()?;

        let Datasets {
            geography: mut countries,
            regions,
            cities,
        } = datasets;
        let matched = merge(&mut countries, &regions);
        info!(
            features = countries.len(),
            matched,
            cities = cities.len(),
            "merged density records into geography"
        );

        let projection = Projection::fit(config.inner_width(), config.inner_height(), &countries);
        let scene = Scene::new(
            config.parent_element.clone(),
            config.container_width,
            config.container_height,
            DVec2::new(config.margin.left, config.margin.top),
        );
        let interaction = InteractionController::new(config.tooltip_padding, config.hide_on_country_leave);

        let mut map = Self {
            base: config.clone(),
            config,
            countries,
            regions,
            cities,
            scales: Scales::default(),
            projection,
            scene,
            interaction,
        };
        map.update();
        Ok(map)
    }

    /// Recompute the scales, then render
    pub fn update(&mut self) {
        self.scales = Scales::derive(&self.countries, &self.cities);
        flag_labels(&mut self.cities);
        debug!(
            density = ?self.scales.density.as_ref().map(|s| s.domain),
            population = ?self.scales.symbol.as_ref().map(|s| s.domain),
            "derived scales"
        );
        self.render();
    }

    /// Refit the projection and re-join every layer
    pub fn render(&mut self) -> LayerStats {
        self.projection = Projection::fit(
            self.config.inner_width(),
            self.config.inner_height(),
            &self.countries,
        );
        let stats = render_layers(
            &mut self.scene,
            &self.countries,
            &self.cities,
            &self.projection,
            self.scales.density.as_ref(),
        );
        render_legend(
            &mut self.scene,
            &self.config,
            self.scales.density.as_ref(),
            self.scales.symbol.as_ref(),
        );
        self.interaction.revalidate(&self.countries, &self.cities);
        debug!(?stats, nodes = self.scene.node_count(), "rendered scene");
        stats
    }

    /// Replace the geometry; densities are re-merged from the held records
    pub fn set_geography(&mut self, mut countries: GeoCollection) {
        merge(&mut countries, &self.regions);
        self.countries = countries;
        self.update();
    }

    /// New container size: a new render cycle with a refit projection.
    /// Pixel-valued options are scaled from the configured ones, so repeated
    /// resizes do not drift. Sizes leaving no drawing area are rejected.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), ConfigError> {
        let scaled = self.base.scaled_to(width, height);
        scaled.validate()?;
        self.apply_config(scaled);
        Ok(())
    }

    /// Swap the configuration and re-render. Invalid configs are rejected
    /// and the current one is kept.
    pub fn set_config(&mut self, config: MapConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.base = config.clone();
        self.apply_config(config);
        Ok(())
    }

    fn apply_config(&mut self, config: MapConfig) {
        self.scene.resize(config.container_width, config.container_height);
        self.scene
            .set_origin(DVec2::new(config.margin.left, config.margin.top));
        self.interaction = InteractionController::new(config.tooltip_padding, config.hide_on_country_leave);
        self.config = config;
        self.render();
    }

    pub fn dispatch(&mut self, event: PointerEvent) {
        self.interaction.handle(event, &self.countries, &self.cities);
    }

    /// Interactive element under a container-space point
    pub fn target_at(&self, page: DVec2) -> Option<Target> {
        self.scene.pick(page)
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn countries(&self) -> &GeoCollection {
        &self.countries
    }

    pub fn cities(&self) -> &[CityRecord] {
        &self.cities
    }

    pub fn scales(&self) -> &Scales {
        &self.scales
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tooltip(&self) -> &Tooltip {
        self.interaction.tooltip()
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    /// Display name of a target, for status lines
    pub fn target_name(&self, target: Target) -> Option<&str> {
        match target {
            Target::Country(i) => self.countries.get(i).map(|f| f.name.as_str()),
            Target::City(i) => self.cities.get(i).map(|c| c.city.as_str()),
        }
    }
}
