use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::camera::Camera;
use crate::config::{ModelSpec, SceneConfig};
use crate::core::AssetLoader;
use crate::dispatch::{draw_model, DrawOutcome};
use crate::geometry::create_vertex_data;
use crate::input::{Axis, Command, InputSteps};
use crate::lighting::Illumination;
use crate::loaders::{DataStats, Point, TextureImage};
use crate::model::{Geometry, Model, ModelId, TextureSlot, TextureState};
use crate::pipeline::update_transforms;
use crate::registry::{ModelRegistry, RebuildOptions};
use crate::traits::{GraphicsDevice, MeshHandle, SceneEvent, TextureHandle};

/// Everything a frame is rendered from
#[derive(Debug)]
pub struct SceneState {
    pub camera: Camera,
    pub registry: ModelRegistry,
    pub illumination: Illumination,
    /// Model receiving rotate and squeeze input; the camera gets them otherwise
    pub interactive: Option<ModelId>,
    pub steps: InputSteps,
    pub rebuild: RebuildOptions,
}

impl SceneState {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            camera: Camera::new(config.aspect()),
            registry: ModelRegistry::new(),
            illumination: config.illumination.clone(),
            interactive: None,
            steps: config.steps,
            rebuild: RebuildOptions {
                classification: config.classification.clone(),
            },
        }
    }

    /// The interactive model, if it still belongs to the current set
    pub fn interactive_model(&mut self) -> Option<&mut Model> {
        let id = self.interactive?;
        self.registry.get_mut(id)
    }
}

/// Counters for one render cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub models: usize,
    pub drawn: usize,
    pub skipped: usize,
    pub draw_calls: usize,
}

/// Device meshes shared by every model of the same geometry
#[derive(Debug)]
struct MeshCache {
    resolution: u32,
    meshes: HashMap<Geometry, MeshHandle>,
}

impl MeshCache {
    fn new(resolution: u32) -> Self {
        Self {
            resolution,
            meshes: HashMap::new(),
        }
    }

    fn get_or_create<D: GraphicsDevice>(&mut self, device: &mut D, geometry: Geometry) -> MeshHandle {
        let resolution = self.resolution;
        *self.meshes.entry(geometry).or_insert_with(|| {
            let mesh = create_vertex_data(geometry, resolution);
            log::debug!(
                "Created {:?} mesh: {} vertices, {} triangle indices",
                geometry,
                mesh.vertex_count(),
                mesh.triangles.len()
            );
            device.create_mesh(&mesh)
        })
    }
}

/// Owner of the scene state and the device it renders to
///
/// Every state change goes through this type; callers render after any
/// operation that reports a render is needed.
pub struct SceneController<D: GraphicsDevice> {
    state: SceneState,
    device: D,
    meshes: MeshCache,
    loader: Option<AssetLoader>,
    data_path: Option<PathBuf>,
}

impl<D: GraphicsDevice> SceneController<D> {
    pub fn new(device: D, config: &SceneConfig) -> Self {
        Self {
            state: SceneState::new(config),
            device,
            meshes: MeshCache::new(config.sphere_resolution),
            loader: None,
            data_path: None,
        }
    }

    /// Attach the background loader used for textures and data reloads
    pub fn with_loader(mut self, loader: AssetLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// File read again by `Command::LoadData`
    pub fn with_data_path(mut self, path: Option<PathBuf>) -> Self {
        self.data_path = path;
        self
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SceneState {
        &mut self.state
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Viewport changed; only the aspect ratio is scene state
    pub fn resize(&mut self, width: u32, height: u32) {
        self.state.camera.set_aspect(width, height);
    }

    /// Run one full render cycle over every model
    pub fn render(&mut self) -> Result<FrameStats> {
        let camera = &mut self.state.camera;
        let projection = camera.compute_projection();
        camera.projection = projection;
        let view = camera.view;

        self.device.clear();
        self.device.set_projection(projection);
        self.device.set_ambient_light(self.state.illumination.ambient());
        for (index, light) in self.state.illumination.eye_space_lights(&view).enumerate() {
            self.device.set_light(index, &light);
        }

        let mut stats = FrameStats::default();
        for model in self.state.registry.iter_mut() {
            stats.models += 1;
            update_transforms(model, &view);

            let mesh = self.meshes.get_or_create(&mut self.device, model.geometry);
            match draw_model(&mut self.device, model, &mesh) {
                DrawOutcome::Drawn { draw_calls } => {
                    stats.drawn += 1;
                    stats.draw_calls += draw_calls;
                }
                DrawOutcome::Skipped => stats.skipped += 1,
            }
        }

        self.device.finish_frame()?;
        log::debug!("Frame: {:?}", stats);
        Ok(stats)
    }

    /// Apply one input command; returns whether a render is needed
    pub fn execute(&mut self, command: Command) -> bool {
        let camera_step = self.state.camera.lrtb;

        match command {
            Command::MoveCamera(offset) => {
                self.state.camera.translate(offset * camera_step);
                true
            }
            Command::Rotate { axis, angle } => {
                if let Some(model) = self.state.interactive_model() {
                    match axis {
                        Axis::X => model.rotate.x += angle,
                        Axis::Y => model.rotate.y += angle,
                        Axis::Z => model.rotate.z += angle,
                    }
                } else {
                    let camera = &mut self.state.camera;
                    match axis {
                        Axis::X => camera.rotate_x(angle),
                        Axis::Y => camera.rotate_y(angle),
                        Axis::Z => camera.rotate_z(angle),
                    }
                }
                true
            }
            Command::SqueezeTarget { sign, delta } => match self.state.interactive_model() {
                Some(model) => {
                    model.squeeze(sign, delta);
                    true
                }
                None => false,
            },
            Command::SetProjection(mode) => {
                self.state.camera.set_projection_mode(mode);
                log::info!("Projection: {:?}, lrtb {}", mode, self.state.camera.lrtb);
                true
            }
            Command::Orbit(angle) => {
                self.state.camera.orbit(angle);
                true
            }
            Command::RaiseEye(delta) => {
                self.state.camera.raise_eye(delta);
                true
            }
            Command::ChangeFovy(delta) => {
                self.state.camera.change_fovy(delta);
                true
            }
            Command::ScaleNearPlane(sign) => {
                self.state.camera.scale_near_plane(sign);
                true
            }
            Command::ToggleLight(index) => {
                self.state.illumination.toggle(index);
                true
            }
            Command::LoadData => {
                self.request_data_load();
                false
            }
        }
    }

    /// Start reading the data file in the background
    pub fn request_data_load(&self) {
        match (&self.loader, &self.data_path) {
            (Some(loader), Some(path)) => {
                log::info!("Loading data from {:?}", path);
                loader.load_data(path.clone());
            }
            (None, _) => log::warn!("No loader attached, ignoring data load"),
            (_, None) => log::warn!("No data file given, nothing to load"),
        }
    }

    /// Replace the model set with configured models and request their textures
    pub fn populate_models(&mut self, specs: &[ModelSpec]) {
        let models = specs.iter().map(ModelSpec::build).collect();
        let removed = self.state.registry.populate(models);
        self.release_textures(&removed);
        self.state.interactive = None;

        for (index, spec) in specs.iter().enumerate() {
            let Some(id) = self.state.registry.id_at(index) else {
                continue;
            };
            if spec.interactive && self.state.interactive.is_none() {
                self.state.interactive = Some(id);
            }
            if let Some(path) = &spec.texture {
                self.request_texture(id, path.clone());
            }
        }

        log::info!("Populated {} configured models", self.state.registry.len());
    }

    fn request_texture(&mut self, id: ModelId, path: PathBuf) {
        let handle = self.device.create_texture();
        let state = if self.loader.is_some() {
            TextureState::Pending
        } else {
            TextureState::Failed("no loader attached".to_string())
        };

        if let Some(model) = self.state.registry.get_mut(id) {
            model.texture = Some(TextureSlot { handle, state });
        }
        if let Some(loader) = &self.loader {
            loader.load_texture(id, handle, path);
        }
    }

    /// Rebuild from new data, reframe on it and render
    pub fn on_data_loaded(&mut self, points: &[Point], stats: &DataStats) -> Result<FrameStats> {
        self.apply_data(points, stats);
        self.render()
    }

    fn apply_data(&mut self, points: &[Point], stats: &DataStats) {
        let removed = self
            .state
            .registry
            .rebuild_with(points, stats, &self.state.rebuild);
        self.release_textures(&removed);
        self.state.interactive = None;

        self.state.camera.reframe(stats.mean, stats.max_range);
        log::info!(
            "Loaded {} points, mean {:?}, max range {}",
            points.len(),
            stats.mean,
            stats.max_range
        );
    }

    /// Apply a loader completion; returns whether a render is needed
    pub fn handle_event(&mut self, event: SceneEvent) -> bool {
        match event {
            SceneEvent::TextureLoaded {
                model,
                texture,
                result,
            } => self.apply_texture(model, texture, result),
            SceneEvent::DataLoaded(Ok(cloud)) => {
                self.apply_data(&cloud.points, &cloud.stats);
                true
            }
            SceneEvent::DataLoaded(Err(e)) => {
                log::error!("Data load failed, keeping current models: {}", e);
                false
            }
        }
    }

    fn apply_texture(
        &mut self,
        id: ModelId,
        texture: TextureHandle,
        result: std::result::Result<TextureImage, String>,
    ) -> bool {
        let slot = self
            .state
            .registry
            .get_mut(id)
            .and_then(|model| model.texture.as_mut())
            .filter(|slot| slot.handle == texture);

        let Some(slot) = slot else {
            log::debug!("Dropping stale texture {:?} for {:?}", texture, id);
            self.device.release_texture(texture);
            return false;
        };

        match result {
            Ok(image) => {
                self.device.upload_texture(texture, &image);
                slot.state = TextureState::Loaded;
                log::info!("Texture {:?} loaded ({}x{})", texture, image.width, image.height);
                true
            }
            Err(e) => {
                log::warn!("Texture {:?} failed: {}", texture, e);
                slot.state = TextureState::Failed(e);
                false
            }
        }
    }

    fn release_textures(&mut self, models: &[Model]) {
        for slot in models.iter().filter_map(|m| m.texture.as_ref()) {
            self.device.release_texture(slot.handle);
        }
    }
}
