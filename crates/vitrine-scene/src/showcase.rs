//! The mounted scene: owns every piece of showcase state
//!
//! A `Showcase` lives from `mount` to `unmount`. Input handlers and the
//! per-frame callback are methods on it; once unmounted, all of them are
//! no-ops and late asset results are dropped.

use crate::camera::{Camera, ProjectionParams};
use crate::character::{Character, PlacedModel};
use crate::lighting::LightRig;
use crate::marker::{Marker, MarkerElement};
use crate::orbit::{DampedOrbit, RotationControl};
use crate::picking::{pick, Pickable, Ray};
use crate::popup::{Clock, Popup};
use crate::render_list::{BuiltinMesh, MaterialOverride, MeshRef, RenderItem};
use crate::viewport::Viewport;
use vitrine_asset::{
    AssetKey, AssetLoader, AssetRequest, ImportedModel, LoadEvent, LoadResult, LoadedAsset,
    LoadedTexture, LoadingManager,
};
use vitrine_core::{mat4_mul, CharacterSlot, Mat4, ShowcaseConfig, Transform, CHARACTER_COUNT};

/// What applying one load result changed
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub events: Vec<LoadEvent>,
    /// The asset that was added to the scene, if any
    pub placed: Option<AssetKey>,
}

impl LoadOutcome {
    pub fn completed(&self) -> bool {
        self.events.iter().any(|e| matches!(e, LoadEvent::Completed))
    }
}

pub struct Showcase {
    config: ShowcaseConfig,
    clock: Box<dyn Clock>,
    mounted: bool,
    viewport: Viewport,
    camera: Camera,
    orbit: DampedOrbit,
    lights: LightRig,
    loading: LoadingManager,
    characters: [Option<Character>; CHARACTER_COUNT],
    background: Option<PlacedModel>,
    background_texture: Option<LoadedTexture>,
    marker_model: Option<PlacedModel>,
    markers: Vec<Marker>,
    selection: Option<CharacterSlot>,
    hovering: bool,
    /// Last pointer position while the rotate button is held
    drag_from: Option<(f32, f32)>,
    popup: Popup,
    elapsed: f32,
}

impl Showcase {
    /// Every asset the showcase needs, in request order
    pub fn asset_requests(config: &ShowcaseConfig) -> Vec<AssetRequest> {
        let mut requests = vec![AssetRequest::model(
            AssetKey::Background,
            config.resolve_asset(&config.background.model),
        )];
        for (slot, character) in CharacterSlot::ALL.iter().zip(&config.characters) {
            requests.push(AssetRequest::model(
                AssetKey::Character(*slot),
                config.resolve_asset(&character.path),
            ));
        }
        if let Some(texture) = &config.background.texture {
            requests.push(AssetRequest::texture(
                AssetKey::BackgroundTexture,
                config.resolve_asset(texture),
            ));
        }
        if let Some(marker) = &config.marker_model {
            requests.push(AssetRequest::model(
                AssetKey::MarkerModel,
                config.resolve_asset(marker),
            ));
        }
        requests
    }

    /// Build camera, orbit controller and lights, then start every load.
    ///
    /// All requests are tracked before the first one is issued.
    pub fn mount(
        config: ShowcaseConfig,
        viewport: Viewport,
        clock: Box<dyn Clock>,
        loader: &mut dyn AssetLoader,
    ) -> Self {
        let camera = Camera::from_config(&config.camera, viewport.width, viewport.height);
        let orbit = DampedOrbit::new(&camera, config.input.damping);

        let requests = Self::asset_requests(&config);
        let mut loading = LoadingManager::new();
        for request in &requests {
            loading.track(request.key);
        }

        tracing::info!(
            "Mounting showcase at {}x{} (fov {}, near {}), {} assets",
            viewport.width,
            viewport.height,
            camera.fov,
            camera.near,
            requests.len()
        );

        for request in requests {
            loader.load(request);
        }

        Self {
            config,
            clock,
            mounted: true,
            viewport,
            camera,
            orbit,
            lights: LightRig::showcase(),
            loading,
            characters: Default::default(),
            background: None,
            background_texture: None,
            marker_model: None,
            markers: Vec::new(),
            selection: None,
            hovering: false,
            drag_from: None,
            popup: Popup::new(),
            elapsed: 0.0,
        }
    }

    /// Add a finished load to the scene and update progress
    pub fn apply_load_result(&mut self, result: LoadResult) -> LoadOutcome {
        if !self.mounted {
            tracing::debug!("Dropping {} result after unmount", result.request.key);
            return LoadOutcome::default();
        }

        let LoadResult { request, outcome } = result;
        let url = request.url();
        let mut placed = None;
        let mut error = None;

        match outcome {
            Ok(asset) => {
                if self.place(request.key, &url, asset) {
                    placed = Some(request.key);
                }
            }
            Err(err) => {
                tracing::warn!("{}", err);
                error = Some(err);
            }
        }

        let events = self.loading.resolve(request.key, &url, error);
        for event in &events {
            match event {
                LoadEvent::Progress { url, loaded, total } => {
                    tracing::debug!("Loaded {} ({}/{})", url, loaded, total);
                }
                LoadEvent::Completed => self.on_loading_complete(),
                LoadEvent::Failed(_) => {}
            }
        }

        LoadOutcome { events, placed }
    }

    fn place(&mut self, key: AssetKey, url: &str, asset: LoadedAsset) -> bool {
        match (key, asset) {
            (AssetKey::Character(slot), LoadedAsset::Model(model)) => {
                let Some(entry) = self.config.characters.get(slot.index()) else {
                    return false;
                };
                let character = Character::new(slot, entry.path.clone(), *model, entry.transform());
                self.characters[slot.index()] = Some(character);
                true
            }
            (AssetKey::Background, LoadedAsset::Model(model)) => {
                self.background = Some(PlacedModel::new(*model, self.config.background.transform()));
                true
            }
            (AssetKey::MarkerModel, LoadedAsset::Model(model)) => {
                self.marker_model = Some(PlacedModel::new(*model, Transform::IDENTITY));
                true
            }
            (AssetKey::BackgroundTexture, LoadedAsset::Texture(texture)) => {
                self.background_texture = Some(texture);
                true
            }
            (key, _) => {
                tracing::warn!("Asset {} at {} has the wrong kind, ignoring", key, url);
                false
            }
        }
    }

    fn on_loading_complete(&mut self) {
        let camera_position = self.camera.position;
        for character in self.characters.iter().flatten() {
            let Some(bounds) = character.bounds() else {
                continue;
            };
            let mut marker = Marker::new(character.slot);
            marker.update(self.elapsed, &bounds, camera_position);
            self.markers.push(marker);
        }
        tracing::info!("Loading complete, {} markers placed", self.markers.len());
    }

    /// Per-frame callback: animations, markers, orbit, popup timer.
    ///
    /// Returns false once unmounted.
    pub fn frame(&mut self, dt: f32) -> bool {
        if !self.mounted {
            return false;
        }
        self.elapsed += dt;

        for character in self.characters.iter_mut().flatten() {
            character.update(dt);
        }

        let camera_position = self.camera.position;
        for marker in &mut self.markers {
            let bounds = self.characters[marker.slot.index()]
                .as_ref()
                .and_then(|c| c.bounds());
            if let Some(bounds) = bounds {
                marker.update(self.elapsed, &bounds, camera_position);
            }
        }

        self.orbit.update(&mut self.camera);

        if self.popup.tick(self.clock.now()) {
            self.selection = None;
        }
        true
    }

    /// Wheel input drives horizontal rotation only
    pub fn on_wheel(&mut self, delta_y: f32) {
        if self.mounted {
            self.orbit.rotate_left(delta_y * self.config.input.wheel_factor);
        }
    }

    /// Rotate button pressed: later pointer moves orbit the camera
    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        if self.mounted {
            self.drag_from = Some((x, y));
        }
    }

    pub fn on_pointer_up(&mut self) {
        self.drag_from = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    /// A full viewport height of drag turns the view once around.
    /// Vertical drag is requested too but the locked polar angle absorbs it.
    pub fn on_pointer_drag(&mut self, dx: f32, dy: f32) {
        if !self.mounted || self.viewport.is_empty() {
            return;
        }
        let height = self.viewport.height;
        self.orbit.rotate_left(std::f32::consts::TAU * dx / height);
        self.orbit.rotate_up(std::f32::consts::TAU * dy / height);
    }

    /// Slot under a ray: characters first, then markers, in slot order
    pub fn hit_test_ray(&self, ray: &Ray) -> Option<CharacterSlot> {
        let characters: Vec<&dyn Pickable> = self
            .characters
            .iter()
            .flatten()
            .map(|c| c as &dyn Pickable)
            .collect();
        let mut markers: Vec<&Marker> = self.markers.iter().collect();
        markers.sort_by_key(|m| m.slot);
        let markers: Vec<&dyn Pickable> = markers.into_iter().map(|m| m as &dyn Pickable).collect();
        pick(ray, &characters, &markers)
    }

    /// Slot under a surface point in logical pixels
    pub fn hit_test(&self, x: f32, y: f32) -> Option<CharacterSlot> {
        if !self.mounted || self.viewport.is_empty() {
            return None;
        }
        let ray = Ray::from_screen(x, y, self.viewport.width, self.viewport.height, &self.camera);
        self.hit_test_ray(&ray)
    }

    /// Select whatever is under the pointer; a miss leaves the selection alone
    pub fn on_click(&mut self, x: f32, y: f32) -> Option<CharacterSlot> {
        let slot = self.hit_test(x, y)?;
        self.select(slot);
        Some(slot)
    }

    pub fn select(&mut self, slot: CharacterSlot) {
        tracing::debug!("Selected {}", slot);
        self.selection = Some(slot);
        self.popup.show(slot);
    }

    /// Orbit while dragging, then update hover state. Hover is only active
    /// once loading has completed.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> bool {
        if let Some((from_x, from_y)) = self.drag_from {
            self.on_pointer_drag(x - from_x, y - from_y);
            self.drag_from = Some((x, y));
        }
        self.hovering = self.loading.is_complete() && self.hit_test(x, y).is_some();
        self.hovering
    }

    /// Start the popup exit; the selection clears `CLOSE_DELAY` later
    pub fn close_popup(&mut self) {
        if self.mounted {
            self.popup.close(self.clock.now());
        }
    }

    /// Recompute aspect and, across the breakpoint, fov/near
    pub fn on_resize(&mut self, viewport: Viewport) {
        if !self.mounted || viewport.is_empty() {
            return;
        }
        self.camera.set_viewport(viewport.width, viewport.height);
        let params = ProjectionParams::for_width(viewport.width, &self.config.camera);
        if params != self.camera.params() {
            tracing::debug!("Viewport {} wide, fov {} near {}", viewport.width, params.fov, params.near);
            self.camera.apply_params(params);
        }
        self.viewport = viewport;
    }

    /// Tear everything down; later calls on this showcase do nothing
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.orbit.dispose();
        self.characters = Default::default();
        self.background = None;
        self.background_texture = None;
        self.marker_model = None;
        self.markers.clear();
        self.selection = None;
        self.hovering = false;
        self.drag_from = None;
        self.popup = Popup::new();
        tracing::info!("Showcase unmounted");
    }

    /// Draw list for the current frame
    pub fn render_list(&self) -> Vec<RenderItem> {
        let mut items = Vec::new();
        if !self.mounted {
            return items;
        }

        if let Some(background) = &self.background {
            items.extend(model_items(AssetKey::Background, background, None));
        }

        for character in self.characters.iter().flatten() {
            let key = AssetKey::Character(character.slot);
            items.extend(model_items(key, &character.placed, None));
        }

        for marker in &self.markers {
            for part in &marker.parts {
                let matrix = marker.part_matrix(part);
                let material = Some(MaterialOverride {
                    color: part.color,
                    opacity: part.opacity,
                    unlit: true,
                });
                match (part.element, &self.marker_model) {
                    (MarkerElement::Core, Some(model)) => {
                        items.extend(model_items(AssetKey::MarkerModel, model, Some(&matrix)));
                    }
                    (element, _) => {
                        let mesh = match element {
                            MarkerElement::Core => BuiltinMesh::MarkerCore,
                            MarkerElement::OuterGlow | MarkerElement::MiddleGlow => BuiltinMesh::GlowDisc,
                            MarkerElement::Arrow(_) => BuiltinMesh::Arrow,
                        };
                        items.push(RenderItem {
                            mesh: MeshRef::Builtin(mesh),
                            world: matrix,
                            material,
                            joints: None,
                        });
                    }
                }
            }
        }

        items
    }

    /// The imported model behind a render key, for GPU upload
    pub fn model(&self, key: AssetKey) -> Option<&ImportedModel> {
        match key {
            AssetKey::Character(slot) => self.characters[slot.index()].as_ref().map(|c| &c.placed.model),
            AssetKey::Background => self.background.as_ref().map(|b| &b.model),
            AssetKey::MarkerModel => self.marker_model.as_ref().map(|m| &m.model),
            AssetKey::BackgroundTexture => None,
        }
    }

    pub fn config(&self) -> &ShowcaseConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &DampedOrbit {
        &self.orbit
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn character(&self, slot: CharacterSlot) -> Option<&Character> {
        self.characters[slot.index()].as_ref()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn background_texture(&self) -> Option<&LoadedTexture> {
        self.background_texture.as_ref()
    }

    pub fn selection(&self) -> Option<CharacterSlot> {
        self.selection
    }

    pub fn popup(&self) -> &Popup {
        &self.popup
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn progress_percent(&self) -> u8 {
        self.loading.percent()
    }

    pub fn is_loaded(&self) -> bool {
        self.loading.is_complete()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Draws for every primitive of a placed model, optionally re-parented
fn model_items<'a>(
    key: AssetKey,
    placed: &'a PlacedModel,
    parent: Option<&'a Mat4>,
) -> impl Iterator<Item = RenderItem> + 'a {
    placed.instances().iter().map(move |instance| RenderItem {
        mesh: MeshRef::Model {
            key,
            primitive: instance.primitive,
        },
        world: match parent {
            Some(parent) => mat4_mul(parent, &instance.world),
            None => instance.world,
        },
        material: None,
        joints: instance.joints.clone(),
    })
}
