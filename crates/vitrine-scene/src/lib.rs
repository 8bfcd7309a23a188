//! Vitrine Scene - Everything about the showcase that does not touch the GPU
//!
//! `Showcase` owns the camera, the damped orbit, the loaded characters and
//! their markers, picking, and the popup state machine. Skinned characters
//! are posed through their joint nodes. Each frame it
//! produces a flat list of `RenderItem`s for the renderer.

mod animation;
mod camera;
mod character;
mod lighting;
mod marker;
mod orbit;
mod picking;
mod popup;
mod render_list;
mod showcase;
mod skin;
mod viewport;

pub use animation::{cubic_hermite, quat_slerp, sample_channel, AnimationMixer, ClipAction};
pub use camera::{mat4_inverse, Camera, ProjectionParams};
pub use character::{Character, MeshInstance, PlacedModel};
pub use lighting::{AmbientLight, DirectionalLight, HemisphereLight, LightRig, PointLight};
pub use marker::{
    arrow_angle, arrow_opacity, marker_position, middle_glow_opacity, outer_glow, Marker,
    MarkerElement, MarkerPart, ARROW_COUNT, ARROW_RADIUS, MIDDLE_GLOW_SCALE, PICK_RADIUS,
};
pub use orbit::{DampedOrbit, RotationControl};
pub use picking::{pick, ray_aabb, ray_sphere, ray_triangle, to_ndc, Pickable, Ray};
pub use popup::{Clock, FakeClock, Panel, Popup, PopupState, SystemClock, CLOSE_DELAY};
pub use render_list::{BuiltinMesh, MaterialOverride, MeshRef, RenderItem};
pub use showcase::{LoadOutcome, Showcase};
pub use skin::{joint_palette, skin_matrix, skin_positions};
pub use viewport::Viewport;
