//! Pulsing emissive highlight for flagged equipment

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use harbor_core::catalog::Severity;

use crate::FrameSet;

/// Angular speed of the flicker, radians per second
const FLICKER_RATE: f32 = 10.0;

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightRequest {
    Start { target: Entity, severity: Severity },
    Stop,
}

/// Emissive intensity of the flicker at `elapsed` seconds
pub fn flicker_intensity(elapsed: f32) -> f32 {
    (elapsed * FLICKER_RATE).sin().abs()
}

/// Materials swapped out for highlight clones
#[derive(Resource, Debug, Default)]
pub struct HighlightState {
    pub target: Option<Entity>,
    /// Mesh entity and the material handle it had before the swap
    originals: Vec<(Entity, Handle<StandardMaterial>)>,
    clones: Vec<Handle<StandardMaterial>>,
    color: LinearRgba,
    elapsed: f32,
}

impl HighlightState {
    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }
}

/// Plugin for the highlight effect
pub struct HighlightPlugin;

impl Plugin for HighlightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HighlightState>()
            .add_systems(Update, (handle_highlight_requests, flicker)
                .chain()
                .in_set(FrameSet::Highlight));
    }
}

fn handle_highlight_requests(
    mut commands: Commands,
    mut requests: MessageReader<HighlightRequest>,
    mut state: ResMut<HighlightState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    children: Query<&Children>,
    meshes: Query<&MeshMaterial3d<StandardMaterial>>,
) {
    for request in requests.read() {
        // Any new request first restores the previous object
        restore(&mut commands, &mut state, &mut materials);

        let HighlightRequest::Start { target, severity } = *request else {
            continue;
        };
        let [r, g, b] = severity.emissive_rgb();
        state.target = Some(target);
        state.color = LinearRgba::rgb(r, g, b);
        state.elapsed = 0.0;

        for entity in std::iter::once(target).chain(children.iter_descendants(target)) {
            let Ok(material) = meshes.get(entity) else {
                continue;
            };
            let Some(original) = materials.get(&material.0).cloned() else {
                continue;
            };
            let clone = materials.add(StandardMaterial {
                emissive: LinearRgba::BLACK,
                ..original
            });
            commands.entity(entity).insert(MeshMaterial3d(clone.clone()));
            state.originals.push((entity, material.0.clone()));
            state.clones.push(clone);
        }
        tracing::debug!(?target, ?severity, materials = state.clones.len(), "Highlight started");
    }
}

fn flicker(time: Res<Time>, mut state: ResMut<HighlightState>, mut materials: ResMut<Assets<StandardMaterial>>) {
    if !state.is_active() {
        return;
    }
    state.elapsed += time.delta_secs();
    let emissive = state.color * flicker_intensity(state.elapsed);
    for handle in &state.clones {
        if let Some(material) = materials.get_mut(handle) {
            material.emissive = emissive;
        }
    }
}

/// Put the original materials back and drop the clones
fn restore(commands: &mut Commands, state: &mut HighlightState, materials: &mut Assets<StandardMaterial>) {
    if state.target.take().is_none() {
        return;
    }
    for (entity, original) in state.originals.drain(..) {
        // The scene may have been swapped out under us
        if let Ok(mut entity) = commands.get_entity(entity) {
            entity.insert(MeshMaterial3d(original));
        }
    }
    for clone in state.clones.drain(..) {
        materials.remove(&clone);
    }
    tracing::debug!("Highlight stopped");
}
