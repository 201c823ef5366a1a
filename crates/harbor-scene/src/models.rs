//! Animated scene model: glTF clips wired to an animation graph
//!
//! Once the glTF asset and its scene instance are ready, every named clip is
//! added to one [`AnimationGraph`] shared by all animation players in the
//! hierarchy. Which clips run, at what weight, is decided by the
//! [`AnimationDirector`] stored on the scene root.

use bevy::animation::{graph::AnimationNodeIndex, RepeatAnimation};
use bevy::ecs::message::MessageReader;
use bevy::gltf::Gltf;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use harbor_core::animation::{loop_speed, AnimationDirector, ClipCommand};

use crate::scene::SceneModel;
use crate::types::ModelRequest;
use crate::FrameSet;

/// Clip state of a spawned scene model
#[derive(Component, Debug)]
pub struct AnimatedModel {
    pub director: AnimationDirector<AnimationNodeIndex>,
    /// Animation players inside the model hierarchy
    pub players: Vec<Entity>,
    /// Playback speed of each looping clip
    pub speeds: HashMap<AnimationNodeIndex, f32>,
}

impl AnimatedModel {
    fn apply(&self, commands: &[ClipCommand<AnimationNodeIndex>], players: &mut Query<&mut AnimationPlayer>) {
        for &player in &self.players {
            let Ok(mut player) = players.get_mut(player) else {
                continue;
            };
            for command in commands {
                match *command {
                    ClipCommand::Play { clip, repeat } => {
                        let active = player.play(clip);
                        active.replay();
                        if repeat {
                            active.repeat();
                            active.set_speed(self.speeds.get(&clip).copied().unwrap_or(1.0));
                        } else {
                            active.set_repeat(RepeatAnimation::Never);
                            active.set_speed(1.0);
                        }
                    }
                    ClipCommand::Stop(clip) => {
                        player.stop(clip);
                    }
                }
            }
        }
    }
}

/// Plugin for model animation
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (attach_animations, drive_animations)
            .chain()
            .in_set(FrameSet::Animation));
    }
}

/// Build the animation graph once the asset and its players exist
fn attach_animations(
    mut commands: Commands,
    models: Query<(Entity, &SceneModel), Without<AnimatedModel>>,
    children: Query<&Children>,
    mut players: Query<&mut AnimationPlayer>,
    gltfs: Res<Assets<Gltf>>,
    clips: Res<Assets<AnimationClip>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    for (root, model) in &models {
        let Some(gltf) = gltfs.get(&model.gltf) else {
            continue;
        };

        let player_entities: Vec<Entity> = children
            .iter_descendants(root)
            .filter(|e| players.contains(*e))
            .collect();
        if player_entities.is_empty() && !gltf.named_animations.is_empty() {
            // Scene instance not spawned yet
            continue;
        }

        let mut graph = AnimationGraph::new();
        let mut nodes = Vec::with_capacity(gltf.named_animations.len());
        let mut speeds = HashMap::default();
        for (name, handle) in &gltf.named_animations {
            let node = graph.add_clip(handle.clone(), 1.0, graph.root);
            let duration = clips.get(handle).map(|c| c.duration()).unwrap_or(0.0);
            speeds.insert(node, loop_speed(duration, model.loop_frames));
            nodes.push((node, name.to_string()));
        }

        let graph = graphs.add(graph);
        for &player in &player_entities {
            commands.entity(player).insert(AnimationGraphHandle(graph.clone()));
        }

        let mut director = AnimationDirector::new(nodes.iter().map(|(node, name)| (*node, name.as_str())));
        let start = director.start();
        let animated = AnimatedModel {
            director,
            players: player_entities,
            speeds,
        };
        animated.apply(&start, &mut players);

        tracing::info!(
            clips = nodes.len(),
            players = animated.players.len(),
            "Animations ready"
        );
        commands.entity(root).insert(animated);
    }
}

/// One-shot requests, completion polling and crossfade weights
fn drive_animations(
    mut requests: MessageReader<ModelRequest>,
    mut models: Query<&mut AnimatedModel>,
    mut players: Query<&mut AnimationPlayer>,
    time: Res<Time>,
) {
    let requests: Vec<ModelRequest> = requests.read().copied().collect();

    for mut model in &mut models {
        for request in &requests {
            let commands = match request {
                ModelRequest::PopUp => model.director.pop_up(),
                ModelRequest::PopDown => model.director.pop_down(),
            };
            model.apply(&commands, &mut players);
        }

        if let Some(clip) = model.director.pending_one_shot() {
            let finished = model.players.iter().any(|&p| {
                players
                    .get(p)
                    .ok()
                    .and_then(|player| player.animation(clip))
                    .is_some_and(|active| active.is_finished())
            });
            if finished {
                let commands = model.director.finished(clip);
                model.apply(&commands, &mut players);
            }
        }

        let stopped = model.director.advance(time.delta_secs());
        model.apply(&stopped, &mut players);

        let weights: Vec<_> = model.director.weights().collect();
        for &player in &model.players {
            let Ok(mut player) = players.get_mut(player) else {
                continue;
            };
            for &(clip, weight) in &weights {
                if let Some(active) = player.animation_mut(clip) {
                    active.set_weight(weight);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_core::animation::OneShotPhase;

    const LOOP: usize = 1;
    const POP_UP: usize = 2;
    const POP_DOWN: usize = 3;

    fn node(index: usize) -> AnimationNodeIndex {
        AnimationNodeIndex::new(index)
    }

    fn app() -> (App, Entity, Entity) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_message::<ModelRequest>()
            .add_systems(Update, drive_animations);

        let mut director = AnimationDirector::new([
            (node(LOOP), "crane_cycle"),
            (node(POP_UP), "pop_up"),
            (node(POP_DOWN), "pop_down"),
        ]);
        let start = director.start();
        assert_eq!(start.len(), 1);

        let mut player = AnimationPlayer::default();
        player.play(node(LOOP)).repeat();
        let player = app.world_mut().spawn(player).id();
        let model = app
            .world_mut()
            .spawn(AnimatedModel {
                director,
                players: vec![player],
                speeds: HashMap::default(),
            })
            .id();
        (app, model, player)
    }

    #[test]
    fn test_pop_up_request_starts_one_shot() {
        let (mut app, model, player) = app();

        app.world_mut().write_message(ModelRequest::PopUp);
        app.update();

        let animated = app.world().get::<AnimatedModel>(model).unwrap();
        assert_eq!(animated.director.phase(), OneShotPhase::TransitioningIn);
        assert_eq!(animated.director.pending_one_shot(), Some(node(POP_UP)));

        let player = app.world().get::<AnimationPlayer>(player).unwrap();
        let pop_up = player.animation(node(POP_UP)).unwrap();
        assert!(!pop_up.is_finished());
        assert!(player.animation(node(LOOP)).is_some());
    }

    #[test]
    fn test_requests_in_flight_are_ignored() {
        let (mut app, model, player) = app();

        app.world_mut().write_message(ModelRequest::PopUp);
        app.update();
        app.world_mut().write_message(ModelRequest::PopDown);
        app.update();

        let animated = app.world().get::<AnimatedModel>(model).unwrap();
        assert_eq!(animated.director.phase(), OneShotPhase::TransitioningIn);
        let player = app.world().get::<AnimationPlayer>(player).unwrap();
        assert!(player.animation(node(POP_DOWN)).is_none());
    }
}
