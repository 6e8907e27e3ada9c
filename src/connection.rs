//! Segment Connection Manager.
//!
//! Owns the per-segment connection table of one character and the spring
//! connectors that realise it.  A connected segment has an `ImpulseJoint`
//! whose parent is the torso; a detached one has none.  There is no third
//! state.
//!
//! ## Tick order (see [`crate::rig::RigSet`])
//!
//! 1. [`apply_disconnect_requests_system`] drains [`DisconnectRequest`]s.
//! 2. [`reconnect_scan_system`] snaps eligible segments back on.
//!
//! Cooldowns are counted down in `Update` by [`tick_reconnect_cooldowns_system`]
//! using unscaled real time.

use crate::config::RigConfig;
use crate::error::RigError;
use crate::segment::{CharacterRig, Segment, SpringConnector};
use crate::stage::{refresh_stage, StageChanged, StageSelector};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Connection flags and reconnect cooldown of one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionState {
    pub connected: bool,
    pub reconnect_allowed: bool,
    /// Seconds until `reconnect_allowed` is restored.  Zero when allowed.
    pub cooldown_remaining: f32,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            connected: false,
            reconnect_allowed: true,
            cooldown_remaining: 0.0,
        }
    }
}

/// Connection table of one character, indexed by [`Segment::index`].
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct SegmentConnections {
    states: [ConnectionState; Segment::COUNT],
}

impl SegmentConnections {
    pub fn state(&self, segment: Segment) -> ConnectionState {
        self.states[segment.index()]
    }

    pub fn is_connected(&self, segment: Segment) -> bool {
        self.states[segment.index()].connected
    }

    pub fn reconnect_allowed(&self, segment: Segment) -> bool {
        self.states[segment.index()].reconnect_allowed
    }

    pub fn any_connected(&self) -> bool {
        self.states.iter().any(|s| s.connected)
    }

    pub fn connected_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        Segment::ALL
            .into_iter()
            .filter(|&segment| self.is_connected(segment))
    }

    /// Attach `segment` if it is detached, allowed to reconnect, and closer
    /// than `snap_distance`.  Returns whether it connected.
    pub fn try_reconnect(&mut self, segment: Segment, distance: f32, snap_distance: f32) -> bool {
        let state = &mut self.states[segment.index()];
        if state.connected || !state.reconnect_allowed || distance >= snap_distance {
            return false;
        }
        state.connected = true;
        true
    }

    /// Attach `segment` unconditionally (spawn configuration).
    /// Returns `false` if it was already connected.
    pub fn connect(&mut self, segment: Segment) -> bool {
        let state = &mut self.states[segment.index()];
        if state.connected {
            return false;
        }
        state.connected = true;
        true
    }

    /// Detach `segment` and start its reconnect cooldown.
    ///
    /// Detaching an already-detached segment is a no-op and returns `false`.
    pub fn disconnect(&mut self, segment: Segment, reconnect_delay: f32) -> bool {
        let state = &mut self.states[segment.index()];
        if !state.connected {
            return false;
        }
        state.connected = false;
        state.reconnect_allowed = false;
        state.cooldown_remaining = reconnect_delay;
        true
    }

    /// Count every running cooldown down by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        for state in self.states.iter_mut().filter(|s| !s.reconnect_allowed) {
            state.cooldown_remaining -= dt;
            if state.cooldown_remaining <= 0.0 {
                state.cooldown_remaining = 0.0;
                state.reconnect_allowed = true;
            }
        }
    }

    /// Everything detached, every cooldown cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// Ask the manager to detach one segment of a character.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct DisconnectRequest {
    pub character: Entity,
    pub segment: Segment,
}

/// Emitted after a segment actually connects or disconnects.  Nothing in the
/// rig reads it; it is published for sound, effects and other listeners.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ConnectionChanged {
    pub character: Entity,
    pub segment: Segment,
    pub connected: bool,
}

/// Return a character to its spawn connection state.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ResetRig {
    pub character: Entity,
}

// ── Connector helpers ─────────────────────────────────────────────────────────

/// Build the spring joint that ties a segment to the torso.
pub fn spring_joint(torso: Entity, connector: &SpringConnector) -> ImpulseJoint {
    let spring = SpringJointBuilder::new(
        connector.rest_length,
        connector.stiffness,
        connector.damping,
    )
    .local_anchor1(connector.torso_anchor);
    ImpulseJoint::new(torso, spring)
}

/// Insert the connector joint on `segment`.  Returns `false` (and logs) when
/// the segment or torso body, or the connector parameters, are missing.
pub fn attach_connector(
    commands: &mut Commands,
    rig: &CharacterRig,
    connectors: &Query<&SpringConnector>,
    segment: Segment,
) -> bool {
    let (Some(torso), Some(entity)) = (rig.torso(), rig.get(segment.part())) else {
        debug!("Cannot attach the {segment}: body missing");
        return false;
    };
    let Ok(connector) = connectors.get(entity) else {
        warn!("Cannot attach: {}", RigError::MissingConnector { segment });
        return false;
    };
    commands.entity(entity).insert(spring_joint(torso, connector));
    true
}

/// Remove the connector joint from `segment`, if its body exists.
pub fn detach_connector(commands: &mut Commands, rig: &CharacterRig, segment: Segment) {
    match rig.get(segment.part()) {
        Some(entity) => {
            commands.entity(entity).remove::<ImpulseJoint>();
        }
        None => debug!("Cannot detach the {segment}: body missing"),
    }
}

/// Detach one segment and publish the result.  Shared by the disconnect
/// request handler and fatal-collision handling.
pub fn disconnect_segment(
    commands: &mut Commands,
    character: Entity,
    rig: &CharacterRig,
    connections: &mut SegmentConnections,
    segment: Segment,
    reconnect_delay: f32,
    changed: &mut MessageWriter<ConnectionChanged>,
) -> bool {
    if !connections.disconnect(segment, reconnect_delay) {
        return false;
    }
    detach_connector(commands, rig, segment);
    changed.write(ConnectionChanged {
        character,
        segment,
        connected: false,
    });
    true
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Apply every pending [`DisconnectRequest`].
pub fn apply_disconnect_requests_system(
    mut commands: Commands,
    mut requests: MessageReader<DisconnectRequest>,
    mut characters: Query<(&CharacterRig, &mut SegmentConnections, &mut StageSelector)>,
    config: Res<RigConfig>,
    mut changed: MessageWriter<ConnectionChanged>,
    mut stage_changed: MessageWriter<StageChanged>,
) {
    for request in requests.read() {
        let Ok((rig, mut connections, mut selector)) = characters.get_mut(request.character)
        else {
            debug!("Disconnect request for unknown character {:?}", request.character);
            continue;
        };
        if disconnect_segment(
            &mut commands,
            request.character,
            rig,
            &mut connections,
            request.segment,
            config.connection.reconnect_delay,
            &mut changed,
        ) {
            info!("Detached the {}", request.segment);
            refresh_stage(
                request.character,
                &mut selector,
                &connections,
                &config.camera,
                &mut stage_changed,
            );
        }
    }
}

/// Snap every detached, cooled-down segment within snap distance back onto
/// its torso.
pub fn reconnect_scan_system(
    mut commands: Commands,
    mut characters: Query<(
        Entity,
        &CharacterRig,
        &mut SegmentConnections,
        &mut StageSelector,
    )>,
    transforms: Query<&Transform>,
    connectors: Query<&SpringConnector>,
    config: Res<RigConfig>,
    mut changed: MessageWriter<ConnectionChanged>,
    mut stage_changed: MessageWriter<StageChanged>,
) {
    for (character, rig, mut connections, mut selector) in characters.iter_mut() {
        let Some(torso) = rig.torso().and_then(|e| transforms.get(e).ok()) else {
            continue;
        };
        let torso_pos = torso.translation.truncate();
        let mut any = false;

        for segment in Segment::ALL {
            let state = connections.state(segment);
            if state.connected || !state.reconnect_allowed {
                continue;
            }
            let Some(entity) = rig.get(segment.part()) else {
                continue;
            };
            let Ok(transform) = transforms.get(entity) else {
                continue;
            };
            if !connectors.contains(entity) {
                continue;
            }
            let distance = transform.translation.truncate().distance(torso_pos);
            if connections.try_reconnect(segment, distance, config.connection.snap_distance)
                && attach_connector(&mut commands, rig, &connectors, segment)
            {
                info!("Reattached the {segment}");
                changed.write(ConnectionChanged {
                    character,
                    segment,
                    connected: true,
                });
                any = true;
            }
        }

        if any {
            refresh_stage(
                character,
                &mut selector,
                &connections,
                &config.camera,
                &mut stage_changed,
            );
        }
    }
}

/// Count reconnect cooldowns down in real, unscaled time.
pub fn tick_reconnect_cooldowns_system(
    time: Res<Time<Real>>,
    mut q: Query<&mut SegmentConnections>,
) {
    let dt = time.delta_secs();
    for mut connections in q.iter_mut() {
        if connections.states.iter().any(|s| !s.reconnect_allowed) {
            connections.tick(dt);
        }
    }
}

/// Handle [`ResetRig`]: detach everything, clear cooldowns, then re-apply the
/// spawn connection list.
pub fn reset_rig_system(
    mut commands: Commands,
    mut resets: MessageReader<ResetRig>,
    mut characters: Query<(&CharacterRig, &mut SegmentConnections, &mut StageSelector)>,
    connectors: Query<&SpringConnector>,
    config: Res<RigConfig>,
    mut stage_changed: MessageWriter<StageChanged>,
) {
    for reset in resets.read() {
        let Ok((rig, mut connections, mut selector)) = characters.get_mut(reset.character) else {
            continue;
        };
        for segment in Segment::ALL {
            detach_connector(&mut commands, rig, segment);
        }
        connections.reset();
        for &segment in &config.connection.spawn_connected {
            if attach_connector(&mut commands, rig, &connectors, segment) {
                connections.connect(segment);
            }
        }
        info!("Reset rig of {:?}", reset.character);
        refresh_stage(
            reset.character,
            &mut selector,
            &connections,
            &config.camera,
            &mut stage_changed,
        );
    }
}
