use std::collections::BTreeMap;

use foundation::math::{Vec3, ease_out_cubic};
use foundation::time::{Time, TimeSpan};

use crate::mesh::{MeshId, MeshObject};

/// A bounded, eased move from `from` to `to`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transition {
    pub from: Vec3,
    pub to: Vec3,
    pub span: TimeSpan,
}

impl Transition {
    pub fn new(from: Vec3, to: Vec3, start: Time, duration_s: f64) -> Self {
        Self {
            from,
            to,
            span: TimeSpan::starting_at(start, duration_s),
        }
    }

    pub fn position_at(&self, t: Time) -> Vec3 {
        let eased = ease_out_cubic(self.span.progress_at(t));
        self.from.lerp(self.to, eased)
    }

    pub fn is_finished_at(&self, t: Time) -> bool {
        self.span.is_finished_at(t)
    }
}

/// In-flight transitions keyed by mesh.
///
/// Starting a transition for a mesh that already has one replaces it, so the
/// most recent request always wins.
#[derive(Debug, Default)]
pub struct Transitions {
    active: BTreeMap<MeshId, Transition>,
}

impl Transitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, id: MeshId, transition: Transition) {
        self.active.insert(id, transition);
    }

    pub fn get(&self, id: MeshId) -> Option<&Transition> {
        self.active.get(&id)
    }

    pub fn target_of(&self, id: MeshId) -> Option<Vec3> {
        self.get(id).map(|t| t.to)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Moves each mesh with an active transition to its eased position at `t`.
    ///
    /// Finished transitions land exactly on their target and are dropped.
    pub fn apply(&mut self, t: Time, meshes: &mut [MeshObject]) {
        for mesh in meshes.iter_mut() {
            if let Some(transition) = self.active.get(&mesh.id) {
                mesh.position = transition.position_at(t);
            }
        }
        self.active.retain(|_, transition| !transition.is_finished_at(t));
    }
}
