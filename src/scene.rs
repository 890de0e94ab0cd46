/*

    Scene-level handle to the spatial index.

    Readers take a snapshot (an Arc to an immutable index) and
    keep tracing against it while a rebuild runs. A rebuild
    builds the new index off to the side and swaps it in whole,
    so no reader ever sees a half-built tree.

    @date: 14 Nov, 2025
    @author: Bartu
*/

use std::sync::RwLock;

use crate::acceleration::Accelerator;
use crate::bvh::Bvh;
use crate::config::{IndexConfig, Structure};
use crate::kdtree::KdTree;
use crate::shapes::Primitive;
use crate::prelude::*;

pub type SharedIndex = Arc<dyn Accelerator<Primitive>>;

/// Build whichever structure the config asks for.
pub fn build_index(primitives: &[Primitive], config: &IndexConfig) -> Result<SharedIndex> {
    let index: SharedIndex = match config.structure {
        Structure::KdTree => Arc::new(KdTree::build(primitives, config)?),
        Structure::Bvh => Arc::new(Bvh::build(primitives, config)?),
    };
    Ok(index)
}

pub struct SceneIndex {
    current: RwLock<SharedIndex>,
}

impl SceneIndex {
    pub fn new(primitives: &[Primitive], config: &IndexConfig) -> Result<Self> {
        Ok(Self {
            current: RwLock::new(build_index(primitives, config)?),
        })
    }

    pub fn snapshot(&self) -> SharedIndex {
        match self.current.read() {
            Ok(guard) => (*guard).clone(),
            // a panicked writer never leaves a partial index behind, the swap is a single store
            Err(poisoned) => (*poisoned.into_inner()).clone(),
        }
    }

    /// Replace the index with one built from `primitives`. On error the
    /// previous index stays in place.
    pub fn rebuild(&self, primitives: &[Primitive], config: &IndexConfig) -> Result<()> {
        let fresh = build_index(primitives, config)?;
        let old = {
            let mut guard = match self.current.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::replace(&mut *guard, fresh)
        };
        info!(
            "Swapped {} ({} primitives) for a new index; {} readers still hold the old one",
            old.kind(),
            old.input_len(),
            Arc::strong_count(&old) - 1
        );
        Ok(())
    }
}
