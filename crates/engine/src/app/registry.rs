use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::scene::{Scene, SceneContext, SceneError};

pub type SceneFactory = Rc<dyn Fn(&mut SceneContext) -> Result<Box<dyn Scene>, SceneError>>;

/// Scene id to constructor table. Built once at startup and frozen inside
/// the [`SceneContext`].
#[derive(Default)]
pub struct SceneRegistry {
    factories: BTreeMap<String, SceneFactory>,
}

impl SceneRegistry {
    /// Ids share one namespace across hubs, mini-games and menus; a second
    /// registration under the same id is rejected and the first one kept.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> Result<(), SceneError>
    where
        F: Fn(&mut SceneContext) -> Result<Box<dyn Scene>, SceneError> + 'static,
    {
        match self.factories.entry(id.into()) {
            Entry::Occupied(entry) => Err(SceneError::DuplicateScene {
                id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(Rc::new(factory));
                Ok(())
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    pub fn factory(&self, id: &str) -> Result<SceneFactory, SceneError> {
        self.factories
            .get(id)
            .cloned()
            .ok_or_else(|| SceneError::UnknownScene { id: id.to_string() })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
