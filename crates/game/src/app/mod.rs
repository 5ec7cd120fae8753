mod bootstrap;
mod catalog;
mod entry;
mod minigame;
mod registry;
mod scenes;

#[cfg(test)]
mod testing;

pub(crate) use bootstrap::build_app;
