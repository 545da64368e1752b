// crates/speedshift-ui/src/modules/mod.rs
//
// Module registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing ScreenModule
//   2. Add `pub mod mypanel;` below
//   3. Wire it into app.rs

pub mod audio;
pub mod controls;
pub mod video;
pub mod viewport;

use egui::Ui;
use speedshift_core::commands::PlayerCommand;
use speedshift_core::state::PlayerState;

/// Every screen panel implements this trait.
/// Modules read state, emit commands — they never mutate state directly.
pub trait ScreenModule {
    fn name(&self) -> &str;
    fn ui(&mut self, ui: &mut Ui, state: &PlayerState, cmd: &mut Vec<PlayerCommand>);
    /// Called every frame after commands are processed.
    /// Non-rendering modules (VideoModule, AudioModule) use this instead of
    /// ui(). Default is a no-op so rendering modules don't need it.
    fn tick(&mut self, _state: &PlayerState, _ctx: &mut crate::context::AppContext) {}
}
