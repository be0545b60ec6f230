use super::input::InputSnapshot;
use super::rendering::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// A simulation driven by the fixed-timestep loop. `update` runs once per tick with a
/// constant `fixed_dt_seconds`; `render` sees only the state left by the last tick.
pub trait Scene {
    fn load(&mut self) {}
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&self, canvas: &mut Canvas<'_>);
    fn unload(&mut self) {}
    fn debug_title(&self) -> Option<String> {
        None
    }
}
