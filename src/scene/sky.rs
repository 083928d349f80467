use instant::Duration;

use crate::{
    context::Context,
    flow::{GraphicsFlow, Out},
    render::Render,
    scene::{SceneEvent, SceneState},
    settings::Settings,
    sim::{clock::FixedStep, day_night::DayNight},
};

/// Drives the clear colour and the directional light. Draws nothing.
pub struct SkyFlow {
    cycle: DayNight,
    clock: FixedStep,
}

impl SkyFlow {
    pub fn new(settings: &Settings) -> Self {
        Self {
            cycle: DayNight::new(&settings.day_night),
            clock: FixedStep::default(),
        }
    }

    fn apply(&self) -> Out<SceneState, SceneEvent> {
        let lighting = self.cycle.lighting();
        Out::configure(move |ctx| ctx.set_lighting(&lighting))
    }
}

impl GraphicsFlow<SceneState, SceneEvent> for SkyFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut SceneState) -> Out<SceneState, SceneEvent> {
        ctx.set_lighting(&self.cycle.lighting());
        Out::Empty
    }

    fn on_update(
        &mut self,
        _: &Context,
        state: &mut SceneState,
        dt: Duration,
    ) -> Out<SceneState, SceneEvent> {
        if state.paused {
            self.clock.reset();
            return Out::Empty;
        }
        let steps = self.clock.advance(dt);
        if steps == 0 {
            return Out::Empty;
        }
        self.cycle.advance(steps as f32 * FixedStep::step_secs());
        self.apply()
    }

    fn on_tick(&mut self, _: &Context, _: &mut SceneState) -> Out<SceneState, SceneEvent> {
        log::debug!(
            "Time of day {:.2}, daylight {:.2}",
            self.cycle.phase(),
            self.cycle.daylight()
        );
        Out::Empty
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        Render::None
    }
}
