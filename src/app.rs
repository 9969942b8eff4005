use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
pub use winit::keyboard::KeyCode;
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::error::Error;
use crate::input::{InputState, key_scalar};
use crate::renderer::Renderer;
use crate::renderer::atlas::{AtlasLayout, AtlasSource, Glyph};
use crate::renderer::tiles::{Color, TileRenderer};

// ── Scene trait ───────────────────────────────────────────────────────────────

/// Per-frame callback point. The scene sees input and a tile-drawing
/// handle, never the windowing library's event types.
pub trait Scene {
    fn frame(&mut self, frame: &mut Frame<'_>);
}

/// Everything a scene may touch during one frame.
pub struct Frame<'a> {
    pub input: &'a InputState,
    /// Seconds since the previous frame (0 on the first).
    pub dt: f32,
    atlas: AtlasLayout,
    tiles: &'a mut TileRenderer,
}

impl Frame<'_> {
    /// Queue one tile at grid cell `(col, row)`. Tiles drawn later in
    /// the same frame win over earlier ones at the same cell.
    pub fn draw_tile(&mut self, cell: (u32, u32), glyph: Glyph, fg: Color, bg: Color, inverse: bool) {
        self.tiles.render_tile(&self.atlas, cell, glyph, fg, bg, inverse);
    }
}

// ── Frame timing ──────────────────────────────────────────────────────────────

/// Rolling frame-time average over a fixed window, reported for
/// diagnostics every `FRAME_WINDOW` frames.
const FRAME_WINDOW: u32 = 30;

struct FrameClock {
    delta_sum: f32,
    frames_left: u32,
}

impl FrameClock {
    fn new() -> Self {
        Self { delta_sum: 0.0, frames_left: FRAME_WINDOW }
    }

    /// Fold in one frame's delta; yields the window average in seconds
    /// when the window completes.
    fn advance(&mut self, dt: f32) -> Option<f32> {
        self.delta_sum += dt;
        self.frames_left -= 1;
        if self.frames_left == 0 {
            let avg = self.delta_sum / FRAME_WINDOW as f32;
            self.delta_sum = 0.0;
            self.frames_left = FRAME_WINDOW;
            Some(avg)
        } else {
            None
        }
    }
}

// ── AppBuilder ────────────────────────────────────────────────────────────────

pub struct AppBuilder {
    title: String,
    grid_cols: u32,
    grid_rows: u32,
    tile_w: u32,
    tile_h: u32,
    atlas: AtlasSource,
    atlas_cols: u32,
    initial_glyph: Glyph,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self {
            title: "glyphpane".into(),
            grid_cols: 90,
            grid_rows: 50,
            tile_w: 16,
            tile_h: 16,
            atlas: AtlasSource::Bytes(crate::DEFAULT_TILESET),
            atlas_cols: crate::DEFAULT_ATLAS_COLS,
            initial_glyph: b'A',
        }
    }
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &str) -> Self { self.title = title.into(); self }
    pub fn with_grid(mut self, cols: u32, rows: u32) -> Self {
        self.grid_cols = cols; self.grid_rows = rows; self
    }
    pub fn with_tile_size(mut self, w: u32, h: u32) -> Self {
        self.tile_w = w; self.tile_h = h; self
    }
    pub fn with_atlas(mut self, source: AtlasSource, cols: u32) -> Self {
        self.atlas = source; self.atlas_cols = cols; self
    }
    pub fn with_initial_glyph(mut self, glyph: Glyph) -> Self {
        self.initial_glyph = glyph; self
    }

    /// Open the window and drive `scene` until close is requested.
    /// Startup failures (atlas, shaders, GPU context) abort before the
    /// frame loop with a diagnostic naming the failed stage.
    pub fn run(self, scene: impl Scene + 'static) -> anyhow::Result<()> {
        let event_loop = EventLoop::new()?;
        let mut app = App {
            config: self,
            scene: Box::new(scene),
            state: None,
            fatal: None,
            last_instant: None,
            clock: FrameClock::new(),
        };
        event_loop.run_app(&mut app)?;

        if let Some(e) = app.fatal {
            return Err(e.into());
        }
        Ok(())
    }
}

// ── App (winit ApplicationHandler) ────────────────────────────────────────────

struct AppState {
    renderer: Renderer,
    tiles: TileRenderer,
    input: InputState,
    atlas: AtlasLayout,
}

struct App {
    config: AppBuilder,
    scene: Box<dyn Scene>,
    state: Option<AppState>,
    /// Startup error carried out of the event loop by `run`.
    fatal: Option<Error>,
    last_instant: Option<Instant>,
    clock: FrameClock,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<AppState, Error> {
        let width = self.config.grid_cols * self.config.tile_w;
        let height = self.config.grid_rows * self.config.tile_h;

        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(&self.config.title)
                        .with_inner_size(winit::dpi::PhysicalSize::new(width, height))
                        .with_resizable(false),
                )
                .map_err(|e| Error::ContextInit(format!("window creation: {e}")))?,
        );

        let renderer = pollster::block_on(Renderer::new(
            Arc::clone(&window),
            &self.config.atlas,
            self.config.atlas_cols,
            self.config.tile_w,
            self.config.tile_h,
        ))?;

        let atlas = renderer.atlas_layout();
        Ok(AppState {
            renderer,
            tiles: TileRenderer::new(self.config.tile_w, self.config.tile_h),
            input: InputState::new(self.config.initial_glyph),
            atlas,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        match self.init(event_loop) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("startup failed: {e}");
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_ref() {
            state.renderer.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else { return };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => state.renderer.resize(size),

            WindowEvent::KeyboardInput { event, .. } => {
                // Presses and repeats both update the selection, as in
                // the original key callback; Escape requests close.
                if event.state == ElementState::Pressed {
                    if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                        event_loop.exit();
                    } else if let Some(scalar) = key_scalar(&event) {
                        state.input.accept_scalar(scalar);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = match self.last_instant {
                    Some(prev) => now.duration_since(prev).as_secs_f32(),
                    None => 0.0,
                };
                self.last_instant = Some(now);
                if let Some(avg) = self.clock.advance(dt) {
                    log::trace!("avg frame delay: {:.3} ms", avg * 1000.0);
                }

                state.tiles.clear();
                self.scene.frame(&mut Frame {
                    input: &state.input,
                    dt,
                    atlas: state.atlas,
                    tiles: &mut state.tiles,
                });

                match state.renderer.render(state.tiles.instances()) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let size = state.renderer.window.inner_size();
                        state.renderer.resize(size);
                    }
                    Err(e) => log::error!("render error: {e}"),
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clock_reports_average_once_per_window() {
        let mut clock = FrameClock::new();
        for _ in 0..FRAME_WINDOW - 1 {
            assert_eq!(clock.advance(0.016), None);
        }
        let avg = clock.advance(0.016).expect("window should complete");
        assert!((avg - 0.016).abs() < 1e-6);
    }

    #[test]
    fn frame_clock_resets_after_reporting() {
        let mut clock = FrameClock::new();
        for _ in 0..FRAME_WINDOW {
            clock.advance(0.032);
        }
        // Second window sees only its own deltas.
        for _ in 0..FRAME_WINDOW - 1 {
            assert_eq!(clock.advance(0.008), None);
        }
        let avg = clock.advance(0.008).unwrap();
        assert!((avg - 0.008).abs() < 1e-6);
    }
}
