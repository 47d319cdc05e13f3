use crate::error::{Result, SnakeError};
use crate::game::Frame;
use crate::snake::Direction;
use pixels::{Pixels, SurfaceTexture};
use std::time::{Duration, Instant};
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

/// Whether the loop should keep ticking.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// RGBA colours for the snake squares.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub outer: [u8; 4],
    pub inner: [u8; 4],
}

impl Palette {
    pub const GREEN: Palette = Palette { outer: [0x00, 0x64, 0x00, 0xFF], inner: [0x90, 0xEE, 0x90, 0xFF] };
    pub const BLUE: Palette = Palette { outer: [0x00, 0x00, 0xFF, 0xFF], inner: [0xAD, 0xD8, 0xE6, 0xFF] };
}

const BACKGROUND: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];
const FOOD: [u8; 4] = [0xFF, 0x00, 0x00, 0xFF];
/// Inset of the inner square inside each snake cell.
const INSET: i32 = 4;
/// Process status when the window closes because of an error.
const FAILURE_EXIT_CODE: i32 = 1;

/// Something the window can drive: advanced once per frame, read back for drawing.
/// The display never writes game state except through `steer`.
pub trait Session {
    fn title(&self) -> &str;
    fn tick(&mut self) -> Result<Flow>;
    fn frame(&self) -> Frame<'_>;
    /// Frames per second.
    fn speed(&self) -> u32;
    /// Keyboard input; ignored unless the session is human-controlled.
    fn steer(&mut self, _dir: Direction) {}
    fn palette(&self) -> Palette {
        Palette::GREEN
    }
}

pub fn key_to_direction(key: VirtualKeyCode) -> Option<Direction> {
    match key {
        VirtualKeyCode::Up | VirtualKeyCode::W => Some(Direction::Up),
        VirtualKeyCode::Down | VirtualKeyCode::S => Some(Direction::Down),
        VirtualKeyCode::Left | VirtualKeyCode::A => Some(Direction::Left),
        VirtualKeyCode::Right | VirtualKeyCode::D => Some(Direction::Right),
        _ => None,
    }
}

/// Open a window and drive `session` at its own speed. Closing the window ends the process.
pub fn run<S: Session + 'static>(mut session: S) -> Result<()> {
    let (width, height) = {
        let f = session.frame();
        (f.width as u32, f.height as u32)
    };

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(session.title())
        .with_inner_size(LogicalSize::new(width as f64, height as f64))
        .with_resizable(false)
        .build(&event_loop)
        .map_err(|e| SnakeError::Display(e.to_string()))?;

    let size = window.inner_size();
    let surface = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(width, height, surface).map_err(|e| SnakeError::Display(e.to_string()))?;

    let mut last_update = Instant::now();
    let mut shown_score = None;

    event_loop.run(move |event, _, control_flow| {
        // already shutting down, with or without an error code
        if matches!(*control_flow, ControlFlow::ExitWithCode(_)) {
            return;
        }
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::KeyboardInput {
                    input: KeyboardInput { state: ElementState::Pressed, virtual_keycode: Some(key), .. },
                    ..
                } => {
                    if let Some(dir) = key_to_direction(key) {
                        session.steer(dir);
                    }
                }
                _ => {}
            },

            // frame pacing: one tick per 1/speed seconds
            Event::MainEventsCleared => {
                let interval = Duration::from_secs_f64(1.0 / f64::from(session.speed().max(1)));
                if last_update.elapsed() >= interval {
                    last_update = Instant::now();
                    match after_tick(session.tick()) {
                        None => window.request_redraw(),
                        Some(exit) => {
                            *control_flow = exit;
                            return;
                        }
                    }
                }
                *control_flow = ControlFlow::WaitUntil(last_update + interval);
            }

            Event::RedrawRequested(_) => {
                let frame = session.frame();
                if shown_score != Some(frame.score) {
                    window.set_title(&format!("{} | Score: {}", session.title(), frame.score));
                    shown_score = Some(frame.score);
                }
                draw(pixels.frame_mut(), &frame, session.palette());
                if let Err(err) = pixels.render() {
                    tracing::error!(%err, "render failed");
                    *control_flow = ControlFlow::ExitWithCode(FAILURE_EXIT_CODE);
                }
            }
            _ => {}
        }
    })
}

/// `None` keeps ticking. A stop exits with status 0, a session error with status 1.
fn after_tick(result: Result<Flow>) -> Option<ControlFlow> {
    match result {
        Ok(Flow::Continue) => None,
        Ok(Flow::Stop) => Some(ControlFlow::Exit),
        Err(err) => {
            tracing::error!(%err, "session failed");
            Some(ControlFlow::ExitWithCode(FAILURE_EXIT_CODE))
        }
    }
}

/// Paint a frame into an RGBA buffer of `frame.width * frame.height` pixels.
pub fn draw(buf: &mut [u8], frame: &Frame<'_>, palette: Palette) {
    for pixel in buf.chunks_exact_mut(4) {
        pixel.copy_from_slice(&BACKGROUND);
    }
    for seg in frame.snake.iter() {
        fill_rect(buf, frame.width, seg.x, seg.y, frame.block, palette.outer);
        fill_rect(buf, frame.width, seg.x + INSET, seg.y + INSET, frame.block - 2 * INSET, palette.inner);
    }
    fill_rect(buf, frame.width, frame.food.x, frame.food.y, frame.block, FOOD);
}

/// Square of side `size` at (x, y), clipped to the buffer.
fn fill_rect(buf: &mut [u8], width: i32, x: i32, y: i32, size: i32, color: [u8; 4]) {
    if size <= 0 || width <= 0 {
        return;
    }
    let height = (buf.len() / 4) as i32 / width;
    for py in y.max(0)..(y + size).min(height) {
        for px in x.max(0)..(x + size).min(width) {
            let i = ((py * width + px) * 4) as usize;
            buf[i..i + 4].copy_from_slice(&color);
        }
    }
}
