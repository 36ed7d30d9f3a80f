use std::sync::Arc;

use rayon::prelude::*;

use crate::error::CompileError;
use crate::eval::{self, Inputs};
use crate::program::CompiledProgram;
use crate::value::OutColor;

/// The sentinel color for a pixel whose evaluation faulted: full-intensity
/// red, opaque.
pub const ERROR_PIXEL: [u8; 4] = [255, 0, 0, 255];

/// The indicator filling the whole surface while no usable program is
/// installed.
const FAILURE_FILL: [u8; 4] = [255, 0, 0, 255];

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ THE PIXEL BUFFER ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A dense row-major RGBA8 pixel buffer.
///
/// The buffer is owned by the driver, overwritten in full on every pass and
/// only ever exposed by shared reference, so collaborators cannot observe a
/// partially written frame through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    fn new(width: usize, height: usize) -> Self {
        PixelBuffer {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The interleaved RGBA bytes, row-major from the top row down.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The four channel bytes of the pixel at buffer position `(x, y)`,
    /// where row `y = 0` is the top of the surface.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    fn fill(&mut self, rgba: [u8; 4]) {
        for pixel in self.data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    /// The rows as disjoint mutable slices, one buffer region per rayon
    /// work item.
    fn par_rows_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, u8> {
        self.data.par_chunks_exact_mut(self.width * 4)
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ EXTERNAL COLLABORATORS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The editor collaborator: supplies shader source on demand. The driver
/// pulls from it only when the collaborator signals a change (via
/// [`Renderer::reload_from`]); debouncing rapid edits is the collaborator's
/// responsibility.
pub trait SourceProvider {
    fn current_source(&self) -> String;
}

/// The display collaborator: receives the full pixel buffer once per pass,
/// after all pixels are written.
pub trait PresentTarget {
    fn present(&mut self, buffer: &PixelBuffer);
}

/// An externally driven animation clock. Each tick yields the monotonic
/// elapsed time in seconds for the next frame; `None` ends the animation.
/// The driver never reads the system clock itself.
pub trait FrameClock {
    fn next_tick(&mut self) -> Option<f64>;
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ THE RASTERIZER DRIVER ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The evaluator/rasterizer driver.
///
/// State machine: uninitialized, holding a compiled program, or faulted.
/// [`Renderer::compile`] moves between the latter two; a pass rendered in
/// the faulted (or uninitialized) state paints the failure indicator over
/// the entire surface instead of evaluating pixels.
pub struct Renderer {
    width: usize,
    height: usize,
    buffer: PixelBuffer,
    program: Option<Arc<CompiledProgram>>,
    faulted: bool,
}

impl Renderer {
    /// A driver for a `width` by `height` surface, initially holding no
    /// program.
    pub fn new(width: usize, height: usize) -> Self {
        Renderer {
            width,
            height,
            buffer: PixelBuffer::new(width, height),
            program: None,
            faulted: true,
        }
    }

    /// Whether the last compile failed (or none succeeded yet).
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// The buffer written by the most recent pass.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Compile `source` and, on success, atomically replace the held
    /// program and clear the faulted state.
    ///
    /// On failure the driver becomes faulted but the previously compiled
    /// program (if any) stays installed, so a later corrected compile
    /// recovers without losing it.
    #[tracing::instrument(skip_all)]
    pub fn compile(&mut self, source: &str) -> Result<(), CompileError> {
        match crate::compile(source) {
            Ok(program) => {
                self.program = Some(Arc::new(program));
                self.faulted = false;
                Ok(())
            }
            Err(e) => {
                self.faulted = true;
                tracing::warn!(error = %e, "compile failed");
                Err(e)
            }
        }
    }

    /// Recompile from the editor collaborator, in response to its change
    /// signal.
    pub fn reload_from(&mut self, provider: &impl SourceProvider) -> Result<(), CompileError> {
        self.compile(&provider.current_source())
    }

    /// Render one full pass at the given clock value and return the buffer.
    ///
    /// Pixels are evaluated row-major with `uv = (x / width,
    /// (height - 1 - y) / height)` — the vertical axis is flipped to a
    /// bottom-left origin. Each pixel evaluation is independent: a faulting
    /// pixel is written as the red sentinel and the pass continues. Rows
    /// run in parallel; each owns a disjoint buffer slice and reads the
    /// program snapshot taken at the start of the pass, so a concurrent
    /// compile never produces a partially-old, partially-new frame.
    #[tracing::instrument(skip(self))]
    pub fn render_pass(&mut self, clock: f64) -> &PixelBuffer {
        let program = match (&self.program, self.faulted) {
            (Some(program), false) => Arc::clone(program),
            _ => {
                self.buffer.fill(FAILURE_FILL);
                return &self.buffer;
            }
        };
        let (width, height) = (self.width, self.height);
        let faults: u64 = self
            .buffer
            .par_rows_mut()
            .enumerate()
            .map(|(y, row)| {
                let mut row_faults = 0;
                for x in 0..width {
                    let inputs = Inputs {
                        uv: (
                            x as f64 / width as f64,
                            (height - 1 - y) as f64 / height as f64,
                        ),
                        time: clock,
                    };
                    let mut out = OutColor::new();
                    let rgba = match eval::run_pixel(&program, &inputs, &mut out) {
                        Ok(()) => out.to_rgba8(),
                        Err(_) => {
                            row_faults += 1;
                            ERROR_PIXEL
                        }
                    };
                    row[x * 4..x * 4 + 4].copy_from_slice(&rgba);
                }
                row_faults
            })
            .sum();
        if faults > 0 {
            tracing::debug!(faults, "pixels recovered with the sentinel color");
        }
        &self.buffer
    }

    /// Drive the animated mode: one pass per clock tick with the currently
    /// held program, each full frame published to `target` after the pass
    /// completes. Recompilation never happens implicitly here; it is driven
    /// by the editor's change signal through [`Renderer::reload_from`].
    pub fn animate(&mut self, clock: &mut dyn FrameClock, target: &mut dyn PresentTarget) {
        while let Some(elapsed) = clock.next_tick() {
            self.render_pass(elapsed);
            target.present(&self.buffer);
        }
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

#[cfg(test)]
mod tests {
    use super::*;

    const UV_GRADIENT: &str = "\
void main() {
    vec3 color = vec3(uv.x, uv.y, 0.5);
    gl_FragColor = vec4(color, 1.0);
}";

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn renders_the_uv_gradient_scenario() {
        init_tracing();
        let mut renderer = Renderer::new(4, 4);
        renderer.compile(UV_GRADIENT).unwrap();
        let buffer = renderer.render_pass(0.0);
        // bottom-left convention: buffer row 0 carries uv.y = 3/4
        assert_eq!(buffer.pixel(0, 0), [0, 191, 127, 255]);
        // bottom row of the surface is uv.y = 0
        assert_eq!(buffer.pixel(0, 3), [0, 0, 127, 255]);
        // uv.x sweeps left to right
        assert_eq!(buffer.pixel(2, 3), [127, 0, 127, 255]);
    }

    #[test]
    fn faulting_pixels_are_painted_the_sentinel_and_the_pass_completes() {
        let mut renderer = Renderer::new(3, 3);
        renderer
            .compile("gl_FragColor = texture2D(uv);")
            .unwrap();
        let buffer = renderer.render_pass(0.0);
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(buffer.pixel(x, y), ERROR_PIXEL);
            }
        }
    }

    #[test]
    fn a_pixel_fault_does_not_leak_into_other_pixels() {
        let mut renderer = Renderer::new(2, 1);
        // faults only where uv.x is zero: 0/0 is a division domain fault
        renderer
            .compile("gl_FragColor = vec4(0.0, uv.x / uv.x, 0.0, 1.0);")
            .unwrap();
        let buffer = renderer.render_pass(0.0);
        assert_eq!(buffer.pixel(0, 0), ERROR_PIXEL);
        assert_eq!(buffer.pixel(1, 0), [0, 255, 0, 255]);
    }

    #[test]
    fn uninitialized_driver_renders_the_failure_indicator() {
        let mut renderer = Renderer::new(2, 2);
        assert!(renderer.is_faulted());
        let buffer = renderer.render_pass(0.0);
        assert!(buffer.data().chunks_exact(4).all(|p| p == FAILURE_FILL));
    }

    #[test]
    fn failed_compile_keeps_the_previous_program_and_faults_the_driver() {
        let mut renderer = Renderer::new(2, 2);
        renderer.compile(UV_GRADIENT).unwrap();
        renderer.render_pass(0.0);

        assert!(renderer.compile("gl_FragColor vec4(1.0);").is_err());
        assert!(renderer.is_faulted());
        // the previous program survives the failed compile
        assert!(renderer.program.is_some());
        // but the next pass shows the failure indicator, not stale pixels
        let buffer = renderer.render_pass(0.0);
        assert!(buffer.data().chunks_exact(4).all(|p| p == FAILURE_FILL));

        // a corrected source recovers the driver
        renderer.compile(UV_GRADIENT).unwrap();
        assert!(!renderer.is_faulted());
        let buffer = renderer.render_pass(0.0);
        assert_eq!(buffer.pixel(0, 0), [0, 127, 127, 255]);
    }

    struct Editor(&'static str);
    impl SourceProvider for Editor {
        fn current_source(&self) -> String {
            self.0.to_owned()
        }
    }

    #[test]
    fn reload_pulls_source_from_the_editor_collaborator() {
        let mut renderer = Renderer::new(2, 2);
        renderer.reload_from(&Editor(UV_GRADIENT)).unwrap();
        assert!(!renderer.is_faulted());
    }

    struct Ticks(std::vec::IntoIter<f64>);
    impl FrameClock for Ticks {
        fn next_tick(&mut self) -> Option<f64> {
            self.0.next()
        }
    }

    struct Frames(Vec<PixelBuffer>);
    impl PresentTarget for Frames {
        fn present(&mut self, buffer: &PixelBuffer) {
            self.0.push(buffer.clone());
        }
    }

    #[test]
    fn animation_publishes_one_full_frame_per_tick() {
        let mut renderer = Renderer::new(2, 2);
        renderer
            .compile("gl_FragColor = vec4(cos(time), cos(time), cos(time), 1.0);")
            .unwrap();
        let mut clock = Ticks(vec![0.0, std::f64::consts::PI].into_iter());
        let mut frames = Frames(vec![]);
        renderer.animate(&mut clock, &mut frames);

        assert_eq!(frames.0.len(), 2);
        // cos(0) = 1 fills white, cos(pi) = -1 clamps to black
        assert!(frames.0[0]
            .data()
            .chunks_exact(4)
            .all(|p| p == [255, 255, 255, 255]));
        assert!(frames.0[1]
            .data()
            .chunks_exact(4)
            .all(|p| p == [0, 0, 0, 255]));
    }
}
