use std::io::{self, Write};

use fraglet::Renderer;

const SOURCE: &str = "\
// uv gradient over a constant blue channel
void main() {
    vec3 color = vec3(uv.x, uv.y, 0.5);
    gl_FragColor = vec4(color, 1.0);
}";

fn main() -> io::Result<()> {
    let mut renderer = Renderer::new(256, 256);
    if let Err(err) = renderer.compile(SOURCE) {
        eprintln!("{}", err);
        return Ok(());
    }
    let buffer = renderer.render_pass(0.0);

    // write the frame as binary PPM to stdout, dropping the alpha channel
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "P6\n{} {}\n255\n", buffer.width(), buffer.height())?;
    for pixel in buffer.data().chunks_exact(4) {
        out.write_all(&pixel[..3])?;
    }
    Ok(())
}
