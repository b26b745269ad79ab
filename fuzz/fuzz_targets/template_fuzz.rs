//! Template fuzz target: render arbitrary text through the bundled template engine.
//! Rendering must not panic; it should return Ok(text) or Err(TemplateError).
//! Build with: cargo fuzz run template_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    use mavsharp::{Context, MavTemplate, TemplateRenderer};
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let ctx = Context::new()
        .with("name", "HEARTBEAT")
        .with_list("items", vec![Context::new().with("id", 0), Context::new().with("id", 1)]);
    let _ = MavTemplate.render(s, &ctx);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run template_fuzz");
}
