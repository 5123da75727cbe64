//! Integration tests: compositing-mode dispatch (easel-sketch → easel-render).
//!
//! Every mode token is pushed through the sketch API and checked on both
//! backends, including the pixels the 2D reference compositor produces.

use easel_core::Color;
use easel_render::context2d::to_peniko;
use easel_render::context3d::fixed_function_blend;
use easel_sketch::{Backend, BlendMode, EaselError, Sketch};
use pretty_assertions::assert_eq;

const TOKENS: [&str; 14] = [
    "BLEND",
    "DARKEST",
    "LIGHTEST",
    "DIFFERENCE",
    "MULTIPLY",
    "EXCLUSION",
    "SCREEN",
    "REPLACE",
    "OVERLAY",
    "HARD_LIGHT",
    "SOFT_LIGHT",
    "DODGE",
    "BURN",
    "ADD",
];

fn sketch_with(backend: Backend) -> Sketch {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut sketch = Sketch::headless();
    sketch.create_canvas(4.0, 4.0, backend).unwrap();
    sketch
}

fn active_mode(sketch: &Sketch) -> BlendMode {
    sketch
        .default_renderer()
        .map(|r| r.borrow().blend_mode())
        .unwrap()
}

// ─── Dispatch ───────────────────────────────────────────────────────────

#[test]
fn every_token_is_accepted_and_queryable() {
    for backend in [Backend::Rasterized2d, Backend::Accelerated3d] {
        let mut sketch = sketch_with(backend);
        for token in TOKENS {
            let mode = sketch.blend_mode(token).unwrap();
            assert_eq!(mode.token(), token);
            assert_eq!(active_mode(&sketch), mode, "{backend}: {token}");
        }
    }
}

#[test]
fn unknown_token_fails_and_keeps_mode() {
    let mut sketch = sketch_with(Backend::Rasterized2d);
    sketch.blend_mode("OVERLAY").unwrap();

    let err = sketch.blend_mode("bogus").unwrap_err();

    assert_eq!(err, EaselError::UnsupportedMode("bogus".into()));
    assert!(err.to_string().contains("bogus"));
    assert_eq!(active_mode(&sketch), BlendMode::Overlay);
}

#[test]
fn normal_alias_resolves_to_blend() {
    let mut sketch = sketch_with(Backend::Rasterized2d);
    sketch.blend_mode("MULTIPLY").unwrap();
    assert_eq!(sketch.blend_mode("NORMAL"), Ok(BlendMode::Blend));
    assert_eq!(active_mode(&sketch), BlendMode::Blend);
}

#[test]
fn tokens_are_case_sensitive() {
    let mut sketch = sketch_with(Backend::Rasterized2d);
    assert!(matches!(
        sketch.blend_mode("Screen"),
        Err(EaselError::UnsupportedMode(_))
    ));
}

// ─── Backend mapping ────────────────────────────────────────────────────

#[test]
fn rasterized_mode_maps_to_composite_operation() {
    let mut sketch = sketch_with(Backend::Rasterized2d);
    sketch.blend_mode("DODGE").unwrap();

    let canvas = sketch.default_renderer().unwrap();
    let snapshot = canvas.borrow().snapshot();
    assert_eq!(
        snapshot.get("global_composite_operation").and_then(|v| v.as_text()),
        Some("color-dodge")
    );
}

#[test]
fn rasterized_mode_maps_to_peniko_blend() {
    let mut sketch = sketch_with(Backend::Rasterized2d);
    let canvas = sketch.default_renderer().unwrap();
    for token in TOKENS {
        let mode = sketch.blend_mode(token).unwrap();
        assert_eq!(
            canvas.borrow().as_2d().map(|c| c.peniko_blend()),
            Some(to_peniko(mode)),
            "{token}"
        );
    }
    sketch.blend_mode("ADD").unwrap();
    assert_eq!(
        canvas.borrow().as_2d().map(|c| c.peniko_blend().compose),
        Some(peniko::Compose::Plus)
    );
}

#[test]
fn shader_only_modes_fall_back_on_accelerated_backend() {
    let mut sketch = sketch_with(Backend::Accelerated3d);
    let canvas = sketch.default_renderer().unwrap();

    sketch.blend_mode("SOFT_LIGHT").unwrap();
    assert_eq!(active_mode(&sketch), BlendMode::SoftLight);
    assert_eq!(
        canvas.borrow().as_3d().map(|c| c.blend_state()),
        fixed_function_blend(BlendMode::Blend)
    );

    sketch.blend_mode("ADD").unwrap();
    assert_eq!(
        canvas.borrow().as_3d().map(|c| c.blend_state()),
        fixed_function_blend(BlendMode::Add)
    );
}

// ─── Pixels ─────────────────────────────────────────────────────────────

#[test]
fn modes_composite_into_the_pixel_buffer() {
    let mut sketch = sketch_with(Backend::Rasterized2d);
    let canvas = sketch.default_renderer().unwrap();
    let red = Color::from_rgba8(255, 0, 0, 255);

    // Defaults fill with white.
    canvas.borrow_mut().as_2d_mut().unwrap().fill_rect(0.0, 0.0, 4.0, 4.0);

    sketch.blend_mode("MULTIPLY").unwrap();
    {
        let mut r = canvas.borrow_mut();
        let ctx = r.as_2d_mut().unwrap();
        ctx.state_mut().fill_style = red;
        ctx.fill_rect(0.0, 0.0, 2.0, 4.0);
    }

    sketch.blend_mode("DIFFERENCE").unwrap();
    {
        let mut r = canvas.borrow_mut();
        let ctx = r.as_2d_mut().unwrap();
        ctx.state_mut().fill_style = Color::WHITE;
        ctx.fill_rect(0.0, 0.0, 1.0, 4.0);
    }

    let r = canvas.borrow();
    let ctx = r.as_2d().unwrap();
    assert_eq!(ctx.pixel(0, 0).map(Color::to_rgba8), Some([0, 255, 255, 255]));
    assert_eq!(ctx.pixel(1, 0).map(Color::to_rgba8), Some([255, 0, 0, 255]));
    assert_eq!(ctx.pixel(3, 3).map(Color::to_rgba8), Some([255, 255, 255, 255]));
}

#[test]
fn resize_restores_active_mode() {
    let mut sketch = sketch_with(Backend::Rasterized2d);
    sketch.blend_mode("BURN").unwrap();
    sketch.resize_canvas(8.0, 8.0, true).unwrap();
    assert_eq!(active_mode(&sketch), BlendMode::Burn);
}
