//! On-device smoke test for the EGL/OpenVG bindings
//! Brings up the display, drives the host methods and tears everything down

use openvg_egl::bindings::{self, MAKE_CURRENT, SWAP_BUFFERS};
use openvg_egl::{Config, EglState, NativePlatform, Value};
use std::thread;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== EGL/OpenVG Binding Test ===\n");

    println!("--- Test 1: Configuration ---");
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            println!("  FAILED: {}", e);
            return;
        }
    };
    println!("  OK: LCD {} layer {}", config.lcd, config.layer);

    println!("\n--- Test 2: Load native libraries ---");
    let platform = match NativePlatform::load(&config) {
        Ok(p) => p,
        Err(e) => {
            println!("  FAILED: {}", e);
            return;
        }
    };
    println!("  OK: EGL, bcm_host and GLES loaded");

    println!("\n--- Test 3: Initialize display ---");
    let mut egl = match EglState::init(platform, &config) {
        Ok(s) => s,
        Err(e) => {
            println!("  FAILED: {}", e);
            return;
        }
    };
    println!(
        "  OK: {}x{} window surface current",
        egl.screen_width(),
        egl.screen_height()
    );

    println!("\n--- Test 4: GLES projection ---");
    egl.init_opengles();
    println!("  OK");

    println!("\n--- Test 5: swapBuffers via host bindings ---");
    let swap_args = [Value::from(egl.display()), Value::from(egl.surface())];
    for frame in 0..30 {
        if let Err(e) = bindings::invoke(&mut egl, SWAP_BUFFERS, &swap_args) {
            println!("  FAILED on frame {}: {}", frame, e);
            break;
        }
        thread::sleep(Duration::from_millis(16));
    }
    println!("  OK: 30 frames presented");

    println!("\n--- Test 6: makeCurrent via host bindings ---");
    let current_args = [
        Value::from(egl.display()),
        Value::from(egl.surface()),
        Value::from(egl.surface()),
    ];
    match bindings::invoke(&mut egl, MAKE_CURRENT, &current_args) {
        Ok(Value::Boolean(true)) => println!("  OK"),
        Ok(other) => println!("  FAILED: returned {:?}", other),
        Err(e) => println!("  FAILED: {}", e),
    }

    println!("\n--- Test 7: argument validation ---");
    match bindings::invoke(&mut egl, SWAP_BUFFERS, &[Value::Number(0.0)]) {
        Err(e) => println!("  OK: rejected ({})", e),
        Ok(v) => println!("  FAILED: accepted bad arguments, returned {:?}", v),
    }

    println!("\n--- Test 8: Teardown ---");
    match egl.finish() {
        Ok(()) => println!("  OK: display released"),
        Err(e) => println!("  FAILED: {}", e),
    }

    println!("\n=== Done ===");
}
