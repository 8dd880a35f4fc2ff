// src/main.rs

use granum::{ControlHandle, EngineHandle, EngineParams, GrainEngine, ModTarget, ModTargets, create_bridge};

/// ===============================
/// Test Source
/// ===============================

/// One second of a decaying two-partial tone.
fn test_tone(sample_rate: f32) -> Vec<f32> {
    let len = sample_rate as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let env = (-3.0 * t).exp();
            env * (0.6 * (t * 220.0 * std::f32::consts::TAU).sin()
                + 0.3 * (t * 330.0 * std::f32::consts::TAU).sin())
        })
        .collect()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

fn render(engine: &mut EngineHandle, left: &mut [f32], right: &mut [f32]) -> f32 {
    engine.process_commands();
    engine.process(left, right);
    peak(left).max(peak(right))
}

fn print_events(control: &ControlHandle) {
    for event in control.poll_events() {
        println!(
            "  grain @ {:.3}  {:.0} ms  pan {:+.2}",
            event.norm_position,
            event.duration * 1000.0,
            event.pan
        );
    }
}

/// ===============================
/// Main
/// ===============================

fn main() {
    let sample_rate = 48_000.0;
    let block_frames = 128;

    // --------------------------------
    // Engine + Bridge
    // --------------------------------

    let mut engine = GrainEngine::new();
    engine.init(sample_rate);
    let (mut control, mut engine) = create_bridge(engine);

    control.load_buffer(test_tone(sample_rate), 1);
    control.update_params_immediate(EngineParams {
        grain_size: 0.08,
        density: 0.02,
        spread: 0.3,
        position: 0.2,
        pan_spread: 0.8,
        detune: 15.0,
        lfo_rate: 2.0,
        lfo_amount: 0.5,
        lfo_target_mask: ModTargets::NONE.with(ModTarget::Position).bits(),
        ..Default::default()
    });
    control.start();

    let mut left = vec![0.0; block_frames];
    let mut right = vec![0.0; block_frames];

    // --------------------------------
    // Run a few blocks
    // --------------------------------

    println!("Starting engine sanity test…");

    for block in 0..8 {
        let level = render(&mut engine, &mut left, &mut right);
        let rb = control.readback();
        println!(
            "--- Block {} @ {:.4}s: {} grains, peak {:.3} ---",
            block, rb.current_time, rb.active_grains, level
        );
        print_events(&control);
    }

    // --------------------------------
    // Freeze
    // --------------------------------

    control.set_frozen(true, 0.75);
    println!("Frozen at 0.75");
    for _ in 0..4 {
        render(&mut engine, &mut left, &mut right);
    }
    print_events(&control);

    control.stop();
    let level = render(&mut engine, &mut left, &mut right);
    println!("Stopped: peak {:.3}, {} grains", level, control.readback().active_grains);

    println!("Sanity test completed.");
}
