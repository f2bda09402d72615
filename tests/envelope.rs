// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use more_asserts::{assert_gt, assert_lt};
use patchcord::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn envelope_level(patch: &Patch, env: Uid) -> f64 {
    let node = patch.module(env).unwrap().output();
    patch
        .engine()
        .param_value(ParamId::new(node, ParamName::Gain))
        .unwrap()
}

fn phase(patch: &Patch, env: Uid) -> EnvelopePhase {
    let ModuleCore::Envelope(core) = patch.module(env).unwrap().core() else {
        panic!("not an envelope");
    };
    core.phase(patch.engine().current_time())
}

// Attack 0.1, decay 0.2, sustain 0.7, release 0.5, triggered at t0.
#[test]
fn adsr_follows_the_clock() {
    init();
    let mut patch = Patch::default();
    let env = patch.create_module(ModuleKind::Envelope);
    let osc = patch.create_module(ModuleKind::Oscillator);
    patch.connect(osc, env);
    patch.connect_to_output(env);

    let t0 = 2.0;
    patch.engine_mut().set_time(Seconds(t0));
    assert!(patch.trigger(env));

    patch.engine_mut().set_time(Seconds(t0 + 0.05));
    assert!(approx_eq!(f64, envelope_level(&patch, env), 0.5, epsilon = 1e-9));
    assert_eq!(phase(&patch, env), EnvelopePhase::Attacking);

    patch.engine_mut().set_time(Seconds(t0 + 0.2));
    assert_eq!(phase(&patch, env), EnvelopePhase::Decaying);
    assert_lt!(envelope_level(&patch, env), 1.0);
    assert_gt!(envelope_level(&patch, env), 0.7);

    patch.engine_mut().set_time(Seconds(t0 + 0.35));
    assert!(approx_eq!(f64, envelope_level(&patch, env), 0.7, epsilon = 1e-9));
    assert_eq!(phase(&patch, env), EnvelopePhase::Sustaining);

    patch.engine_mut().set_time(Seconds(t0 + 0.4));
    assert!(patch.release(env));
    assert_eq!(phase(&patch, env), EnvelopePhase::Releasing);
    assert!(!patch.release(env), "a second release is a no-op");

    patch.engine_mut().set_time(Seconds(t0 + 0.65));
    assert!(approx_eq!(f64, envelope_level(&patch, env), 0.35, epsilon = 1e-9));

    patch.engine_mut().set_time(Seconds(t0 + 1.0));
    assert!(approx_eq!(f64, envelope_level(&patch, env), 0.0, epsilon = 1e-9));
    assert_eq!(phase(&patch, env), EnvelopePhase::Idle);
}

#[test]
fn controls_shape_the_next_trigger() {
    init();
    let mut patch = Patch::default();
    let env = patch.create_module(ModuleKind::Envelope);
    assert!(patch.set_control(env, ModuleControl::Attack, 1.0));
    assert!(patch.set_control(env, ModuleControl::Sustain, 0.4));
    assert!(!patch.set_control(env, ModuleControl::Frequency, 100.0));

    patch.trigger(env);
    patch.engine_mut().set_time(Seconds(0.5));
    assert!(approx_eq!(f64, envelope_level(&patch, env), 0.5, epsilon = 1e-9));
    patch.engine_mut().set_time(Seconds(2.0));
    assert!(approx_eq!(f64, envelope_level(&patch, env), 0.4, epsilon = 1e-9));
}

#[test]
fn a_suspended_engine_holds_time_still() {
    init();
    let mut engine = VirtualEngine::default();
    engine.set_time(Seconds(5.0));
    assert_eq!(engine.current_time(), Seconds::zero());

    let mut patch = Patch::new_with(engine, PatchSettings::default());
    patch.create_module(ModuleKind::Gain);
    patch.engine_mut().set_time(Seconds(5.0));
    assert_eq!(patch.engine().current_time(), Seconds(5.0));
}
