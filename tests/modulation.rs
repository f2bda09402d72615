// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use patchcord::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn new_patch() -> Patch {
    Patch::new_with(
        VirtualEngine::default(),
        PatchSettings {
            rng_seed: Some(7),
            ..Default::default()
        },
    )
}

#[test]
fn an_lfo_has_exactly_one_route() {
    init();
    let mut patch = new_patch();
    let lfo = patch.create_module(ModuleKind::Lfo);
    let osc = patch.create_module(ModuleKind::Oscillator);
    let gain = patch.create_module(ModuleKind::Gain);

    assert!(patch.route_modulation(lfo, Some(osc), "frequency"));
    assert!(patch.route_modulation(lfo, Some(gain), "gain"));

    let routes: Vec<_> = patch.router().routes().collect();
    assert_eq!(routes.len(), 1);
    let (source, route) = routes[0];
    assert_eq!(*source, lfo);
    assert_eq!(route.target, gain);
    assert_eq!(route.param, ModulatedParam::Gain);

    let lfo_out = patch.module(lfo).unwrap().output();
    let param_edges = patch
        .engine()
        .outgoing_edges(lfo_out)
        .filter(|e| matches!(e.to, patchcord::engine::EdgeTarget::Param(_)))
        .count();
    assert_eq!(param_edges, 1, "the frequency route was unwired");
}

#[test]
fn empty_target_and_bad_names_keep_the_old_route() {
    init();
    let mut patch = new_patch();
    let lfo = patch.create_module(ModuleKind::Lfo);
    let filter = patch.create_module(ModuleKind::Filter);
    assert!(patch.route_modulation(lfo, Some(filter), "q"));
    let before = *patch.router().route_for(lfo).unwrap();

    assert!(!patch.route_modulation(lfo, None, "gain"));
    assert!(!patch.route_modulation(lfo, Some(filter), "pan"));
    assert!(!patch.route_modulation(lfo, Some(filter), "gain"));
    assert_eq!(*patch.router().route_for(lfo).unwrap(), before);
    assert_eq!(before.param, ModulatedParam::Resonance);
}

#[test]
fn lfo_depth_scales_what_reaches_the_target() {
    init();
    let mut patch = new_patch();
    let lfo = patch.create_module(ModuleKind::Lfo);
    let osc = patch.create_module(ModuleKind::Oscillator);
    patch.route_modulation(lfo, Some(osc), "freq");

    // The route leaves from the depth stage, so depth changes apply to it.
    let (from, _) = patch.router().route_for(lfo).unwrap().wire().unwrap();
    assert_eq!(from, patch.module(lfo).unwrap().output());
    patch.set_control(lfo, ModuleControl::Depth, 0.25);
    let depth = patch
        .engine()
        .param_value(ParamId::new(from, ParamName::Gain))
        .unwrap();
    assert!(approx_eq!(f64, depth, 0.25));
}

#[test]
fn envelope_modulates_gain_only() {
    init();
    let mut patch = new_patch();
    let env = patch.create_module(ModuleKind::Envelope);
    let osc = patch.create_module(ModuleKind::Oscillator);
    let filter = patch.create_module(ModuleKind::Filter);

    assert_eq!(
        patch.modulation_targets(env),
        vec![(osc, ModulatedParam::Gain)]
    );
    assert!(!patch.route_modulation(env, Some(filter), "cutoff"));
    assert!(!patch.route_modulation(env, Some(osc), "frequency"));
    assert!(patch.route_modulation(env, Some(osc), "gain"));

    let (from, to) = patch.router().route_for(env).unwrap().wire().unwrap();
    assert_eq!(from, patch.module(env).unwrap().output());
    assert!(patch.engine().is_connected_to_param(from, to));
}

#[test]
fn deleting_a_source_clears_its_route() {
    init();
    let mut patch = new_patch();
    let lfo = patch.create_module(ModuleKind::Lfo);
    let filter = patch.create_module(ModuleKind::Filter);
    patch.route_modulation(lfo, Some(filter), "cutoff");
    let (from, to) = patch.router().route_for(lfo).unwrap().wire().unwrap();

    assert!(patch.delete_module(lfo));
    assert!(patch.router().route_for(lfo).is_none());
    assert!(!patch.engine().is_connected_to_param(from, to));
    assert!(patch.modulation_targets(lfo).is_empty());
}
