// Copyright (c) 2024 Mike Tsao

use more_asserts::assert_gt;
use patchcord::{engine::Playback, prelude::*};
use strum::IntoEnumIterator;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn small_patch() -> Patch {
    Patch::new_with(
        VirtualEngine::default(),
        PatchSettings {
            distortion_curve_samples: 256,
            noise_seconds: Seconds(0.05),
            reverb_impulse_seconds: Seconds(0.05),
            rng_seed: Some(1234),
            ..Default::default()
        },
    )
}

fn assert_adjacency_is_mutual(patch: &Patch) {
    for uid in patch.uids() {
        for out in patch.outputs(*uid) {
            assert!(
                patch.inputs(*out).contains(uid),
                "{uid} -> {out} missing from {out}'s inputs"
            );
        }
        for inp in patch.inputs(*uid) {
            assert!(
                patch.outputs(*inp).contains(uid),
                "{inp} -> {uid} missing from {inp}'s outputs"
            );
        }
    }
}

// Builds a signal chain with every kind of module, then tears it down one
// module at a time, checking after each step that nothing refers to deleted
// modules.
#[test]
fn build_and_dismantle_a_full_patch() {
    init();
    let mut patch = small_patch();

    let uids: Vec<Uid> = ModuleKind::iter()
        .map(|kind| patch.create_module(kind))
        .collect();
    assert_eq!(patch.len(), ModuleKind::iter().count());

    // Chain everything that can take input after everything before it.
    for pair in uids.windows(2) {
        patch.connect(pair[0], pair[1]);
    }
    patch.connect_to_output(*uids.last().unwrap());
    assert_adjacency_is_mutual(&patch);

    let mut remaining = uids;
    while let Some(uid) = remaining.pop() {
        assert!(patch.delete_module(uid));
        assert!(!patch.delete_module(uid));
        assert_adjacency_is_mutual(&patch);
        for other in patch.uids() {
            assert!(!patch.inputs(*other).contains(&uid));
            assert!(!patch.outputs(*other).contains(&uid));
        }
    }
    assert!(patch.is_empty());
}

#[test]
fn connecting_twice_is_the_same_as_once() {
    init();
    let mut patch = small_patch();
    let noise = patch.create_module(ModuleKind::Noise);
    let distortion = patch.create_module(ModuleKind::Distortion);
    let compressor = patch.create_module(ModuleKind::Compressor);

    patch.connect(noise, distortion);
    patch.connect(distortion, compressor);
    let edges_once = patch.engine().edges().len();
    let snapshot_once = patch.snapshot();

    patch.connect(noise, distortion);
    patch.connect(distortion, compressor);
    assert_eq!(patch.engine().edges().len(), edges_once);
    assert_eq!(patch.snapshot(), snapshot_once);
}

#[test]
fn deleting_sources_stops_them_once() {
    init();
    let mut patch = small_patch();
    let mut source_nodes = Vec::default();
    for kind in [ModuleKind::Oscillator, ModuleKind::Lfo, ModuleKind::Noise] {
        let uid = patch.create_module(kind);
        let node = match patch.module(uid).unwrap().core() {
            ModuleCore::Oscillator(c) => c.osc(),
            ModuleCore::Lfo(c) => c.osc(),
            ModuleCore::Noise(c) => c.source(),
            _ => unreachable!(),
        };
        assert_eq!(
            patch.engine().node(node).unwrap().playback(),
            Playback::Playing
        );
        source_nodes.push((uid, node));
    }

    for (uid, node) in source_nodes {
        patch.delete_module(uid);
        patch.delete_module(uid);
        let node = patch.engine().node(node).unwrap();
        assert_eq!(node.playback(), Playback::Stopped);
        assert_eq!(node.stop_count(), 1);
    }
}

#[test]
fn delay_feeds_downstream_from_its_mixer() {
    init();
    let mut patch = small_patch();
    let osc = patch.create_module(ModuleKind::Oscillator);
    let delay = patch.create_module(ModuleKind::Delay);
    let reverb = patch.create_module(ModuleKind::Reverb);
    patch.connect(osc, delay);
    patch.connect(delay, reverb);
    patch.connect_to_output(reverb);

    let delay_module = patch.module(delay).unwrap();
    let reverb_in = patch.module(reverb).unwrap().input().unwrap();
    assert!(patch.engine().is_connected(delay_module.output(), reverb_in));

    // Deleting the delay leaves its internal feedback loop alone but cuts
    // every edge to and from its ports.
    let (delay_in, delay_out) = (delay_module.input().unwrap(), delay_module.output());
    let osc_out = patch.module(osc).unwrap().output();
    patch.delete_module(delay);
    assert!(!patch.engine().is_connected(osc_out, delay_in));
    assert!(!patch.engine().is_connected(delay_out, reverb_in));
    assert!(patch.outputs(osc).is_empty());
    assert!(patch.inputs(reverb).is_empty());
}

#[test]
fn snapshot_reports_current_controls() {
    init();
    let mut patch = small_patch();
    let chorus = patch.create_module(ModuleKind::Chorus);
    patch.set_control(chorus, ModuleControl::Mix, 0.8);
    patch.set_control(chorus, ModuleControl::Rate, 1.5);

    let view = patch
        .list_modules()
        .into_iter()
        .find(|m| m.uid == chorus)
        .unwrap();
    assert_eq!(view.name, format!("Chorus #{chorus}"));
    assert_eq!(
        view.controls,
        vec![
            (ModuleControl::Rate, 1.5),
            (ModuleControl::Depth, 0.5),
            (ModuleControl::Mix, 0.8),
        ]
    );
    assert_eq!(view.source_state, Some(SourceState::Running));
    assert_gt!(patch.snapshot().to_json().unwrap().len(), 0);
}

#[test]
fn settings_drive_module_construction() {
    init();
    let settings = PatchSettings::from_json(
        r#"{ "sample-rate": 8000, "noise-seconds": 0.5, "rng-seed": 99 }"#,
    )
    .unwrap();
    let mut patch = Patch::new_with(VirtualEngine::new_with(settings.sample_rate), settings);
    let noise = patch.create_module(ModuleKind::Noise);
    let ModuleCore::Noise(core) = patch.module(noise).unwrap().core() else {
        panic!("expected a noise module");
    };
    let buffer = patch.engine().node(core.source()).unwrap().buffer().unwrap();
    assert_eq!(buffer.len(), 4000);
}

#[test]
fn oscillator_into_filter_then_delete_filter() {
    init();
    let mut patch = small_patch();
    let osc = patch.create_module(ModuleKind::Oscillator);
    let filter = patch.create_module(ModuleKind::Filter);
    assert_eq!(patch.control_value(osc, ModuleControl::Frequency), Some(220.0));
    assert_eq!(patch.control_value(osc, ModuleControl::Gain), Some(0.5));
    assert_eq!(patch.control_value(filter, ModuleControl::Frequency), Some(800.0));
    assert_eq!(patch.control_value(filter, ModuleControl::Q), Some(1.0));

    assert!(patch.connect(osc, filter));
    assert_eq!(patch.inputs(filter), &[osc]);
    assert_eq!(patch.outputs(osc), &[filter]);

    assert!(patch.delete_module(filter));
    assert!(patch.outputs(osc).is_empty());
}

#[test]
fn unknown_names_create_nothing() {
    init();
    let mut patch = small_patch();
    assert!(patch.create_module_named("theremin").is_none());
    let lfo = patch.create_module_named("lfo").unwrap();
    assert_eq!(patch.module(lfo).unwrap().name(), format!("LFO #{lfo}"));
    assert!(!patch.set_control_named(lfo, "wobble", 1.0));
    assert!(!patch.set_control_named(lfo, "mix", 1.0));
    assert!(patch.set_control_named(lfo, "freq", 3.0));
    assert_eq!(patch.control_value(lfo, ModuleControl::Frequency), Some(3.0));
}
