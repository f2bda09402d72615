// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use delegate::delegate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A read-only view of one module, for rendering controls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleSnapshot {
    #[allow(missing_docs)]
    pub uid: Uid,
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub kind: ModuleKind,
    /// Every settable parameter with its current value, in display order.
    pub controls: Vec<(ModuleControl, ParameterType)>,
    /// None for kinds without a continuous source.
    pub source_state: Option<SourceState>,
    /// Only Envelopes have one.
    pub envelope_phase: Option<EnvelopePhase>,
    /// Only control modules have one, and only once routed.
    pub modulation: Option<ModulationRoute>,
    #[allow(missing_docs)]
    pub inputs: Vec<Uid>,
    #[allow(missing_docs)]
    pub outputs: Vec<Uid>,
}

/// A read-only view of a whole patch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatchSnapshot {
    /// The engine clock when the snapshot was taken.
    pub time: Seconds,
    /// Modules in creation order.
    pub modules: Vec<ModuleSnapshot>,
}
impl PatchSnapshot {
    /// Serializes the snapshot to pretty-printed JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// [Patch] is the surface a user interface talks to. It brings together an
/// [AudioEngine], the [ModuleGraph], and the [ModulationRouter], and makes
/// sure every request either does what was asked or quietly does nothing.
///
/// None of its operations return errors. Requests that make no sense
/// (connecting a module to itself, modulating a parameter the target doesn't
/// have, releasing an idle envelope) are logged and ignored, and the boolean
/// results say whether anything happened.
#[derive(Debug)]
pub struct Patch<E: AudioEngine = VirtualEngine> {
    engine: E,
    lifecycle: EngineLifecycle,
    graph: ModuleGraph,
    router: ModulationRouter,
    settings: PatchSettings,
    rng: Rng,
}
impl Default for Patch<VirtualEngine> {
    fn default() -> Self {
        let settings = PatchSettings::default();
        Self::new_with(VirtualEngine::new_with(settings.sample_rate), settings)
    }
}
impl<E: AudioEngine> Patch<E> {
    #[allow(missing_docs)]
    pub fn new_with(engine: E, settings: PatchSettings) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => Rng::new_with_seed(seed as u128),
            None => Rng::new_from_os_or_fallback(),
        };
        Self {
            engine,
            lifecycle: Default::default(),
            graph: Default::default(),
            router: Default::default(),
            settings,
            rng,
        }
    }

    delegate! {
        to self.graph {
            /// The module with this uid, if it exists.
            pub fn module(&self, uid: Uid) -> Option<&Module>;
            /// Uids in creation order.
            pub fn uids(&self) -> &[Uid];
            /// Modules feeding `uid`.
            pub fn inputs(&self, uid: Uid) -> &[Uid];
            /// Modules `uid` feeds.
            pub fn outputs(&self, uid: Uid) -> &[Uid];
            /// How many modules there are.
            pub fn len(&self) -> usize;
            /// True if the patch has no modules.
            pub fn is_empty(&self) -> bool;
        }
    }

    #[allow(missing_docs)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// For driving the engine clock. Changing the engine's wiring directly
    /// will confuse the graph.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[allow(missing_docs)]
    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    #[allow(missing_docs)]
    pub fn router(&self) -> &ModulationRouter {
        &self.router
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &PatchSettings {
        &self.settings
    }

    /// Resumes the engine the first time it's called. Returns whether the
    /// engine is running.
    pub fn ensure_started(&mut self) -> bool {
        self.lifecycle.ensure_started(&mut self.engine)
    }

    /// Creates a module of the given kind. This is typically the first user
    /// gesture, so it also makes sure the engine is running.
    pub fn create_module(&mut self, kind: ModuleKind) -> Uid {
        self.ensure_started();
        self.graph
            .create_module(kind, &mut self.engine, &self.settings, &mut self.rng)
    }

    /// Like [Patch::create_module()], but with the kind given by name
    /// ("Oscillator", "lfo", ...). An unknown name creates nothing.
    pub fn create_module_named(&mut self, kind: &str) -> Option<Uid> {
        match ModuleKind::from_str(kind) {
            Ok(kind) => Some(self.create_module(kind)),
            Err(_) => {
                log::warn!("unknown module kind {kind:?}");
                None
            }
        }
    }

    #[allow(missing_docs)]
    pub fn connect(&mut self, source: Uid, destination: Uid) -> bool {
        self.graph.connect(&mut self.engine, source, destination)
    }

    #[allow(missing_docs)]
    pub fn disconnect(&mut self, source: Uid, destination: Uid) -> bool {
        self.graph.disconnect(&mut self.engine, source, destination)
    }

    /// Sends a module to the speakers.
    pub fn connect_to_output(&mut self, uid: Uid) -> bool {
        self.graph.connect_to_output(&mut self.engine, uid)
    }

    /// Deletes a module, along with its connections and any modulation routes
    /// from or into it. Returns false if there was no such module.
    pub fn delete_module(&mut self, uid: Uid) -> bool {
        if self.graph.module(uid).is_none() {
            log::debug!("{uid} is already gone");
            return false;
        }
        self.router.sever(&mut self.engine, uid);
        self.graph.delete_module(&mut self.engine, uid).is_some()
    }

    /// Routes a control module's output into a parameter of another module.
    /// `param` accepts "frequency", "freq", "cutoff", "gain", "q", or
    /// "resonance". A None target is a no-op.
    pub fn route_modulation(&mut self, source: Uid, target: Option<Uid>, param: &str) -> bool {
        match ModulatedParam::from_str(param) {
            Ok(param) => self.route_modulation_to(source, target, param),
            Err(_) => {
                log::warn!("{param:?} is not a modulatable parameter");
                false
            }
        }
    }

    /// [Patch::route_modulation()] with an already-parsed parameter.
    pub fn route_modulation_to(
        &mut self,
        source: Uid,
        target: Option<Uid>,
        param: ModulatedParam,
    ) -> bool {
        self.router
            .route(&self.graph, &mut self.engine, source, target, param)
    }

    /// Removes a control module's route, if it has one.
    pub fn clear_modulation(&mut self, source: Uid) -> bool {
        self.router.clear(&mut self.engine, source)
    }

    /// The (target, parameter) pairs `source` could be routed to right now.
    pub fn modulation_targets(&self, source: Uid) -> Vec<(Uid, ModulatedParam)> {
        ModulationRouter::candidates(&self.graph, source)
    }

    /// Sets one of a module's parameters. Returns false if there's no such
    /// module or the module has no such parameter.
    pub fn set_control(&mut self, uid: Uid, control: ModuleControl, value: ParameterType) -> bool {
        match self.graph.module_mut(uid) {
            Some(module) => module
                .core_mut()
                .set_control(&mut self.engine, control, value),
            None => {
                log::warn!("can't set {control} on unknown module {uid}");
                false
            }
        }
    }

    /// [Patch::set_control()] with the parameter given by name.
    pub fn set_control_named(&mut self, uid: Uid, control: &str, value: ParameterType) -> bool {
        match ModuleControl::from_str(control) {
            Ok(control) => self.set_control(uid, control, value),
            Err(_) => {
                log::warn!("unknown parameter {control:?}");
                false
            }
        }
    }

    #[allow(missing_docs)]
    pub fn control_value(&self, uid: Uid, control: ModuleControl) -> Option<ParameterType> {
        self.graph.module(uid)?.core().control_value(control)
    }

    /// Starts an Envelope's attack. False if `uid` isn't an Envelope.
    pub fn trigger(&mut self, uid: Uid) -> bool {
        match self.graph.module_mut(uid).map(|m| m.core_mut()) {
            Some(ModuleCore::Envelope(envelope)) => {
                envelope.trigger(&mut self.engine);
                true
            }
            _ => {
                log::warn!("{uid} is not an envelope");
                false
            }
        }
    }

    /// Starts an Envelope's release. False if `uid` isn't an Envelope or it
    /// isn't playing.
    pub fn release(&mut self, uid: Uid) -> bool {
        match self.graph.module_mut(uid).map(|m| m.core_mut()) {
            Some(ModuleCore::Envelope(envelope)) => envelope.release(&mut self.engine),
            _ => {
                log::warn!("{uid} is not an envelope");
                false
            }
        }
    }

    /// Gives a Noise module a fresh random realization. False if `uid` isn't
    /// a running Noise module.
    pub fn restart_noise(&mut self, uid: Uid) -> bool {
        match self.graph.module_mut(uid).map(|m| m.core_mut()) {
            Some(ModuleCore::Noise(noise)) => noise.restart(&mut self.engine, &mut self.rng),
            _ => {
                log::warn!("{uid} is not a noise module");
                false
            }
        }
    }

    /// A view of every module, in creation order.
    pub fn list_modules(&self) -> Vec<ModuleSnapshot> {
        let now = self.engine.current_time();
        self.graph
            .modules()
            .map(|module| {
                let uid = module.uid();
                ModuleSnapshot {
                    uid,
                    name: module.name().to_string(),
                    kind: module.kind(),
                    controls: module.control_values(),
                    source_state: module.core().source_state(),
                    envelope_phase: match module.core() {
                        ModuleCore::Envelope(e) => Some(e.phase(now)),
                        _ => None,
                    },
                    modulation: self.router.route_for(uid).copied(),
                    inputs: self.graph.inputs(uid).to_vec(),
                    outputs: self.graph.outputs(uid).to_vec(),
                }
            })
            .collect()
    }

    /// A view of the whole patch.
    pub fn snapshot(&self) -> PatchSnapshot {
        PatchSnapshot {
            time: self.engine.current_time(),
            modules: self.list_modules(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_patch() -> Patch {
        Patch::new_with(
            VirtualEngine::default(),
            PatchSettings {
                distortion_curve_samples: 128,
                noise_seconds: Seconds(0.01),
                reverb_impulse_seconds: Seconds(0.01),
                rng_seed: Some(17),
                ..Default::default()
            },
        )
    }

    #[test]
    fn first_creation_starts_the_engine_once() {
        let mut patch = test_patch();
        assert_eq!(patch.engine().state(), EngineState::Suspended);
        patch.create_module(ModuleKind::Gain);
        patch.create_module(ModuleKind::Gain);
        assert_eq!(patch.engine().state(), EngineState::Running);
        assert_eq!(patch.engine().resume_count(), 1);
    }

    #[test]
    fn unknown_kind_creates_nothing() {
        let mut patch = test_patch();
        assert!(patch.create_module_named("Theremin").is_none());
        assert!(patch.is_empty());
        let uid = patch.create_module_named("reverb").unwrap();
        assert_eq!(patch.module(uid).unwrap().kind(), ModuleKind::Reverb);
    }

    #[test]
    fn oscillator_into_filter_then_delete_filter() {
        let mut patch = test_patch();
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
        assert!(!patch.delete_module(filter));
    }

    #[test]
    fn deleting_a_target_severs_its_modulation() {
        let mut patch = test_patch();
        let lfo = patch.create_module(ModuleKind::Lfo);
        let filter = patch.create_module(ModuleKind::Filter);
        assert!(patch.route_modulation(lfo, Some(filter), "cutoff"));
        let (from, to) = patch.router().route_for(lfo).unwrap().wire().unwrap();
        assert!(patch.engine().is_connected_to_param(from, to));

        patch.delete_module(filter);
        assert!(patch.router().route_for(lfo).is_none());
        assert!(!patch.engine().is_connected_to_param(from, to));
    }

    #[test]
    fn named_controls() {
        let mut patch = test_patch();
        let delay = patch.create_module(ModuleKind::Delay);
        assert!(patch.set_control_named(delay, "delay-time", 1.5));
        assert!(patch.set_control_named(delay, "feedback", 0.6));
        assert!(!patch.set_control_named(delay, "cutoff", 300.0));
        assert!(!patch.set_control_named(delay, "pan", 0.0));
        assert!(!patch.set_control_named(delay, "q", 3.0), "delay has no q");
        assert!(!patch.set_control(Uid(77), ModuleControl::Gain, 0.1));
        assert_eq!(patch.control_value(delay, ModuleControl::DelayTime), Some(1.5));
    }

    #[test]
    fn trigger_and_release_only_apply_to_envelopes() {
        let mut patch = test_patch();
        let env = patch.create_module(ModuleKind::Envelope);
        let gain = patch.create_module(ModuleKind::Gain);
        assert!(!patch.trigger(gain));
        assert!(!patch.release(env), "not playing yet");
        assert!(patch.trigger(env));
        assert!(patch.release(env));
        assert!(!patch.release(env));
    }

    #[test]
    fn restart_noise_keeps_connections() {
        let mut patch = test_patch();
        let noise = patch.create_module(ModuleKind::Noise);
        let filter = patch.create_module(ModuleKind::Filter);
        patch.connect(noise, filter);
        assert!(patch.restart_noise(noise));
        assert!(!patch.restart_noise(filter));
        assert_eq!(patch.outputs(noise), &[filter]);
        let out = patch.module(noise).unwrap().output();
        let filter_in = patch.module(filter).unwrap().input().unwrap();
        assert!(patch.engine().is_connected(out, filter_in));
    }

    #[test]
    fn snapshot_lists_modules_in_order() {
        let mut patch = test_patch();
        let env = patch.create_module(ModuleKind::Envelope);
        let osc = patch.create_module(ModuleKind::Oscillator);
        patch.route_modulation(env, Some(osc), "gain");
        patch.trigger(env);

        let snapshot = patch.snapshot();
        assert_eq!(snapshot.modules.len(), 2);
        let env_view = &snapshot.modules[0];
        assert_eq!(env_view.name, "Envelope #1");
        assert_eq!(env_view.envelope_phase, Some(EnvelopePhase::Attacking));
        assert_eq!(env_view.modulation.unwrap().target, osc);
        assert_eq!(env_view.source_state, None);
        assert_eq!(snapshot.modules[1].source_state, Some(SourceState::Running));

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"Envelope #1\""));
        assert!(json.contains("\"kind\": \"envelope\""));
    }
}
