// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use rustc_hash::FxHashMap;

/// Owns every [Module] in a patch and the audio connections between them.
///
/// Adjacency is held here rather than in the modules, as two uid-keyed maps
/// that always mirror each other: B is in A's outputs exactly when A is in
/// B's inputs. Membership is a set, so connecting twice records one edge.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    uid_factory: UidFactory<Uid>,
    modules: FxHashMap<Uid, Module>,
    uids: Vec<Uid>,
    inputs: FxHashMap<Uid, Vec<Uid>>,
    outputs: FxHashMap<Uid, Vec<Uid>>,
}
impl ModuleGraph {
    /// Builds a module of the given kind, starts any continuous sources it
    /// owns, and registers it.
    pub fn create_module(
        &mut self,
        kind: ModuleKind,
        engine: &mut dyn AudioEngine,
        settings: &PatchSettings,
        rng: &mut Rng,
    ) -> Uid {
        let mut core = ModuleCore::new_with(kind, engine, settings, rng);
        core.start_sources(engine);
        let uid = self.uid_factory.mint_next();
        let module = Module::new_with(uid, core);
        log::info!("created {}", module.name());
        self.modules.insert(uid, module);
        self.uids.push(uid);
        uid
    }

    /// Wires `source`'s logical output into `destination`'s logical input and
    /// records the edge on both sides.
    ///
    /// A request that can't make sense (a module connected to itself, an
    /// unknown uid, a destination without an input) is logged and ignored.
    /// Repeating a connection is harmless. Returns whether the edge exists
    /// afterward.
    pub fn connect(
        &mut self,
        engine: &mut dyn AudioEngine,
        source: Uid,
        destination: Uid,
    ) -> bool {
        if source == destination {
            log::warn!("refusing to connect {source} to itself");
            return false;
        }
        let (Some(from), Some(to)) = (
            self.module(source).map(|m| m.output()),
            self.module(destination).and_then(|m| m.input()),
        ) else {
            log::warn!("{source} can't be connected to {destination}");
            return false;
        };

        if !engine.connect(from, to).absorb("connecting modules") {
            return false;
        }
        Self::add_unique(self.outputs.entry(source).or_default(), destination);
        Self::add_unique(self.inputs.entry(destination).or_default(), source);
        log::trace!("connected {source} -> {destination}");
        true
    }

    /// Removes the edge from `source` to `destination`, if there is one.
    /// Returns whether there was.
    pub fn disconnect(
        &mut self,
        engine: &mut dyn AudioEngine,
        source: Uid,
        destination: Uid,
    ) -> bool {
        let was_connected = self.outputs(source).contains(&destination);
        Self::remove_from(&mut self.outputs, source, destination);
        Self::remove_from(&mut self.inputs, destination, source);
        if let (Some(from), Some(to)) = (
            self.module(source).map(|m| m.output()),
            self.module(destination).and_then(|m| m.input()),
        ) {
            engine
                .disconnect(from, Some(to))
                .absorb("disconnecting modules");
        }
        was_connected
    }

    /// Wires a module's logical output to the engine's final output.
    pub fn connect_to_output(&mut self, engine: &mut dyn AudioEngine, uid: Uid) -> bool {
        let Some(from) = self.module(uid).map(|m| m.output()) else {
            log::warn!("can't send unknown module {uid} to the output");
            return false;
        };
        let destination = engine.destination();
        engine
            .connect(from, destination)
            .absorb("connecting to output")
    }

    /// Removes a module in one pass: its edges disappear from every peer's
    /// adjacency and from the engine, its continuous sources stop, and it
    /// leaves the registry. Returns the removed module, or None if there was
    /// no such module (deleting twice is harmless).
    pub fn delete_module(&mut self, engine: &mut dyn AudioEngine, uid: Uid) -> Option<Module> {
        let mut module = self.modules.remove(&uid)?;
        self.uids.retain(|u| *u != uid);

        let upstream = self.inputs.remove(&uid).unwrap_or_default();
        let downstream = self.outputs.remove(&uid).unwrap_or_default();
        for peer in &upstream {
            Self::remove_from(&mut self.outputs, *peer, uid);
        }
        for peer in &downstream {
            Self::remove_from(&mut self.inputs, *peer, uid);
        }

        // Peers feeding this module.
        if let Some(input) = module.input() {
            for peer in &upstream {
                if let Some(peer) = self.modules.get(peer) {
                    engine
                        .disconnect(peer.output(), Some(input))
                        .absorb("severing upstream edge");
                }
            }
        }
        // Everything this module feeds, including the destination and any
        // modulation wiring.
        engine
            .disconnect(module.output(), None)
            .absorb("severing downstream edges");

        let stopped = module.core_mut().stop_sources(engine);
        log::info!("deleted {} (stopped {stopped} sources)", module.name());
        Some(module)
    }

    #[allow(missing_docs)]
    pub fn module(&self, uid: Uid) -> Option<&Module> {
        self.modules.get(&uid)
    }

    #[allow(missing_docs)]
    pub fn module_mut(&mut self, uid: Uid) -> Option<&mut Module> {
        self.modules.get_mut(&uid)
    }

    /// Uids in creation order.
    pub fn uids(&self) -> &[Uid] {
        &self.uids
    }

    /// Modules in creation order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.uids.iter().filter_map(|uid| self.modules.get(uid))
    }

    /// Modules feeding `uid`, in the order they were connected.
    pub fn inputs(&self, uid: Uid) -> &[Uid] {
        self.inputs.get(&uid).map_or(&[], |v| v.as_slice())
    }

    /// Modules `uid` feeds, in the order they were connected.
    pub fn outputs(&self, uid: Uid) -> &[Uid] {
        self.outputs.get(&uid).map_or(&[], |v| v.as_slice())
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn add_unique(list: &mut Vec<Uid>, uid: Uid) {
        if !list.contains(&uid) {
            list.push(uid);
        }
    }

    fn remove_from(map: &mut FxHashMap<Uid, Vec<Uid>>, key: Uid, uid: Uid) {
        if let Some(list) = map.get_mut(&key) {
            list.retain(|u| *u != uid);
            if list.is_empty() {
                map.remove(&key);
            }
        }
    }
}
