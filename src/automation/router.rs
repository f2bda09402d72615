// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The parameters a modulation source can be routed into. Which ones a given
/// target accepts depends on its kind and on the source's kind.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ModulatedParam {
    /// Oscillator pitch, or filter cutoff.
    #[strum(to_string = "frequency", serialize = "freq", serialize = "cutoff")]
    Frequency,
    /// Output level.
    Gain,
    /// Filter Q.
    #[strum(to_string = "resonance", serialize = "q")]
    Resonance,
}

/// A modulation source's one active binding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModulationRoute {
    /// The module being modulated.
    pub target: Uid,
    /// Which of its parameters.
    pub param: ModulatedParam,
    #[serde(skip)]
    wire: Option<(NodeId, ParamId)>,
}
impl ModulationRoute {
    /// The engine edge this route was realized as.
    pub fn wire(&self) -> Option<(NodeId, ParamId)> {
        self.wire
    }
}

/// Keeps track of which control module (LFO or Envelope) drives which
/// parameter of which other module. Each source has at most one route at a
/// time. Routing it somewhere new replaces the old route, engine wiring
/// included.
#[derive(Debug, Default)]
pub struct ModulationRouter {
    routes: FxHashMap<Uid, ModulationRoute>,
}
impl ModulationRouter {
    /// Routes `source`'s output into `param` on `target`.
    ///
    /// An empty target is a no-op. So is any request that isn't eligible
    /// (unknown modules, a source that isn't a control module, a source
    /// targeting itself, or a parameter the target doesn't expose to that kind
    /// of source); the existing route, if any, stays in place. Returns whether
    /// a new route was made.
    pub fn route(
        &mut self,
        graph: &ModuleGraph,
        engine: &mut dyn AudioEngine,
        source: Uid,
        target: Option<Uid>,
        param: ModulatedParam,
    ) -> bool {
        let Some(target) = target else {
            log::debug!("no modulation target selected for {source}; ignoring");
            return false;
        };
        let Some(input) = Self::eligible_input(graph, source, target, param) else {
            log::warn!("{source} can't modulate {param} on {target}");
            return false;
        };
        let Some(output) = graph.module(source).map(|m| m.output()) else {
            return false;
        };

        if let Some(old) = self.routes.remove(&source) {
            Self::unwire(engine, &old);
        }
        let wired = engine
            .connect_param(output, input)
            .absorb("wiring modulation");
        self.routes.insert(
            source,
            ModulationRoute {
                target,
                param,
                wire: wired.then_some((output, input)),
            },
        );
        log::debug!("{source} now modulates {param} on {target}");
        true
    }

    /// The engine parameter that `source` would drive, or None if the request
    /// isn't eligible.
    pub fn eligible_input(
        graph: &ModuleGraph,
        source: Uid,
        target: Uid,
        param: ModulatedParam,
    ) -> Option<ParamId> {
        if source == target {
            return None;
        }
        let source_kind = graph.module(source)?.kind();
        if !source_kind.is_modulation_source() {
            return None;
        }
        graph
            .module(target)?
            .core()
            .modulation_input(source_kind, param)
    }

    /// Every (target, parameter) pair `source` could currently be routed to,
    /// in module creation order.
    pub fn candidates(graph: &ModuleGraph, source: Uid) -> Vec<(Uid, ModulatedParam)> {
        use strum::IntoEnumIterator;

        graph
            .uids()
            .iter()
            .flat_map(|target| ModulatedParam::iter().map(move |p| (*target, p)))
            .filter(|(target, param)| {
                Self::eligible_input(graph, source, *target, *param).is_some()
            })
            .collect()
    }

    /// The active route for `source`, if any.
    pub fn route_for(&self, source: Uid) -> Option<&ModulationRoute> {
        self.routes.get(&source)
    }

    /// All active routes, keyed by source.
    pub fn routes(&self) -> impl Iterator<Item = (&Uid, &ModulationRoute)> {
        self.routes.iter()
    }

    /// Removes the route from `source`, undoing its engine wiring. Returns
    /// whether there was one.
    pub fn clear(&mut self, engine: &mut dyn AudioEngine, source: Uid) -> bool {
        if let Some(old) = self.routes.remove(&source) {
            Self::unwire(engine, &old);
            true
        } else {
            false
        }
    }

    /// Drops every route from or into `uid`. Called when a module is deleted.
    pub fn sever(&mut self, engine: &mut dyn AudioEngine, uid: Uid) {
        let doomed: Vec<Uid> = self
            .routes
            .iter()
            .filter(|(source, route)| **source == uid || route.target == uid)
            .map(|(source, _)| *source)
            .collect();
        for source in doomed {
            self.clear(engine, source);
        }
    }

    fn unwire(engine: &mut dyn AudioEngine, route: &ModulationRoute) {
        if let Some((from, to)) = route.wire {
            engine
                .disconnect_param(from, to)
                .absorb("removing old modulation");
        }
    }
}
