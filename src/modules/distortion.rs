// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use std::f64::consts::PI;

/// Generates a symmetric soft-clipping transfer curve. Larger `amount`s bend
/// the curve harder. `samples` points span the input range [-1, 1).
pub fn distortion_curve(amount: ParameterType, samples: usize) -> Vec<f32> {
    let deg = PI / 180.0;
    (0..samples)
        .map(|i| {
            let x = i as f64 * 2.0 / samples as f64 - 1.0;
            (((3.0 + amount) * x * 20.0 * deg) / (PI + amount * x.abs())) as f32
        })
        .collect()
}

/// A wave-shaper driven by [distortion_curve()], oversampled 4x.
#[derive(Debug)]
pub struct DistortionCore {
    node: NodeId,
    amount: ParameterType,
    curve_samples: usize,
}
impl DistortionCore {
    #[allow(missing_docs)]
    pub const DEFAULT_AMOUNT: ParameterType = 20.0;

    #[allow(missing_docs)]
    pub fn new_with(engine: &mut dyn AudioEngine, curve_samples: usize) -> Self {
        let mut r = Self {
            node: engine.create_node(NodeKind::WaveShaper),
            amount: Self::DEFAULT_AMOUNT,
            curve_samples,
        };
        r.set_amount(engine, r.amount);
        r
    }

    #[allow(missing_docs)]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[allow(missing_docs)]
    pub fn amount(&self) -> ParameterType {
        self.amount
    }

    /// Replaces the whole curve. There's no incremental update.
    pub fn set_amount(&mut self, engine: &mut dyn AudioEngine, amount: ParameterType) {
        self.amount = amount;
        engine
            .set_curve(
                self.node,
                distortion_curve(amount, self.curve_samples),
                Oversample::X4,
            )
            .absorb("installing distortion curve");
    }
}
