//! Layer construction rules for the supported network topologies.

use std::fmt;

use machine_learning::arch::{
    activations::{ActFn, Ramp},
    layers::BasicLayer,
};

use crate::error::{NetworkError, Result};

/// A replicator network has exactly this many hidden layers.
pub const REPLICATOR_HIDDEN_LAYERS: usize = 3;

/// Where a layer sits in a network. Hidden layers are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerPosition {
    Input,
    Hidden(usize),
    Output,
}

impl fmt::Display for LayerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input layer"),
            Self::Hidden(n) => write!(f, "hidden layer {n}"),
            Self::Output => write!(f, "output layer"),
        }
    }
}

/// One layer of a topology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    pub units: usize,
    pub act_fn: ActFn,
    pub bias: bool,
}

impl LayerSpec {
    pub fn new(units: usize, act_fn: ActFn, bias: bool) -> Self {
        Self {
            units,
            act_fn,
            bias,
        }
    }
}

impl From<LayerSpec> for BasicLayer {
    fn from(layer: LayerSpec) -> Self {
        BasicLayer::new(layer.act_fn, layer.bias, layer.units)
    }
}

impl From<&BasicLayer> for LayerSpec {
    fn from(layer: &BasicLayer) -> Self {
        LayerSpec::new(layer.neurons, layer.act_fn, layer.bias)
    }
}

/// The two families of topologies that can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyKind {
    Standard,
    Replicator,
}

/// How to lay out the layers of a network around its hidden sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TopologyPolicy {
    /// Any amount of hidden layers, one activation and bias flag shared by every layer.
    Standard {
        output_count: usize,
        act_fn: ActFn,
        bias: bool,
    },
    /// Three hidden layers and as many outputs as inputs, with a ramp on the middle layer.
    Replicator,
}

impl TopologyPolicy {
    /// A standard topology with sigmoid activations and bias units.
    pub fn standard(output_count: usize) -> Self {
        Self::Standard {
            output_count,
            act_fn: ActFn::default(),
            bias: true,
        }
    }

    pub fn kind(&self) -> TopologyKind {
        match self {
            Self::Standard { .. } => TopologyKind::Standard,
            Self::Replicator => TopologyKind::Replicator,
        }
    }

    /// Validates the sizes and lays out the layers according to this policy.
    pub fn build(&self, input_count: usize, hidden_sizes: &[usize]) -> Result<TopologySpec> {
        match *self {
            Self::Standard {
                output_count,
                act_fn,
                bias,
            } => standard_layers(input_count, hidden_sizes, output_count, act_fn, bias),
            Self::Replicator => validate_replicator_layers(input_count, hidden_sizes),
        }
    }
}

/// The ordered layers of a network, input first and output last.
///
/// Always has at least two layers and no layer without units.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologySpec {
    layers: Vec<LayerSpec>,
}

impl TopologySpec {
    /// Validates an arbitrary list of layers.
    ///
    /// # Errors
    /// `DimensionMismatch` for less than two layers, `NonPositiveLayerSize` for a layer without
    /// units.
    pub fn from_layers(layers: Vec<LayerSpec>) -> Result<Self> {
        if layers.len() < 2 {
            return Err(NetworkError::DimensionMismatch {
                what: "layers",
                got: layers.len(),
                expected: 2,
            });
        }

        let last = layers.len() - 1;
        for (i, layer) in layers.iter().enumerate() {
            let layer = match i {
                _ if layer.units > 0 => continue,
                0 => LayerPosition::Input,
                i if i == last => LayerPosition::Output,
                i => LayerPosition::Hidden(i),
            };
            return Err(NetworkError::NonPositiveLayerSize { layer });
        }

        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn input_count(&self) -> usize {
        self.layers[0].units
    }

    pub fn output_count(&self) -> usize {
        self.layers[self.layers.len() - 1].units
    }

    pub fn hidden_sizes(&self) -> Vec<usize> {
        self.layers[1..self.layers.len() - 1]
            .iter()
            .map(|layer| layer.units)
            .collect()
    }

    /// Tells which policy these layers satisfy. Layers that follow the replicator rules are
    /// reported as such even if they were built as a standard topology.
    pub fn kind(&self) -> TopologyKind {
        let sigmoid = |layer: &LayerSpec| matches!(layer.act_fn, ActFn::Sigmoid(_));
        let is_replicator = match self.layers.as_slice() {
            [input, h1, h2, h3, output] => {
                input.units == output.units
                    && self.layers.iter().all(|layer| layer.bias)
                    && [input, h1, h3, output].into_iter().all(sigmoid)
                    && matches!(h2.act_fn, ActFn::Ramp(_))
            }
            _ => false,
        };

        if is_replicator {
            TopologyKind::Replicator
        } else {
            TopologyKind::Standard
        }
    }

    /// The layers in the form the network engine expects.
    pub fn to_basic_layers(&self) -> Vec<BasicLayer> {
        self.layers.iter().copied().map(BasicLayer::from).collect()
    }
}

impl fmt::Display for TopologySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                write!(f, "-")?;
            }
            write!(f, "{}", layer.units)?;
        }

        Ok(())
    }
}

fn check_size(units: usize, layer: LayerPosition) -> Result<()> {
    if units == 0 {
        return Err(NetworkError::NonPositiveLayerSize { layer });
    }

    Ok(())
}

fn check_hidden_sizes(hidden_sizes: &[usize]) -> Result<()> {
    hidden_sizes
        .iter()
        .enumerate()
        .try_for_each(|(i, &units)| check_size(units, LayerPosition::Hidden(i + 1)))
}

/// Builds a standard topology where every layer shares `act_fn` and `bias`.
///
/// `hidden_sizes` may be empty, in which case the input is linked straight to the output.
///
/// # Errors
/// `NonPositiveLayerSize` if the input, the output or any hidden layer has no units.
pub fn standard_layers(
    input_count: usize,
    hidden_sizes: &[usize],
    output_count: usize,
    act_fn: ActFn,
    bias: bool,
) -> Result<TopologySpec> {
    check_size(input_count, LayerPosition::Input)?;
    check_hidden_sizes(hidden_sizes)?;
    check_size(output_count, LayerPosition::Output)?;

    let layers = std::iter::once(input_count)
        .chain(hidden_sizes.iter().copied())
        .chain(std::iter::once(output_count))
        .map(|units| LayerSpec::new(units, act_fn, bias))
        .collect();

    Ok(TopologySpec { layers })
}

/// Builds a replicator topology: `input_count` inputs and outputs around three hidden layers.
///
/// Every layer uses a sigmoid and a bias unit except the middle hidden layer, which uses a ramp
/// so the compressed representation isn't squeezed into `(0, 1)`.
///
/// # Errors
/// `WrongHiddenLayerCount` unless there are exactly three hidden sizes, `NonPositiveLayerSize` if
/// any of them or the input count is zero.
pub fn validate_replicator_layers(
    input_count: usize,
    hidden_sizes: &[usize],
) -> Result<TopologySpec> {
    if hidden_sizes.len() != REPLICATOR_HIDDEN_LAYERS {
        return Err(NetworkError::WrongHiddenLayerCount {
            got: hidden_sizes.len(),
            expected: REPLICATOR_HIDDEN_LAYERS,
        });
    }

    check_hidden_sizes(hidden_sizes)?;
    check_size(input_count, LayerPosition::Input)?;

    let sigmoid = ActFn::default();
    let ramp = ActFn::Ramp(Ramp::default());

    let layers = vec![
        LayerSpec::new(input_count, sigmoid, true),
        LayerSpec::new(hidden_sizes[0], sigmoid, true),
        LayerSpec::new(hidden_sizes[1], ramp, true),
        LayerSpec::new(hidden_sizes[2], sigmoid, true),
        LayerSpec::new(input_count, sigmoid, true),
    ];

    Ok(TopologySpec { layers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replicator_has_five_layers_with_ramp_in_the_middle() {
        let topology = validate_replicator_layers(17, &[4, 2, 4]).unwrap();
        let layers = topology.layers();

        assert_eq!(layers.len(), 5);
        assert_eq!(
            layers.iter().map(|l| l.units).collect::<Vec<_>>(),
            vec![17, 4, 2, 4, 17]
        );
        assert!(layers.iter().all(|l| l.bias));
        assert!(matches!(layers[2].act_fn, ActFn::Ramp(_)));
        for i in [0, 1, 3, 4] {
            assert!(matches!(layers[i].act_fn, ActFn::Sigmoid(_)));
        }

        assert_eq!(topology.input_count(), 17);
        assert_eq!(topology.output_count(), 17);
        assert_eq!(topology.hidden_sizes(), vec![4, 2, 4]);
        assert_eq!(topology.kind(), TopologyKind::Replicator);
        assert_eq!(topology.to_string(), "17-4-2-4-17");
    }

    #[test]
    fn replicator_rejects_wrong_hidden_count() {
        let err = validate_replicator_layers(4, &[4, 2]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::WrongHiddenLayerCount {
                got: 2,
                expected: 3
            }
        ));

        assert!(validate_replicator_layers(4, &[4, 2, 2, 4]).is_err());
    }

    #[test]
    fn replicator_reports_the_empty_hidden_layer() {
        let err = validate_replicator_layers(4, &[4, 0, 4]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::NonPositiveLayerSize {
                layer: LayerPosition::Hidden(2)
            }
        ));
        assert_eq!(err.to_string(), "hidden layer 2 must have more than 0 units");
    }

    #[test]
    fn replicator_rejects_empty_input() {
        let err = validate_replicator_layers(0, &[4, 2, 4]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::NonPositiveLayerSize {
                layer: LayerPosition::Input
            }
        ));
    }

    #[test]
    fn standard_applies_one_activation_everywhere() {
        let ramp = ActFn::Ramp(Ramp::default());
        let topology = standard_layers(2, &[3, 3], 1, ramp, false).unwrap();

        assert_eq!(topology.to_string(), "2-3-3-1");
        assert!(topology
            .layers()
            .iter()
            .all(|l| l.act_fn == ramp && !l.bias));
        assert_eq!(topology.kind(), TopologyKind::Standard);
    }

    #[test]
    fn standard_allows_no_hidden_layers() {
        let topology = TopologyPolicy::standard(1).build(2, &[]).unwrap();
        assert_eq!(topology.layers().len(), 2);
        assert!(topology.hidden_sizes().is_empty());
    }

    #[test]
    fn standard_rejects_empty_layers() {
        let policy = TopologyPolicy::standard(1);

        let err = policy.build(0, &[2]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::NonPositiveLayerSize {
                layer: LayerPosition::Input
            }
        ));

        let err = policy.build(2, &[2, 0]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::NonPositiveLayerSize {
                layer: LayerPosition::Hidden(2)
            }
        ));

        let err = TopologyPolicy::standard(0).build(2, &[2]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::NonPositiveLayerSize {
                layer: LayerPosition::Output
            }
        ));
    }

    #[test]
    fn from_layers_revalidates() {
        let sigmoid = ActFn::default();
        assert!(TopologySpec::from_layers(vec![LayerSpec::new(3, sigmoid, true)]).is_err());

        let err = TopologySpec::from_layers(vec![
            LayerSpec::new(3, sigmoid, true),
            LayerSpec::new(0, sigmoid, true),
            LayerSpec::new(1, sigmoid, true),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            NetworkError::NonPositiveLayerSize {
                layer: LayerPosition::Hidden(1)
            }
        ));

        let replicator = validate_replicator_layers(3, &[2, 1, 2]).unwrap();
        let rebuilt = TopologySpec::from_layers(replicator.layers().to_vec()).unwrap();
        assert_eq!(rebuilt, replicator);
        assert_eq!(rebuilt.kind(), TopologyKind::Replicator);
    }
}
