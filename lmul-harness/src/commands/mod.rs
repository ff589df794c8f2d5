pub mod decode;
pub mod encode;
pub mod inspect;

use lmul_harness::config::TensorKind;

/// Tensor file kind as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KindArg {
    /// Flattened input image (image_side^2 values)
    Image,
    /// Weight matrix (num_classes x image_side^2 values)
    Weights,
    /// Any length, no layout check
    Raw,
}

impl KindArg {
    /// Layout kind to check against, if any.
    pub fn layout(self) -> Option<TensorKind> {
        match self {
            KindArg::Image => Some(TensorKind::Image),
            KindArg::Weights => Some(TensorKind::Weights),
            KindArg::Raw => None,
        }
    }
}
