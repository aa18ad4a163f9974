//! Core types: panel container, kernels, options, results.

pub mod kernel;
pub mod options;
pub mod panel;
pub mod result;

pub use kernel::KernelType;
pub use options::{BandwidthMode, GwprOptions, GwprOptionsBuilder, OptionsError};
pub use panel::{PanelData, PanelError, PanelRow};
pub use result::{LocalModelResult, PanelFitResult};
