/*!
 * Layout-preserving render planning.
 */

pub mod fit;
pub mod metrics;
pub mod scatter;

pub use fit::{FitOptions, FittedText, fit_text, wrap_text};
pub use metrics::{FontMetrics, HelveticaMetrics};
pub use scatter::{
    CoverColor, DocumentRenderer, LayoutOptions, PlanRenderer, RenderOp, RenderPlan, Scatter,
};
