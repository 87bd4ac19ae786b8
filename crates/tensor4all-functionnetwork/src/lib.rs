//! Tensor-network representations of continuous functions.
//!
//! Coordinates in `[0, 1)` are encoded positionally: every digit of a
//! coordinate is a site index living at a vertex of an arbitrary graph.
//!
//! - [`IndexMap`] and [`IndsNetworkMap`]: the digit encoding and the graph
//!   carrying it ([`continuous_siteinds`], [`complex_continuous_siteinds`])
//! - [`FunctionNetwork`]: a tensor network evaluating to `f(x)`
//! - [`builders`]: constant, exponential, hyperbolic and trigonometric
//!   functions, `tanh` series and polynomials
//! - [`operators`]: shift, stencil, Laplacian and derivative operators
//! - [`algebra`]: pointwise products and operator application
//!
//! # Example
//!
//! ```
//! use tensor4all_functionnetwork::{builders, continuous_siteinds, FunctionParams};
//! use tensor4all_treetn::graphs::path_graph;
//!
//! let map = continuous_siteinds(&path_graph(6), &[(0..6).collect()], 2).unwrap();
//! let f = builders::exponential(&map, &FunctionParams::new().with_k(2.0)).unwrap();
//! let value = f.evaluate(&[0.5], &[1]).unwrap();
//! assert!((value.real() - 1.0_f64.exp()).abs() < 1e-12);
//! ```

pub mod algebra;
pub mod builders;
pub mod error;
pub mod function_network;
pub mod index_map;
pub mod inds_network_map;
pub mod operators;
pub mod params;

pub use algebra::{apply_operator, apply_operators, elementwise_product, elementwise_product_all};
pub use builders::ElementaryFunction;
pub use error::{FunctionNetworkError, Result};
pub use function_network::FunctionNetwork;
pub use index_map::{DigitSpec, IndexMap, Part, ScalarDomain};
pub use inds_network_map::{complex_continuous_siteinds, continuous_siteinds, IndsNetworkMap};
pub use operators::{
    derivative_operator, identity_operator, laplacian_operator, minus_shift, plus_shift, stencil,
    CarryAutomaton, DigitAction, ShiftDirection,
};
pub use params::{BoundaryCondition, FunctionParams, OperatorParams};
