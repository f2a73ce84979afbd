//! Kernel functions for SVM training

pub mod function;
pub mod linear;
pub mod polynomial;
pub mod rbf;
pub mod sigmoid;
pub mod traits;

pub use self::function::*;
pub use self::linear::*;
pub use self::polynomial::*;
pub use self::rbf::*;
pub use self::sigmoid::*;
pub use self::traits::*;
