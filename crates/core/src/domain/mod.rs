pub mod assessment;
pub mod context;
pub mod observation;
pub mod quarter;
pub mod recommendation;
