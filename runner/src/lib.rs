pub mod calc;
pub mod checker;
pub mod evaluator;
pub mod report;
pub mod run;
pub mod verdict;

pub use calc::CalcEvaluator;
pub use evaluator::{Evaluator, Execution, ScriptedEvaluator};
pub use run::{RunState, run_example};
pub use verdict::{Status, Verdict};
